use anyhow::Context;
use diesel::connection::SimpleConnection;
use diesel::{
    r2d2::{ConnectionManager, Pool},
    SqliteConnection,
};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

const DEFAULT_DATABASE_URL: &str = "sqlite://lumina.db";
const DEFAULT_POOL_SIZE: u32 = 8;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS vocabulary_lists (
    vocabulary_list_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS vocabularies (
    vocabulary_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    vocabulary_list_id INTEGER NOT NULL REFERENCES vocabulary_lists (vocabulary_list_id),
    word TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS user_spaced_repetitions (
    user_spaced_repetition_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    user_id INTEGER NOT NULL,
    vocabulary_id INTEGER,
    vocabulary_list_id INTEGER NOT NULL,
    last_reviewed_at TIMESTAMP,
    next_review_at TIMESTAMP,
    review_count INTEGER,
    intervals INTEGER,
    status TEXT,
    best_quiz_score INTEGER,
    last_quiz_score INTEGER,
    last_quiz_completed_at TIMESTAMP,
    total_quiz_attempts INTEGER
);
CREATE INDEX IF NOT EXISTS idx_usr_user_list
    ON user_spaced_repetitions (user_id, vocabulary_list_id);
";

/// Database settings, read from the environment (and `.env`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub database_url: String,
    pub pool_size: u32,
}

impl DbConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into());

        let pool_size = match lookup("DB_POOL_SIZE").map(|v| v.parse::<u32>()) {
            Some(Ok(size)) if size > 0 => size,
            Some(_) => {
                log::warn!("Ignoring invalid DB_POOL_SIZE, using {}", DEFAULT_POOL_SIZE);
                DEFAULT_POOL_SIZE
            }
            None => DEFAULT_POOL_SIZE,
        };

        DbConfig {
            database_url,
            pool_size,
        }
    }

    /// Path handed to SQLite, without the `sqlite://` scheme
    pub fn sqlite_path(&self) -> &str {
        self.database_url
            .strip_prefix("sqlite://")
            .unwrap_or(&self.database_url)
    }
}

pub fn establish_pool(config: &DbConfig) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(config.sqlite_path());
    let pool = Pool::builder()
        .max_size(config.pool_size)
        .build(manager)
        .with_context(|| format!("Failed to create DB pool for {}", config.database_url))?;

    let mut conn = pool.get().context("Failed to get DB connection")?;
    ensure_schema(&mut conn).context("Failed to create schema")?;

    log::info!(
        "Database ready at {} (pool size {})",
        config.database_url,
        config.pool_size
    );
    Ok(pool)
}

/// Creates the tables if they do not exist yet
pub fn ensure_schema(conn: &mut SqliteConnection) -> Result<(), diesel::result::Error> {
    conn.batch_execute(SCHEMA)
}

/// Installs `env_logger` honouring `RUST_LOG`, defaulting to `info`.
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
