use diesel::r2d2::PoolError;
use diesel::result::Error as DieselError;
use thiserror::Error;

// Store-level errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DieselError),
    #[error("Connection pool error: {0}")]
    Pool(#[from] PoolError),
    #[error("Invalid repetition status: {0}")]
    InvalidStatus(String),
}

// Service-level errors for operations that cannot report failure in their response
#[derive(Error, Debug)]
pub enum SrsError {
    #[error("Vocabulary list not found.")]
    VocabularyListNotFound(i32),
    #[error("Repetition for user {user_id} and list {vocabulary_list_id} exists but could not be loaded")]
    RepetitionUnavailable {
        user_id: i32,
        vocabulary_list_id: i32,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}
