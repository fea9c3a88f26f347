//! Vocabulary spaced repetition for the Lumina learning platform.
//!
//! The scheduling rules live in [`features::srs::engine`]; the request-level
//! operations in [`features::srs::SpacedRepetitionService`] run against any
//! [`data::repositories::UnitOfWork`], backed by SQLite through diesel or by
//! the in-memory store used in tests.

pub mod config;
pub mod data;
pub mod features;
pub mod schema;

pub use config::{establish_pool, DbConfig, DbPool};
pub use features::srs::SpacedRepetitionService;
