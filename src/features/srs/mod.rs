pub mod engine;
pub mod service;

pub use engine::{Quality, RepetitionState, Schedule};
pub use service::SpacedRepetitionService;
