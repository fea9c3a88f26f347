pub mod error_models;
pub mod review_models;
pub mod srs_models;
pub mod vocabulary_models;

pub use error_models::{SrsError, StoreError};
pub use review_models::{
    QuizScoreDto, ReviewRequest, ReviewResponse, SaveQuizResultRequest, SpacedRepetitionDto,
};
pub use srs_models::{RepetitionRow, RepetitionValues, ReviewStatus, UserSpacedRepetition};
pub use vocabulary_models::{NewVocabulary, NewVocabularyList, VocabularyList};
