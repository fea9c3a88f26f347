//! Storage seams for the spaced-repetition service.
//!
//! A unit of work is opened per request and handed to the service by the
//! caller. Writes made through it become durable only when `complete` is
//! called.

use chrono::NaiveDateTime;

use crate::data::models::{StoreError, UserSpacedRepetition, VocabularyList};

pub trait RepetitionRepository {
    fn get_by_id(&mut self, id: i32) -> Result<Option<UserSpacedRepetition>, StoreError>;

    fn get_by_user_and_list(
        &mut self,
        user_id: i32,
        vocabulary_list_id: i32,
    ) -> Result<Option<UserSpacedRepetition>, StoreError>;

    fn get_by_user_and_vocabulary(
        &mut self,
        user_id: i32,
        vocabulary_id: i32,
    ) -> Result<Option<UserSpacedRepetition>, StoreError>;

    /// Reviewed records that are due at `now` and were last rated poorly
    /// (interval of one day), oldest due first.
    fn get_due_for_review(
        &mut self,
        user_id: i32,
        now: NaiveDateTime,
    ) -> Result<Vec<UserSpacedRepetition>, StoreError>;

    /// All of a user's records, latest `next_review_at` first.
    fn get_by_user_id(&mut self, user_id: i32) -> Result<Vec<UserSpacedRepetition>, StoreError>;

    fn exists(&mut self, user_id: i32, vocabulary_list_id: i32) -> Result<bool, StoreError>;

    /// Stages a new record and returns it with its assigned id.
    fn add(&mut self, record: UserSpacedRepetition) -> Result<UserSpacedRepetition, StoreError>;

    /// Stages an update keyed by the record's id.
    fn update(&mut self, record: UserSpacedRepetition) -> Result<UserSpacedRepetition, StoreError>;
}

pub trait VocabularyListRepository {
    fn find_by_id(&mut self, vocabulary_list_id: i32) -> Result<Option<VocabularyList>, StoreError>;
}

pub trait UnitOfWork: RepetitionRepository + VocabularyListRepository {
    /// Makes staged writes durable and returns the number of rows affected.
    fn complete(&mut self) -> Result<usize, StoreError>;
}
