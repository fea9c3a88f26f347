//! In-memory unit of work for testing.
//!
//! Writes are staged until `complete`, mirroring the SQLite store, and every
//! repository call is counted so tests can assert which writes happened.

use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashMap};

use crate::data::models::{StoreError, UserSpacedRepetition, VocabularyList};
use crate::data::repositories::{RepetitionRepository, UnitOfWork, VocabularyListRepository};

/// Call counters, one per mutating or committing operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub get_by_id: usize,
    pub add: usize,
    pub update: usize,
    pub complete: usize,
}

#[derive(Debug, Default)]
pub struct MemoryUnitOfWork {
    committed: BTreeMap<i32, UserSpacedRepetition>,
    staged: BTreeMap<i32, UserSpacedRepetition>,
    lists: HashMap<i32, VocabularyList>,
    words: HashMap<i32, String>,
    next_id: i32,
    calls: CallCounts,
}

impl MemoryUnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a vocabulary list.
    pub fn with_list(mut self, vocabulary_list_id: i32, name: &str) -> Self {
        self.lists.insert(
            vocabulary_list_id,
            VocabularyList {
                vocabulary_list_id,
                name: name.to_string(),
            },
        );
        self
    }

    /// Seeds a word so word-level records resolve their text.
    pub fn with_word(mut self, vocabulary_id: i32, word: &str) -> Self {
        self.words.insert(vocabulary_id, word.to_string());
        self
    }

    /// Seeds an already committed record; its id is kept as given.
    pub fn with_record(mut self, record: UserSpacedRepetition) -> Self {
        self.next_id = self.next_id.max(record.user_spaced_repetition_id);
        self.committed.insert(record.user_spaced_repetition_id, record);
        self
    }

    pub fn calls(&self) -> CallCounts {
        self.calls
    }

    /// Committed state of a record, ignoring anything still staged.
    pub fn committed(&self, id: i32) -> Option<&UserSpacedRepetition> {
        self.committed.get(&id)
    }

    pub fn committed_len(&self) -> usize {
        self.committed.len()
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.staged.is_empty()
    }

    fn hydrate(&self, mut record: UserSpacedRepetition) -> UserSpacedRepetition {
        record.vocabulary_list_name = self
            .lists
            .get(&record.vocabulary_list_id)
            .map(|list| list.name.clone());
        record.vocabulary_word = record
            .vocabulary_id
            .and_then(|id| self.words.get(&id).cloned());
        record
    }

    // Staged writes shadow committed ones
    fn visible(&self) -> Vec<UserSpacedRepetition> {
        let mut merged = self.committed.clone();
        merged.extend(self.staged.iter().map(|(id, r)| (*id, r.clone())));
        merged.into_values().map(|r| self.hydrate(r)).collect()
    }

    fn find_visible<P>(&self, predicate: P) -> Option<UserSpacedRepetition>
    where
        P: Fn(&UserSpacedRepetition) -> bool,
    {
        self.visible().into_iter().find(|r| predicate(r))
    }
}

impl RepetitionRepository for MemoryUnitOfWork {
    fn get_by_id(&mut self, id: i32) -> Result<Option<UserSpacedRepetition>, StoreError> {
        self.calls.get_by_id += 1;
        Ok(self.find_visible(|r| r.user_spaced_repetition_id == id))
    }

    fn get_by_user_and_list(
        &mut self,
        user_id: i32,
        vocabulary_list_id: i32,
    ) -> Result<Option<UserSpacedRepetition>, StoreError> {
        Ok(self.find_visible(|r| r.user_id == user_id && r.vocabulary_list_id == vocabulary_list_id))
    }

    fn get_by_user_and_vocabulary(
        &mut self,
        user_id: i32,
        vocabulary_id: i32,
    ) -> Result<Option<UserSpacedRepetition>, StoreError> {
        Ok(self.find_visible(|r| r.user_id == user_id && r.vocabulary_id == Some(vocabulary_id)))
    }

    fn get_due_for_review(
        &mut self,
        user_id: i32,
        now: NaiveDateTime,
    ) -> Result<Vec<UserSpacedRepetition>, StoreError> {
        use crate::data::models::ReviewStatus;

        let mut due: Vec<_> = self
            .visible()
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .filter(|r| r.next_review_at.is_some_and(|next| next <= now))
            .filter(|r| {
                matches!(r.status, None | Some(ReviewStatus::New) | Some(ReviewStatus::Learning))
            })
            .filter(|r| r.review_count.is_some_and(|count| count > 0))
            .filter(|r| matches!(r.intervals, None | Some(1)))
            .collect();

        due.sort_by_key(|r| r.next_review_at);
        Ok(due)
    }

    fn get_by_user_id(&mut self, user_id: i32) -> Result<Vec<UserSpacedRepetition>, StoreError> {
        let mut records: Vec<_> = self
            .visible()
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect();

        records.sort_by(|a, b| b.next_review_at.cmp(&a.next_review_at));
        Ok(records)
    }

    fn exists(&mut self, user_id: i32, vocabulary_list_id: i32) -> Result<bool, StoreError> {
        Ok(self
            .find_visible(|r| r.user_id == user_id && r.vocabulary_list_id == vocabulary_list_id)
            .is_some())
    }

    fn add(&mut self, mut record: UserSpacedRepetition) -> Result<UserSpacedRepetition, StoreError> {
        self.calls.add += 1;
        self.next_id += 1;
        record.user_spaced_repetition_id = self.next_id;
        let record = self.hydrate(record);
        self.staged.insert(record.user_spaced_repetition_id, record.clone());
        Ok(record)
    }

    fn update(&mut self, record: UserSpacedRepetition) -> Result<UserSpacedRepetition, StoreError> {
        self.calls.update += 1;
        self.staged.insert(record.user_spaced_repetition_id, record.clone());
        Ok(record)
    }
}

impl VocabularyListRepository for MemoryUnitOfWork {
    fn find_by_id(&mut self, vocabulary_list_id: i32) -> Result<Option<VocabularyList>, StoreError> {
        Ok(self.lists.get(&vocabulary_list_id).cloned())
    }
}

impl UnitOfWork for MemoryUnitOfWork {
    fn complete(&mut self) -> Result<usize, StoreError> {
        self.calls.complete += 1;
        let affected = self.staged.len();
        let staged = std::mem::take(&mut self.staged);
        self.committed.extend(staged);
        Ok(affected)
    }
}
