use chrono::{Duration, NaiveDateTime};
use diesel::{AsChangeset, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::data::models::StoreError;
use crate::schema::user_spaced_repetitions;

/// Learning stage of a repetition record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewStatus {
    New,
    Learning,
    Mastered,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::New => "New",
            ReviewStatus::Learning => "Learning",
            ReviewStatus::Mastered => "Mastered",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New" => Ok(ReviewStatus::New),
            "Learning" => Ok(ReviewStatus::Learning),
            "Mastered" => Ok(ReviewStatus::Mastered),
            other => Err(StoreError::InvalidStatus(other.to_string())),
        }
    }
}

/// Raw row of `user_spaced_repetitions`, column order matches the schema
#[derive(Debug, Clone, Queryable)]
pub struct RepetitionRow {
    pub user_spaced_repetition_id: i32,
    pub user_id: i32,
    pub vocabulary_id: Option<i32>,
    pub vocabulary_list_id: i32,
    pub last_reviewed_at: Option<NaiveDateTime>,
    pub next_review_at: Option<NaiveDateTime>,
    pub review_count: Option<i32>,
    pub intervals: Option<i32>,
    pub status: Option<String>,
    pub best_quiz_score: Option<i32>,
    pub last_quiz_score: Option<i32>,
    pub last_quiz_completed_at: Option<NaiveDateTime>,
    pub total_quiz_attempts: Option<i32>,
}

/// Column values written on insert and on update
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = user_spaced_repetitions)]
#[diesel(treat_none_as_null = true)]
pub struct RepetitionValues<'a> {
    pub user_id: i32,
    pub vocabulary_id: Option<i32>,
    pub vocabulary_list_id: i32,
    pub last_reviewed_at: Option<NaiveDateTime>,
    pub next_review_at: Option<NaiveDateTime>,
    pub review_count: Option<i32>,
    pub intervals: Option<i32>,
    pub status: Option<&'a str>,
    pub best_quiz_score: Option<i32>,
    pub last_quiz_score: Option<i32>,
    pub last_quiz_completed_at: Option<NaiveDateTime>,
    pub total_quiz_attempts: Option<i32>,
}

/// One user's spaced-repetition progress on a vocabulary list or a single word.
///
/// Numeric fields stay optional because older rows may lack them; the
/// scheduling code resolves them to defaults before use.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSpacedRepetition {
    pub user_spaced_repetition_id: i32,
    pub user_id: i32,
    pub vocabulary_id: Option<i32>,
    pub vocabulary_list_id: i32,
    /// Joined from `vocabulary_lists`, `None` when the list row is gone
    pub vocabulary_list_name: Option<String>,
    /// Joined from `vocabularies` for word-level records
    pub vocabulary_word: Option<String>,
    pub last_reviewed_at: Option<NaiveDateTime>,
    pub next_review_at: Option<NaiveDateTime>,
    pub review_count: Option<i32>,
    pub intervals: Option<i32>,
    pub status: Option<ReviewStatus>,
    pub best_quiz_score: Option<i32>,
    pub last_quiz_score: Option<i32>,
    pub last_quiz_completed_at: Option<NaiveDateTime>,
    pub total_quiz_attempts: Option<i32>,
}

impl UserSpacedRepetition {
    /// A fresh, never reviewed record due one day after `now`.
    /// The id stays 0 until the store assigns one.
    pub fn new_for_list(user_id: i32, vocabulary_list_id: i32, now: NaiveDateTime) -> Self {
        Self {
            user_spaced_repetition_id: 0,
            user_id,
            vocabulary_id: None,
            vocabulary_list_id,
            vocabulary_list_name: None,
            vocabulary_word: None,
            last_reviewed_at: Some(now),
            next_review_at: Some(now + Duration::days(1)),
            review_count: Some(0),
            intervals: Some(1),
            status: Some(ReviewStatus::New),
            best_quiz_score: None,
            last_quiz_score: None,
            last_quiz_completed_at: None,
            total_quiz_attempts: None,
        }
    }

    pub fn with_vocabulary(mut self, vocabulary_id: i32) -> Self {
        self.vocabulary_id = Some(vocabulary_id);
        self
    }

    pub fn from_row(
        row: RepetitionRow,
        vocabulary_list_name: Option<String>,
        vocabulary_word: Option<String>,
    ) -> Result<Self, StoreError> {
        let status = row.status.as_deref().map(str::parse::<ReviewStatus>).transpose()?;

        Ok(Self {
            user_spaced_repetition_id: row.user_spaced_repetition_id,
            user_id: row.user_id,
            vocabulary_id: row.vocabulary_id,
            vocabulary_list_id: row.vocabulary_list_id,
            vocabulary_list_name,
            vocabulary_word,
            last_reviewed_at: row.last_reviewed_at,
            next_review_at: row.next_review_at,
            review_count: row.review_count,
            intervals: row.intervals,
            status,
            best_quiz_score: row.best_quiz_score,
            last_quiz_score: row.last_quiz_score,
            last_quiz_completed_at: row.last_quiz_completed_at,
            total_quiz_attempts: row.total_quiz_attempts,
        })
    }

    pub fn values(&self) -> RepetitionValues<'static> {
        RepetitionValues {
            user_id: self.user_id,
            vocabulary_id: self.vocabulary_id,
            vocabulary_list_id: self.vocabulary_list_id,
            last_reviewed_at: self.last_reviewed_at,
            next_review_at: self.next_review_at,
            review_count: self.review_count,
            intervals: self.intervals,
            status: self.status.map(|s| s.as_str()),
            best_quiz_score: self.best_quiz_score,
            last_quiz_score: self.last_quiz_score,
            last_quiz_completed_at: self.last_quiz_completed_at,
            total_quiz_attempts: self.total_quiz_attempts,
        }
    }

    pub fn has_quiz_score(&self) -> bool {
        self.best_quiz_score.is_some() || self.last_quiz_score.is_some()
    }
}
