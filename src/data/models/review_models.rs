use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::data::models::ReviewStatus;

pub const RECORD_NOT_FOUND: &str = "Không tìm thấy bản ghi lặp lại";
pub const VOCABULARY_LIST_NOT_FOUND: &str = "Không tìm thấy vocabulary list";
pub const MISSING_REVIEW_TARGET: &str =
    "Thiếu thông tin: cần UserSpacedRepetitionId hoặc (VocabularyId và VocabularyListId)";
pub const REVIEW_SAVED: &str = "Đã cập nhật tiến độ học tập";
pub const UNKNOWN_LIST_NAME: &str = "Unknown";

/// Repetition record as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacedRepetitionDto {
    pub user_spaced_repetition_id: i32,
    pub user_id: i32,
    pub vocabulary_id: Option<i32>,
    pub vocabulary_list_id: i32,
    pub vocabulary_list_name: String,
    pub vocabulary_word: Option<String>,
    pub last_reviewed_at: Option<NaiveDateTime>,
    pub next_review_at: Option<NaiveDateTime>,
    pub review_count: i32,
    pub intervals: i32,
    pub status: ReviewStatus,
    pub is_due: bool,
    pub days_until_review: i64,
    pub best_quiz_score: Option<i32>,
    pub last_quiz_score: Option<i32>,
    pub last_quiz_completed_at: Option<NaiveDateTime>,
    pub total_quiz_attempts: Option<i32>,
}

/// A self-assessment event.
///
/// Either `user_spaced_repetition_id` names an existing record, or the pair
/// `vocabulary_id` + `vocabulary_list_id` names a word whose record is created
/// on first review. `quality` is nominally 0-5 and is clamped, never rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    #[serde(default)]
    pub user_spaced_repetition_id: Option<i32>,
    #[serde(default)]
    pub vocabulary_id: Option<i32>,
    #[serde(default)]
    pub vocabulary_list_id: Option<i32>,
    pub quality: i32,
}

impl ReviewRequest {
    pub fn for_repetition(user_spaced_repetition_id: i32, quality: i32) -> Self {
        Self {
            user_spaced_repetition_id: Some(user_spaced_repetition_id),
            quality,
            ..Self::default()
        }
    }

    pub fn for_word(vocabulary_id: i32, vocabulary_list_id: i32, quality: i32) -> Self {
        Self {
            vocabulary_id: Some(vocabulary_id),
            vocabulary_list_id: Some(vocabulary_list_id),
            quality,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_repetition: Option<SpacedRepetitionDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review_at: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_intervals: Option<i32>,
}

impl ReviewResponse {
    pub fn failure(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            updated_repetition: None,
            next_review_at: None,
            new_intervals: None,
        }
    }

    pub fn reviewed(repetition: SpacedRepetitionDto, new_intervals: i32) -> Self {
        Self {
            success: true,
            message: REVIEW_SAVED.to_string(),
            next_review_at: repetition.next_review_at,
            updated_repetition: Some(repetition),
            new_intervals: Some(new_intervals),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveQuizResultRequest {
    pub vocabulary_list_id: i32,
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizScoreDto {
    pub vocabulary_list_id: i32,
    pub vocabulary_list_name: String,
    pub best_score: Option<i32>,
    pub last_score: Option<i32>,
    pub last_completed_at: Option<NaiveDateTime>,
    pub total_attempts: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_omits_empty_fields() {
        let body = serde_json::to_value(ReviewResponse::failure(RECORD_NOT_FOUND)).unwrap();

        assert_eq!(
            body,
            json!({ "success": false, "message": "Không tìm thấy bản ghi lặp lại" })
        );
    }

    #[test]
    fn request_accepts_repetition_id_only() {
        let request: ReviewRequest =
            serde_json::from_value(json!({ "userSpacedRepetitionId": 7, "quality": 4 })).unwrap();

        assert_eq!(request, ReviewRequest::for_repetition(7, 4));
    }

    #[test]
    fn request_accepts_word_target() {
        let request: ReviewRequest = serde_json::from_value(
            json!({ "vocabularyId": 3, "vocabularyListId": 9, "quality": 10 }),
        )
        .unwrap();

        assert_eq!(request, ReviewRequest::for_word(3, 9, 10));
    }

    #[test]
    fn status_serialises_as_its_name() {
        assert_eq!(serde_json::to_value(ReviewStatus::Mastered).unwrap(), json!("Mastered"));
    }
}
