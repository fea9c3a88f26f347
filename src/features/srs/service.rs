use chrono::{NaiveDateTime, Utc};

use crate::data::models::review_models::{
    MISSING_REVIEW_TARGET, RECORD_NOT_FOUND, UNKNOWN_LIST_NAME, VOCABULARY_LIST_NOT_FOUND,
};
use crate::data::models::{
    QuizScoreDto, ReviewRequest, ReviewResponse, SaveQuizResultRequest, SpacedRepetitionDto,
    SrsError, StoreError, UserSpacedRepetition,
};
use crate::data::repositories::UnitOfWork;
use crate::features::srs::engine::{self, Quality, RepetitionState};

enum ReviewTarget {
    Found(UserSpacedRepetition),
    Rejected(&'static str),
}

/// Spaced-repetition operations for one request, running on the caller's
/// unit of work.
pub struct SpacedRepetitionService<'a, U: UnitOfWork> {
    uow: &'a mut U,
    pinned_now: Option<NaiveDateTime>,
}

impl<'a, U: UnitOfWork> SpacedRepetitionService<'a, U> {
    pub fn new(uow: &'a mut U) -> Self {
        SpacedRepetitionService {
            uow,
            pinned_now: None,
        }
    }

    /// Uses `now` instead of the system clock for every operation
    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.pinned_now = Some(now);
        self
    }

    fn now(&self) -> NaiveDateTime {
        self.pinned_now.unwrap_or_else(|| Utc::now().naive_utc())
    }

    /// Applies one self-assessment to a learner's record.
    ///
    /// A missing record and a record owned by someone else produce the same
    /// failure response. Only store faults are returned as `Err`.
    pub fn review(
        &mut self,
        user_id: i32,
        request: &ReviewRequest,
    ) -> Result<ReviewResponse, StoreError> {
        let now = self.now();

        let mut repetition = match self.resolve_target(user_id, request, now)? {
            ReviewTarget::Found(repetition) => repetition,
            ReviewTarget::Rejected(message) => return Ok(ReviewResponse::failure(message)),
        };

        let quality = Quality::clamped(request.quality);
        let schedule = engine::schedule(RepetitionState::of(&repetition), quality, now);
        log::debug!(
            "Repetition {}: quality {} -> interval {} days ({})",
            repetition.user_spaced_repetition_id,
            quality.value(),
            schedule.interval_days,
            schedule.status
        );

        schedule.apply_to(&mut repetition);

        let repetition = self.uow.update(repetition).map_err(|e| {
            log::error!("Failed to update repetition for user {}: {}", user_id, e);
            e
        })?;
        self.uow.complete()?;

        log::info!(
            "User {} reviewed repetition {}, next review in {} days",
            user_id,
            repetition.user_spaced_repetition_id,
            schedule.interval_days
        );

        Ok(ReviewResponse::reviewed(
            to_dto(&repetition, now, false),
            schedule.interval_days,
        ))
    }

    fn resolve_target(
        &mut self,
        user_id: i32,
        request: &ReviewRequest,
        now: NaiveDateTime,
    ) -> Result<ReviewTarget, StoreError> {
        if let Some(id) = request.user_spaced_repetition_id {
            return Ok(match self.uow.get_by_id(id)? {
                Some(repetition) if repetition.user_id == user_id => ReviewTarget::Found(repetition),
                Some(_) => {
                    log::warn!("User {} tried to review repetition {} they do not own", user_id, id);
                    ReviewTarget::Rejected(RECORD_NOT_FOUND)
                }
                None => {
                    log::warn!("Repetition {} not found for user {}", id, user_id);
                    ReviewTarget::Rejected(RECORD_NOT_FOUND)
                }
            });
        }

        let (Some(vocabulary_id), Some(vocabulary_list_id)) =
            (request.vocabulary_id, request.vocabulary_list_id)
        else {
            return Ok(ReviewTarget::Rejected(MISSING_REVIEW_TARGET));
        };

        if let Some(existing) = self.uow.get_by_user_and_vocabulary(user_id, vocabulary_id)? {
            return Ok(ReviewTarget::Found(existing));
        }

        if self.uow.find_by_id(vocabulary_list_id)?.is_none() {
            log::warn!("Vocabulary list {} not found", vocabulary_list_id);
            return Ok(ReviewTarget::Rejected(VOCABULARY_LIST_NOT_FOUND));
        }

        let created = self.uow.add(
            UserSpacedRepetition::new_for_list(user_id, vocabulary_list_id, now)
                .with_vocabulary(vocabulary_id),
        )?;
        self.uow.complete()?;
        log::info!(
            "Created word-level repetition {} for user {} (word {})",
            created.user_spaced_repetition_id,
            user_id,
            vocabulary_id
        );

        Ok(ReviewTarget::Found(created))
    }

    /// Reviewed items due now whose last rating reset them to one day
    pub fn get_due_for_review(&mut self, user_id: i32) -> Result<Vec<SpacedRepetitionDto>, StoreError> {
        let now = self.now();
        let due = self.uow.get_due_for_review(user_id, now)?;
        Ok(due.iter().map(|r| to_dto(r, now, true)).collect())
    }

    pub fn get_user_repetitions(
        &mut self,
        user_id: i32,
    ) -> Result<Vec<SpacedRepetitionDto>, StoreError> {
        let now = self.now();
        let records = self.uow.get_by_user_id(user_id)?;
        Ok(records
            .iter()
            .map(|r| to_dto(r, now, is_due_at(r, now)))
            .collect())
    }

    pub fn get_by_user_and_list(
        &mut self,
        user_id: i32,
        vocabulary_list_id: i32,
    ) -> Result<Option<SpacedRepetitionDto>, StoreError> {
        let now = self.now();
        let record = self.uow.get_by_user_and_list(user_id, vocabulary_list_id)?;
        Ok(record.map(|r| to_dto(&r, now, is_due_at(&r, now))))
    }

    /// Starts tracking a list for a user. Returns the existing record if
    /// there already is one.
    pub fn create_repetition(
        &mut self,
        user_id: i32,
        vocabulary_list_id: i32,
    ) -> Result<SpacedRepetitionDto, SrsError> {
        if self.uow.exists(user_id, vocabulary_list_id)? {
            return self
                .get_by_user_and_list(user_id, vocabulary_list_id)?
                .ok_or(SrsError::RepetitionUnavailable {
                    user_id,
                    vocabulary_list_id,
                });
        }

        let list = self
            .uow
            .find_by_id(vocabulary_list_id)?
            .ok_or(SrsError::VocabularyListNotFound(vocabulary_list_id))?;

        let now = self.now();
        let mut created = self
            .uow
            .add(UserSpacedRepetition::new_for_list(user_id, vocabulary_list_id, now))?;
        self.uow.complete()?;
        created.vocabulary_list_name.get_or_insert(list.name);

        log::info!(
            "Created repetition {} for user {} on list {}",
            created.user_spaced_repetition_id,
            user_id,
            vocabulary_list_id
        );

        Ok(to_dto(&created, now, false))
    }

    pub fn save_quiz_result(
        &mut self,
        user_id: i32,
        request: &SaveQuizResultRequest,
    ) -> Result<bool, SrsError> {
        let now = self.now();
        let list_id = request.vocabulary_list_id;

        let mut repetition = match self.uow.get_by_user_and_list(user_id, list_id)? {
            Some(repetition) => repetition,
            None => {
                self.uow
                    .find_by_id(list_id)?
                    .ok_or(SrsError::VocabularyListNotFound(list_id))?;
                self.uow
                    .add(UserSpacedRepetition::new_for_list(user_id, list_id, now))?
            }
        };

        repetition.last_quiz_score = Some(request.score);
        repetition.last_quiz_completed_at = Some(now);
        repetition.total_quiz_attempts = Some(repetition.total_quiz_attempts.unwrap_or(0) + 1);
        if repetition.best_quiz_score.is_none_or(|best| request.score > best) {
            repetition.best_quiz_score = Some(request.score);
        }
        repetition.status = Some(engine::derived_status(&repetition));

        self.uow.update(repetition)?;
        self.uow.complete()?;

        log::info!("Saved quiz score {} for user {} on list {}", request.score, user_id, list_id);
        Ok(true)
    }

    /// Quiz history per list; lists never quizzed are left out
    pub fn get_quiz_scores(
        &mut self,
        user_id: i32,
        vocabulary_list_id: Option<i32>,
    ) -> Result<Vec<QuizScoreDto>, StoreError> {
        let records = match vocabulary_list_id {
            Some(list_id) => self
                .uow
                .get_by_user_and_list(user_id, list_id)?
                .into_iter()
                .collect(),
            None => self.uow.get_by_user_id(user_id)?,
        };

        Ok(records
            .into_iter()
            .filter(UserSpacedRepetition::has_quiz_score)
            .map(|r| QuizScoreDto {
                vocabulary_list_id: r.vocabulary_list_id,
                vocabulary_list_name: list_name(&r),
                best_score: r.best_quiz_score,
                last_score: r.last_quiz_score,
                last_completed_at: r.last_quiz_completed_at,
                total_attempts: r.total_quiz_attempts,
            })
            .collect())
    }
}

fn list_name(record: &UserSpacedRepetition) -> String {
    record
        .vocabulary_list_name
        .clone()
        .unwrap_or_else(|| UNKNOWN_LIST_NAME.to_string())
}

fn is_due_at(record: &UserSpacedRepetition, now: NaiveDateTime) -> bool {
    record.next_review_at.is_some_and(|next| next <= now)
}

fn to_dto(record: &UserSpacedRepetition, now: NaiveDateTime, is_due: bool) -> SpacedRepetitionDto {
    let state = RepetitionState::of(record);

    SpacedRepetitionDto {
        user_spaced_repetition_id: record.user_spaced_repetition_id,
        user_id: record.user_id,
        vocabulary_id: record.vocabulary_id,
        vocabulary_list_id: record.vocabulary_list_id,
        vocabulary_list_name: list_name(record),
        vocabulary_word: record.vocabulary_word.clone(),
        last_reviewed_at: record.last_reviewed_at,
        next_review_at: record.next_review_at,
        review_count: state.review_count,
        intervals: state.interval_days,
        status: engine::derived_status(record),
        is_due,
        days_until_review: engine::days_until_review(record.next_review_at, now),
        best_quiz_score: record.best_quiz_score,
        last_quiz_score: record.last_quiz_score,
        last_quiz_completed_at: record.last_quiz_completed_at,
        total_quiz_attempts: record.total_quiz_attempts,
    }
}
