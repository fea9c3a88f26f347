use chrono::{Duration, NaiveDateTime};

use crate::data::models::{ReviewStatus, UserSpacedRepetition};

pub const MIN_QUALITY: i32 = 0;
pub const MAX_QUALITY: i32 = 5;
pub const MIN_INTERVAL_DAYS: i32 = 1;
pub const MAX_INTERVAL_DAYS: i32 = 90;
pub const MASTERED_THRESHOLD_DAYS: i32 = 30;

const DEFAULT_REVIEW_COUNT: i32 = 0;
const DEFAULT_INTERVAL_DAYS: i32 = 1;

/// Self-rated recall quality, always within 0-5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(i32);

impl Quality {
    /// Out-of-range ratings are pulled to the nearest bound, never rejected
    pub fn clamped(raw: i32) -> Self {
        Quality(raw.clamp(MIN_QUALITY, MAX_QUALITY))
    }

    pub fn value(self) -> i32 {
        self.0
    }

    /// Interval multiplier for good recall: 1.5 at 4, 2.0 at 5
    fn growth_factor(self) -> f64 {
        1.0 + (self.0 - 3) as f64 * 0.5
    }
}

/// Scheduling inputs with stored nulls already resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepetitionState {
    pub review_count: i32,
    pub interval_days: i32,
}

impl RepetitionState {
    pub fn of(record: &UserSpacedRepetition) -> Self {
        RepetitionState {
            review_count: record.review_count.unwrap_or(DEFAULT_REVIEW_COUNT),
            interval_days: record.intervals.unwrap_or(DEFAULT_INTERVAL_DAYS),
        }
    }
}

/// Outcome of one review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub interval_days: i32,
    pub status: ReviewStatus,
    pub review_count: i32,
    pub last_reviewed_at: NaiveDateTime,
    pub next_review_at: NaiveDateTime,
}

impl Schedule {
    pub fn apply_to(&self, record: &mut UserSpacedRepetition) {
        record.last_reviewed_at = Some(self.last_reviewed_at);
        record.next_review_at = Some(self.next_review_at);
        record.review_count = Some(self.review_count);
        record.intervals = Some(self.interval_days);
        record.status = Some(self.status);
    }
}

/// Next interval in days: reset below 3, keep at 3, grow above 3, bounded to 1-90
pub fn next_interval(quality: Quality, current_interval: i32) -> i32 {
    let current = current_interval.max(MIN_INTERVAL_DAYS);

    let next = match quality.value() {
        q if q < 3 => MIN_INTERVAL_DAYS,
        3 => current,
        _ => (current as f64 * quality.growth_factor()).round() as i32,
    };

    next.clamp(MIN_INTERVAL_DAYS, MAX_INTERVAL_DAYS)
}

pub fn status_for_interval(interval_days: i32) -> ReviewStatus {
    if interval_days >= MASTERED_THRESHOLD_DAYS {
        ReviewStatus::Mastered
    } else {
        ReviewStatus::Learning
    }
}

/// Status shown for a stored record, derived from its progress rather than
/// from the persisted status text.
pub fn derived_status(record: &UserSpacedRepetition) -> ReviewStatus {
    if record.intervals.is_some_and(|i| i >= MASTERED_THRESHOLD_DAYS) {
        return ReviewStatus::Mastered;
    }

    let reviewed = record.review_count.is_some_and(|c| c > 0);
    if reviewed || record.has_quiz_score() {
        ReviewStatus::Learning
    } else {
        ReviewStatus::New
    }
}

pub fn schedule(state: RepetitionState, quality: Quality, now: NaiveDateTime) -> Schedule {
    let interval_days = next_interval(quality, state.interval_days);

    Schedule {
        interval_days,
        status: status_for_interval(interval_days),
        review_count: state.review_count.saturating_add(1),
        last_reviewed_at: now,
        next_review_at: now + Duration::days(interval_days as i64),
    }
}

/// Whole days until `next_review_at`, never negative; 0 when unscheduled
pub fn days_until_review(next_review_at: Option<NaiveDateTime>, now: NaiveDateTime) -> i64 {
    next_review_at
        .map(|next| (next - now).num_days().max(0))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn state(review_count: i32, interval_days: i32) -> RepetitionState {
        RepetitionState {
            review_count,
            interval_days,
        }
    }

    #[test]
    fn quality_is_clamped_to_range() {
        assert_eq!(Quality::clamped(10).value(), 5);
        assert_eq!(Quality::clamped(-3).value(), 0);
        assert_eq!(Quality::clamped(4).value(), 4);
    }

    #[test]
    fn poor_recall_resets_interval() {
        for q in 0..3 {
            assert_eq!(next_interval(Quality::clamped(q), 10), 1);
        }
    }

    #[test]
    fn medium_recall_keeps_interval() {
        assert_eq!(next_interval(Quality::clamped(3), 5), 5);
        assert_eq!(next_interval(Quality::clamped(3), 1), 1);
    }

    #[test]
    fn good_recall_grows_interval() {
        assert_eq!(next_interval(Quality::clamped(4), 4), 6);
        assert_eq!(next_interval(Quality::clamped(5), 5), 10);
        assert_eq!(next_interval(Quality::clamped(4), 1), 2);
    }

    #[test]
    fn interval_is_capped_at_ninety_days() {
        assert_eq!(next_interval(Quality::clamped(5), 80), 90);
        assert_eq!(next_interval(Quality::clamped(3), 400), 90);
    }

    #[test]
    fn non_positive_interval_is_treated_as_one() {
        assert_eq!(next_interval(Quality::clamped(3), 0), 1);
        assert_eq!(next_interval(Quality::clamped(5), -4), 2);
    }

    #[test]
    fn long_interval_is_mastered() {
        let result = schedule(state(4, 25), Quality::clamped(5), now());
        assert_eq!(result.interval_days, 50);
        assert_eq!(result.status, ReviewStatus::Mastered);
    }

    #[test]
    fn schedule_advances_dates_and_count() {
        let result = schedule(state(2, 5), Quality::clamped(5), now());

        assert_eq!(result.review_count, 3);
        assert_eq!(result.last_reviewed_at, now());
        assert_eq!(result.next_review_at, now() + Duration::days(10));
        assert_eq!(result.status, ReviewStatus::Learning);
    }

    #[test]
    fn missing_fields_resolve_to_defaults() {
        let mut record = UserSpacedRepetition::new_for_list(1, 1, now());
        record.review_count = None;
        record.intervals = None;

        assert_eq!(RepetitionState::of(&record), state(0, 1));
    }

    #[test]
    fn derived_status_follows_progress() {
        let mut record = UserSpacedRepetition::new_for_list(1, 1, now());
        assert_eq!(derived_status(&record), ReviewStatus::New);

        record.last_quiz_score = Some(40);
        assert_eq!(derived_status(&record), ReviewStatus::Learning);

        record.intervals = Some(30);
        assert_eq!(derived_status(&record), ReviewStatus::Mastered);
    }

    #[test]
    fn days_until_review_never_negative() {
        assert_eq!(days_until_review(None, now()), 0);
        assert_eq!(days_until_review(Some(now() - Duration::days(3)), now()), 0);
        assert_eq!(days_until_review(Some(now() + Duration::days(6)), now()), 6);
    }

    proptest! {
        #[test]
        fn prop_interval_stays_in_bounds(q in -20i32..20, current in -10i32..500) {
            let next = next_interval(Quality::clamped(q), current);
            prop_assert!((MIN_INTERVAL_DAYS..=MAX_INTERVAL_DAYS).contains(&next));
        }

        #[test]
        fn prop_out_of_range_quality_matches_bound(q in 6i32..1000, current in 1i32..=90) {
            prop_assert_eq!(
                next_interval(Quality::clamped(q), current),
                next_interval(Quality::clamped(MAX_QUALITY), current)
            );
            prop_assert_eq!(
                next_interval(Quality::clamped(-q), current),
                next_interval(Quality::clamped(MIN_QUALITY), current)
            );
        }

        #[test]
        fn prop_good_recall_strictly_grows_below_cap(current in 1i32..60) {
            let four = next_interval(Quality::clamped(4), current);
            let five = next_interval(Quality::clamped(5), current);
            prop_assert!(four > current);
            prop_assert!(five >= four);
        }

        #[test]
        fn prop_mastered_iff_thirty_days(q in 0i32..=5, current in 1i32..=90, count in 0i32..50) {
            let result = schedule(state(count, current), Quality::clamped(q), now());
            prop_assert_eq!(
                result.status == ReviewStatus::Mastered,
                result.interval_days >= MASTERED_THRESHOLD_DAYS
            );
        }
    }
}
