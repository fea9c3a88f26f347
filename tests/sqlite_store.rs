use chrono::{Duration, NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use lumina_srs::config::{self, DbConfig};
use lumina_srs::data::models::{ReviewRequest, ReviewStatus, SaveQuizResultRequest, UserSpacedRepetition};
use lumina_srs::data::repositories::{
    RepetitionRepository, SqliteUnitOfWork, UnitOfWork, VocabularyListRepository,
    VocabularyRepository,
};
use lumina_srs::SpacedRepetitionService;

const USER: i32 = 7;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 9, 1)
        .unwrap()
        .and_hms_opt(6, 0, 0)
        .unwrap()
}

fn connection() -> SqliteConnection {
    config::init_logging();
    let mut conn = SqliteConnection::establish(":memory:").unwrap();
    config::ensure_schema(&mut conn).unwrap();
    conn
}

/// Commits a reviewed record with the given interval and returns its id
fn seed_record(conn: &mut SqliteConnection, list_id: i32, intervals: i32, review_count: i32) -> i32 {
    let mut record = UserSpacedRepetition::new_for_list(USER, list_id, now() - Duration::days(3));
    record.intervals = Some(intervals);
    record.review_count = Some(review_count);
    record.status = Some(ReviewStatus::Learning);

    let mut uow = SqliteUnitOfWork::new(conn);
    let added = uow.add(record).unwrap();
    uow.complete().unwrap();
    added.user_spaced_repetition_id
}

#[test]
fn review_is_persisted() {
    let mut conn = connection();
    let list = VocabularyRepository::create_list(&mut conn, "Travel").unwrap();
    let id = seed_record(&mut conn, list.vocabulary_list_id, 5, 2);

    let response = {
        let mut uow = SqliteUnitOfWork::new(&mut conn);
        SpacedRepetitionService::new(&mut uow)
            .at(now())
            .review(USER, &ReviewRequest::for_repetition(id, 5))
            .unwrap()
    };

    assert!(response.success);
    assert_eq!(response.new_intervals, Some(10));
    assert_eq!(response.updated_repetition.unwrap().vocabulary_list_name, "Travel");

    let mut uow = SqliteUnitOfWork::new(&mut conn);
    let stored = uow.get_by_id(id).unwrap().unwrap();
    assert_eq!(stored.intervals, Some(10));
    assert_eq!(stored.review_count, Some(3));
    assert_eq!(stored.status, Some(ReviewStatus::Learning));
    assert_eq!(stored.next_review_at, Some(now() + Duration::days(10)));
}

#[test]
fn review_by_another_user_changes_nothing() {
    let mut conn = connection();
    let list = VocabularyRepository::create_list(&mut conn, "Travel").unwrap();
    let id = seed_record(&mut conn, list.vocabulary_list_id, 5, 2);

    let response = {
        let mut uow = SqliteUnitOfWork::new(&mut conn);
        SpacedRepetitionService::new(&mut uow)
            .at(now())
            .review(USER + 1, &ReviewRequest::for_repetition(id, 5))
            .unwrap()
    };

    assert!(!response.success);
    let mut uow = SqliteUnitOfWork::new(&mut conn);
    assert_eq!(uow.get_by_id(id).unwrap().unwrap().intervals, Some(5));
}

#[test]
fn dropped_unit_of_work_rolls_back() {
    let mut conn = connection();
    let list = VocabularyRepository::create_list(&mut conn, "Food").unwrap();

    {
        let mut uow = SqliteUnitOfWork::new(&mut conn);
        uow.add(UserSpacedRepetition::new_for_list(USER, list.vocabulary_list_id, now()))
            .unwrap();
        assert!(uow.exists(USER, list.vocabulary_list_id).unwrap());
    }

    let mut uow = SqliteUnitOfWork::new(&mut conn);
    assert!(!uow.exists(USER, list.vocabulary_list_id).unwrap());
}

#[test]
fn complete_reports_affected_rows() {
    let mut conn = connection();
    let list = VocabularyRepository::create_list(&mut conn, "Food").unwrap();

    let mut uow = SqliteUnitOfWork::new(&mut conn);
    assert_eq!(uow.complete().unwrap(), 0);

    let added = uow
        .add(UserSpacedRepetition::new_for_list(USER, list.vocabulary_list_id, now()))
        .unwrap();
    uow.update(added).unwrap();
    assert_eq!(uow.complete().unwrap(), 2);
}

#[test]
fn word_review_creates_record_with_word() {
    let mut conn = connection();
    let list = VocabularyRepository::create_list(&mut conn, "Fruit").unwrap();
    let word = VocabularyRepository::create_word(&mut conn, list.vocabulary_list_id, "mango").unwrap();

    let response = {
        let mut uow = SqliteUnitOfWork::new(&mut conn);
        SpacedRepetitionService::new(&mut uow)
            .at(now())
            .review(USER, &ReviewRequest::for_word(word, list.vocabulary_list_id, 5))
            .unwrap()
    };

    let updated = response.updated_repetition.unwrap();
    assert_eq!(updated.vocabulary_word.as_deref(), Some("mango"));
    assert_eq!(updated.vocabulary_list_name, "Fruit");
    assert_eq!(response.new_intervals, Some(2));

    let mut uow = SqliteUnitOfWork::new(&mut conn);
    let stored = uow.get_by_user_and_vocabulary(USER, word).unwrap().unwrap();
    assert_eq!(stored.review_count, Some(1));
}

#[test]
fn due_query_matches_reset_items_only() {
    let mut conn = connection();
    let list = VocabularyRepository::create_list(&mut conn, "Verbs").unwrap();
    let other = VocabularyRepository::create_list(&mut conn, "Nouns").unwrap();
    let due_id = seed_record(&mut conn, list.vocabulary_list_id, 1, 3);
    seed_record(&mut conn, other.vocabulary_list_id, 6, 3);

    let mut uow = SqliteUnitOfWork::new(&mut conn);
    let due = SpacedRepetitionService::new(&mut uow)
        .at(now())
        .get_due_for_review(USER)
        .unwrap();

    assert_eq!(due.len(), 1);
    assert_eq!(due[0].user_spaced_repetition_id, due_id);
    assert_eq!(due[0].vocabulary_list_name, "Verbs");
    assert!(due[0].is_due);
}

#[test]
fn create_and_quiz_flow() {
    let mut conn = connection();
    let list = VocabularyRepository::create_list(&mut conn, "Colours").unwrap();
    let list_id = list.vocabulary_list_id;

    let mut uow = SqliteUnitOfWork::new(&mut conn);
    let mut service = SpacedRepetitionService::new(&mut uow).at(now());

    let created = service.create_repetition(USER, list_id).unwrap();
    let again = service.create_repetition(USER, list_id).unwrap();
    assert_eq!(created.user_spaced_repetition_id, again.user_spaced_repetition_id);
    assert_eq!(created.status, ReviewStatus::New);

    let request = SaveQuizResultRequest {
        vocabulary_list_id: list_id,
        score: 75,
    };
    assert!(service.save_quiz_result(USER, &request).unwrap());

    let scores = service.get_quiz_scores(USER, Some(list_id)).unwrap();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].best_score, Some(75));
    assert_eq!(scores[0].total_attempts, Some(1));
    assert_eq!(scores[0].vocabulary_list_name, "Colours");

    let by_list = service.get_by_user_and_list(USER, list_id).unwrap().unwrap();
    assert_eq!(by_list.status, ReviewStatus::Learning);
    assert!(uow.find_by_id(list_id).unwrap().is_some());
}

#[test]
fn pool_creates_schema_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("srs.db");
    let config = DbConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some(format!("sqlite://{}", path.display())),
        "DB_POOL_SIZE" => Some("2".to_string()),
        _ => None,
    });

    let pool = config::establish_pool(&config).unwrap();
    let mut conn = pool.get().unwrap();
    let list = VocabularyRepository::create_list(&mut conn, "Persisted").unwrap();

    let mut uow = SqliteUnitOfWork::new(&mut conn);
    let created = SpacedRepetitionService::new(&mut uow)
        .create_repetition(USER, list.vocabulary_list_id)
        .unwrap();
    assert_eq!(created.vocabulary_list_name, "Persisted");
    assert!(path.exists());
}
