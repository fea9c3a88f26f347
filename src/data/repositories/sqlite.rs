use chrono::NaiveDateTime;
use diesel::connection::{AnsiTransactionManager, TransactionManager};
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::sql_types::Integer;
use std::collections::HashMap;

use crate::data::models::{
    RepetitionRow, ReviewStatus, StoreError, UserSpacedRepetition, VocabularyList,
};
use crate::data::repositories::{RepetitionRepository, UnitOfWork, VocabularyListRepository};
use crate::schema::{user_spaced_repetitions, vocabularies, vocabulary_lists};

/// Unit of work over one borrowed SQLite connection.
///
/// The first write opens a transaction; `complete` commits it. Dropping the
/// unit of work with writes still pending rolls them back.
pub struct SqliteUnitOfWork<'a> {
    conn: &'a mut SqliteConnection,
    in_transaction: bool,
    affected: usize,
}

impl<'a> SqliteUnitOfWork<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        SqliteUnitOfWork {
            conn,
            in_transaction: false,
            affected: 0,
        }
    }

    fn begin_if_needed(&mut self) -> Result<(), StoreError> {
        if !self.in_transaction {
            AnsiTransactionManager::begin_transaction(self.conn)?;
            self.in_transaction = true;
        }
        Ok(())
    }

    /// Attaches list names and word text to loaded rows
    fn hydrate(&mut self, rows: Vec<RepetitionRow>) -> Result<Vec<UserSpacedRepetition>, StoreError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let list_ids: Vec<i32> = rows.iter().map(|r| r.vocabulary_list_id).collect();
        let word_ids: Vec<i32> = rows.iter().filter_map(|r| r.vocabulary_id).collect();

        let list_names: HashMap<i32, String> = vocabulary_lists::table
            .filter(vocabulary_lists::vocabulary_list_id.eq_any(list_ids))
            .select((vocabulary_lists::vocabulary_list_id, vocabulary_lists::name))
            .load::<(i32, String)>(self.conn)?
            .into_iter()
            .collect();

        let words: HashMap<i32, String> = if word_ids.is_empty() {
            HashMap::new()
        } else {
            vocabularies::table
                .filter(vocabularies::vocabulary_id.eq_any(word_ids))
                .select((vocabularies::vocabulary_id, vocabularies::word))
                .load::<(i32, String)>(self.conn)?
                .into_iter()
                .collect()
        };

        rows.into_iter()
            .map(|row| {
                let list_name = list_names.get(&row.vocabulary_list_id).cloned();
                let word = row.vocabulary_id.and_then(|id| words.get(&id).cloned());
                UserSpacedRepetition::from_row(row, list_name, word)
            })
            .collect()
    }

    fn hydrate_one(
        &mut self,
        row: Option<RepetitionRow>,
    ) -> Result<Option<UserSpacedRepetition>, StoreError> {
        match row {
            Some(row) => Ok(self.hydrate(vec![row])?.pop()),
            None => Ok(None),
        }
    }
}

impl RepetitionRepository for SqliteUnitOfWork<'_> {
    fn get_by_id(&mut self, id: i32) -> Result<Option<UserSpacedRepetition>, StoreError> {
        let row = user_spaced_repetitions::table
            .find(id)
            .first::<RepetitionRow>(self.conn)
            .optional()?;
        self.hydrate_one(row)
    }

    fn get_by_user_and_list(
        &mut self,
        user_id: i32,
        vocabulary_list_id: i32,
    ) -> Result<Option<UserSpacedRepetition>, StoreError> {
        let row = user_spaced_repetitions::table
            .filter(user_spaced_repetitions::user_id.eq(user_id))
            .filter(user_spaced_repetitions::vocabulary_list_id.eq(vocabulary_list_id))
            .first::<RepetitionRow>(self.conn)
            .optional()?;
        self.hydrate_one(row)
    }

    fn get_by_user_and_vocabulary(
        &mut self,
        user_id: i32,
        vocabulary_id: i32,
    ) -> Result<Option<UserSpacedRepetition>, StoreError> {
        let row = user_spaced_repetitions::table
            .filter(user_spaced_repetitions::user_id.eq(user_id))
            .filter(user_spaced_repetitions::vocabulary_id.eq(vocabulary_id))
            .first::<RepetitionRow>(self.conn)
            .optional()?;
        self.hydrate_one(row)
    }

    fn get_due_for_review(
        &mut self,
        user_id: i32,
        now: NaiveDateTime,
    ) -> Result<Vec<UserSpacedRepetition>, StoreError> {
        let rows = user_spaced_repetitions::table
            .filter(user_spaced_repetitions::user_id.eq(user_id))
            .filter(user_spaced_repetitions::next_review_at.le(now))
            .filter(
                user_spaced_repetitions::status
                    .is_null()
                    .or(user_spaced_repetitions::status.eq_any([
                        ReviewStatus::New.as_str(),
                        ReviewStatus::Learning.as_str(),
                    ])),
            )
            .filter(user_spaced_repetitions::review_count.gt(0))
            .filter(
                user_spaced_repetitions::intervals
                    .is_null()
                    .or(user_spaced_repetitions::intervals.eq(1)),
            )
            .order(user_spaced_repetitions::next_review_at.asc())
            .load::<RepetitionRow>(self.conn)?;
        self.hydrate(rows)
    }

    fn get_by_user_id(&mut self, user_id: i32) -> Result<Vec<UserSpacedRepetition>, StoreError> {
        let rows = user_spaced_repetitions::table
            .filter(user_spaced_repetitions::user_id.eq(user_id))
            .order(user_spaced_repetitions::next_review_at.desc())
            .load::<RepetitionRow>(self.conn)?;
        self.hydrate(rows)
    }

    fn exists(&mut self, user_id: i32, vocabulary_list_id: i32) -> Result<bool, StoreError> {
        let found = diesel::select(exists(
            user_spaced_repetitions::table
                .filter(user_spaced_repetitions::user_id.eq(user_id))
                .filter(user_spaced_repetitions::vocabulary_list_id.eq(vocabulary_list_id)),
        ))
        .get_result::<bool>(self.conn)?;
        Ok(found)
    }

    fn add(&mut self, record: UserSpacedRepetition) -> Result<UserSpacedRepetition, StoreError> {
        self.begin_if_needed()?;

        self.affected += diesel::insert_into(user_spaced_repetitions::table)
            .values(&record.values())
            .execute(self.conn)?;

        let id = diesel::select(diesel::dsl::sql::<Integer>("last_insert_rowid()"))
            .get_result::<i32>(self.conn)?;

        self.get_by_id(id)?
            .ok_or(StoreError::Database(DieselError::NotFound))
    }

    fn update(&mut self, record: UserSpacedRepetition) -> Result<UserSpacedRepetition, StoreError> {
        self.begin_if_needed()?;

        self.affected += diesel::update(
            user_spaced_repetitions::table.find(record.user_spaced_repetition_id),
        )
        .set(&record.values())
        .execute(self.conn)?;

        Ok(record)
    }
}

impl VocabularyListRepository for SqliteUnitOfWork<'_> {
    fn find_by_id(&mut self, vocabulary_list_id: i32) -> Result<Option<VocabularyList>, StoreError> {
        let list = vocabulary_lists::table
            .find(vocabulary_list_id)
            .first::<VocabularyList>(self.conn)
            .optional()?;
        Ok(list)
    }
}

impl UnitOfWork for SqliteUnitOfWork<'_> {
    fn complete(&mut self) -> Result<usize, StoreError> {
        if !self.in_transaction {
            return Ok(0);
        }

        AnsiTransactionManager::commit_transaction(self.conn)?;
        self.in_transaction = false;
        Ok(std::mem::take(&mut self.affected))
    }
}

impl Drop for SqliteUnitOfWork<'_> {
    fn drop(&mut self) {
        if self.in_transaction {
            if let Err(e) = AnsiTransactionManager::rollback_transaction(self.conn) {
                log::error!("Failed to roll back uncommitted repetition changes: {}", e);
            }
        }
    }
}
