use crate::data::models::{NewVocabulary, NewVocabularyList, VocabularyList};
use crate::schema::{vocabularies, vocabulary_lists};
use diesel::prelude::*;
use diesel::sql_types::Integer;

/// Catalogue writes for vocabulary lists and their words.
///
/// Lists are owned by the content side of the application; these helpers
/// exist so repetition records have something to reference.
pub struct VocabularyRepository;

impl VocabularyRepository {
    pub fn create_list(
        conn: &mut SqliteConnection,
        name: &str,
    ) -> Result<VocabularyList, diesel::result::Error> {
        diesel::insert_into(vocabulary_lists::table)
            .values(&NewVocabularyList { name })
            .execute(conn)?;

        let vocabulary_list_id = last_insert_id(conn)?;

        vocabulary_lists::table
            .find(vocabulary_list_id)
            .first::<VocabularyList>(conn)
    }

    pub fn create_word(
        conn: &mut SqliteConnection,
        vocabulary_list_id: i32,
        word: &str,
    ) -> Result<i32, diesel::result::Error> {
        diesel::insert_into(vocabularies::table)
            .values(&NewVocabulary {
                vocabulary_list_id,
                word,
            })
            .execute(conn)?;

        last_insert_id(conn)
    }
}

fn last_insert_id(conn: &mut SqliteConnection) -> Result<i32, diesel::result::Error> {
    diesel::select(diesel::dsl::sql::<Integer>("last_insert_rowid()")).get_result::<i32>(conn)
}
