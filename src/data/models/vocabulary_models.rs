use diesel::{Insertable, Queryable};
use serde::Serialize;

use crate::schema::{vocabularies, vocabulary_lists};

/// A named collection of vocabulary that learners study as a unit
#[derive(Debug, Clone, PartialEq, Serialize, Queryable)]
pub struct VocabularyList {
    pub vocabulary_list_id: i32,
    pub name: String,
}

#[derive(Insertable)]
#[diesel(table_name = vocabulary_lists)]
pub struct NewVocabularyList<'a> {
    pub name: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = vocabularies)]
pub struct NewVocabulary<'a> {
    pub vocabulary_list_id: i32,
    pub word: &'a str,
}
