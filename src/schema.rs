//! Storage layout shared by the reader and the synchronizer.
//!
//! A quiz lives in partition `QUIZ#<quizId>`: one `METADATA` record and one
//! `QUESTION#<qId>` record per question. Metadata records are also placed on
//! the listing index under `QUIZ`, sorted by lower-cased title then id.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::Question;
use crate::store::{Item, Key, INDEX_PARTITION_ATTR, INDEX_SORT_ATTR};

pub const QUIZ_PREFIX: &str = "QUIZ#";
pub const METADATA_SORT: &str = "METADATA";
pub const QUESTION_PREFIX: &str = "QUESTION#";
pub const LISTING_PARTITION: &str = "QUIZ";

pub const ATTR_QUIZ_ID: &str = "quizId";
pub const ATTR_TITLE: &str = "title";
pub const ATTR_PROMPT: &str = "prompt";
pub const ATTR_CHOICES: &str = "choices";
pub const ATTR_CORRECT: &str = "correct";
pub const ATTR_EXPLANATION: &str = "explanation";

const Q_ID_WIDTH: usize = 3;

pub fn quiz_partition(quiz_id: &str) -> String {
    format!("{QUIZ_PREFIX}{quiz_id}")
}

pub fn metadata_key(quiz_id: &str) -> Key {
    Key::new(quiz_partition(quiz_id), METADATA_SORT)
}

pub fn question_key(quiz_id: &str, q_id: &str) -> Key {
    Key::new(quiz_partition(quiz_id), format!("{QUESTION_PREFIX}{q_id}"))
}

/// Sort key on the listing index: `lower(title)#quizId`.
pub fn listing_sort_key(title: &str, quiz_id: &str) -> String {
    format!("{}#{}", title.to_lowercase(), quiz_id)
}

/// Zero-pads a question id to at least three characters (`"7"` -> `"007"`).
/// Longer ids are kept as they are.
pub fn pad_q_id(raw: &str) -> String {
    format!("{raw:0>width$}", width = Q_ID_WIDTH)
}

/// Resolves the stored id of a submitted question: the explicit id when one
/// was given, otherwise its 1-based position in the snapshot.
pub fn derive_q_id(explicit: Option<&str>, position: usize) -> String {
    match explicit.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => pad_q_id(id),
        None => pad_q_id(&position.to_string()),
    }
}

pub fn metadata_item(quiz_id: &str, title: &str) -> Item {
    Item::new(metadata_key(quiz_id))
        .with(ATTR_QUIZ_ID, quiz_id)
        .with(ATTR_TITLE, title)
        .with(INDEX_PARTITION_ATTR, LISTING_PARTITION)
        .with(INDEX_SORT_ATTR, listing_sort_key(title, quiz_id))
}

pub fn question_item(quiz_id: &str, question: &Question) -> Item {
    Item::new(question_key(quiz_id, &question.q_id))
        .with(ATTR_PROMPT, question.prompt.as_str())
        .with(ATTR_CHOICES, encode_list(&question.choices))
        .with(ATTR_CORRECT, encode_list(&question.correct))
        .with(ATTR_EXPLANATION, question.explanation.as_str())
}

pub fn question_from_item(item: &Item) -> Question {
    let q_id = item
        .key
        .sort
        .strip_prefix(QUESTION_PREFIX)
        .unwrap_or(&item.key.sort)
        .to_string();

    Question {
        q_id,
        prompt: item.attr(ATTR_PROMPT).unwrap_or_default().to_string(),
        choices: decode_list(item.attr(ATTR_CHOICES)),
        correct: decode_list(item.attr(ATTR_CORRECT)),
        explanation: item.attr(ATTR_EXPLANATION).unwrap_or_default().to_string(),
    }
}

/// Quiz id of a metadata record: its own attribute, else the partition key
/// with the `QUIZ#` prefix removed.
pub fn quiz_id_of(item: &Item) -> String {
    match item.attr(ATTR_QUIZ_ID).filter(|id| !id.is_empty()) {
        Some(id) => id.to_string(),
        None => item
            .key
            .partition
            .strip_prefix(QUIZ_PREFIX)
            .unwrap_or(&item.key.partition)
            .to_string(),
    }
}

pub fn encode_list<T: Serialize>(values: &[T]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

/// Decodes a serialized sequence. Missing, `null` or corrupt text yields an
/// empty list.
pub fn decode_list<T: DeserializeOwned>(raw: Option<&str>) -> Vec<T> {
    raw.and_then(|text| serde_json::from_str::<Option<Vec<T>>>(text).ok())
        .flatten()
        .unwrap_or_default()
}
