//! Quiz retrieval: the listing, single quizzes and random sampling.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{QuizSummary, QuizView};
use crate::schema;
use crate::store::{QuizStore, StoreError};

const UNTITLED: &str = "Untitled";

/// How a single-quiz read selects its questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Every question, ordered by `qId`.
    All,
    /// A uniformly random subset of at most this many questions.
    Sample(usize),
}

impl Selection {
    /// Admin reads always return the full set; otherwise a `count` turns on
    /// sampling.
    pub fn new(count: Option<usize>, admin: bool) -> Self {
        match count {
            Some(n) if !admin => Selection::Sample(n),
            _ => Selection::All,
        }
    }

    pub fn apply<T, R: Rng + ?Sized>(self, items: &mut Vec<T>, rng: &mut R) {
        if let Selection::Sample(n) = self {
            items.shuffle(rng);
            items.truncate(n);
        }
    }
}

/// Parses the `admin` query flag: only `"1"` and `"true"` enable it.
pub fn parse_admin(raw: Option<&str>) -> bool {
    matches!(raw, Some("1") | Some("true"))
}

/// Parses the `count` query parameter. Integers below one are clamped to
/// one; anything non-numeric counts as no limit.
pub fn parse_count(raw: Option<&str>) -> Option<usize> {
    let n: i64 = raw?.trim().parse().ok()?;
    Some(usize::try_from(n.max(1)).unwrap_or(usize::MAX))
}

/// One entry per metadata record on the listing index. Titles fall back to
/// the stored `quizId` attribute, then to `"Untitled"`.
pub async fn list_quizzes(store: &dyn QuizStore) -> Result<Vec<QuizSummary>, StoreError> {
    let items = store.query_index(schema::LISTING_PARTITION).await?;

    Ok(items
        .iter()
        .map(|item| {
            let title = [schema::ATTR_TITLE, schema::ATTR_QUIZ_ID]
                .into_iter()
                .filter_map(|name| item.attr(name))
                .find(|value| !value.is_empty())
                .unwrap_or(UNTITLED)
                .to_string();
            QuizSummary {
                quiz_id: schema::quiz_id_of(item),
                title,
            }
        })
        .collect())
}

/// Loads a quiz with every stored question in ordinal `qId` order, so
/// `"999"` precedes `"1000"`. A quiz without metadata is still read, titled
/// by its id.
pub async fn fetch_quiz(store: &dyn QuizStore, quiz_id: &str) -> Result<QuizView, StoreError> {
    let metadata = store.get(&schema::metadata_key(quiz_id)).await?;
    let title = metadata
        .as_ref()
        .and_then(|item| item.attr(schema::ATTR_TITLE))
        .filter(|title| !title.is_empty())
        .unwrap_or(quiz_id)
        .to_string();

    let items = store
        .query_prefix(&schema::quiz_partition(quiz_id), schema::QUESTION_PREFIX)
        .await?;
    let mut questions: Vec<_> = items.iter().map(schema::question_from_item).collect();
    questions.sort_by(|a, b| (a.q_id.len(), &a.q_id).cmp(&(b.q_id.len(), &b.q_id)));

    Ok(QuizView {
        quiz_id: quiz_id.to_string(),
        title,
        questions,
    })
}

pub async fn read_quiz<R: Rng + ?Sized>(
    store: &dyn QuizStore,
    quiz_id: &str,
    selection: Selection,
    rng: &mut R,
) -> Result<QuizView, StoreError> {
    let mut quiz = fetch_quiz(store, quiz_id).await?;
    selection.apply(&mut quiz.questions, rng);
    Ok(quiz)
}
