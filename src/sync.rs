//! Quiz synchronization: reconcile the stored questions of a quiz with a
//! submitted full snapshot.
//!
//! After the metadata write, the question writes are computed in full
//! ([`SyncPlan`]) before any of them is sent, then applied in a fixed order:
//! upserts in submission order, then deletions. Every step is an idempotent put or delete, so replaying a
//! snapshot after a partial failure converges to the same state.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use crate::error::QuizError;
use crate::models::{Question, QuestionInput};
use crate::schema;
use crate::store::{Item, Key, QuizStore, StoreError, WriteOp, MAX_BATCH_SIZE};

/// A validated synchronization request.
#[derive(Debug, Clone)]
pub struct QuizSnapshot {
    pub quiz_id: String,
    pub title: String,
    pub questions: Vec<QuestionInput>,
}

impl QuizSnapshot {
    /// Validates a raw request body. An empty body is read as `{}`.
    pub fn parse(body: &[u8]) -> Result<Self, QuizError> {
        let body: Value = if body.iter().all(u8::is_ascii_whitespace) {
            Value::Object(Default::default())
        } else {
            serde_json::from_slice(body).map_err(|_| QuizError::validation("Invalid JSON"))?
        };
        Self::from_value(&body)
    }

    pub fn from_value(body: &Value) -> Result<Self, QuizError> {
        let quiz_id = scalar_text(body.get("quizId")).trim().to_string();
        if quiz_id.is_empty() {
            return Err(QuizError::validation("quizId required"));
        }

        let title = match scalar_text(body.get("title")).trim() {
            "" => quiz_id.clone(),
            title => title.to_string(),
        };

        let raw_questions = match body.get("questions") {
            Some(Value::Array(items)) => items,
            _ => return Err(QuizError::validation("questions[] required")),
        };

        let questions = raw_questions
            .iter()
            .enumerate()
            .map(|(idx, raw)| {
                serde_json::from_value::<QuestionInput>(raw.clone()).map_err(|e| {
                    QuizError::validation(format!("questions[{}] is invalid: {}", idx, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QuizSnapshot {
            quiz_id,
            title,
            questions,
        })
    }
}

fn scalar_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Applies the defaults for omitted fields and resolves the question id.
pub fn resolve_question(input: &QuestionInput, position: usize) -> Question {
    let explicit = input.q_id.as_ref().map(|id| id.as_text());
    Question {
        q_id: schema::derive_q_id(explicit.as_deref(), position),
        prompt: input.prompt.clone().unwrap_or_default(),
        choices: input.choices.clone().unwrap_or_default(),
        correct: input.correct.clone().unwrap_or_default(),
        explanation: input.explanation.clone().unwrap_or_default(),
    }
}

/// The question writes needed to make a quiz match a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncPlan {
    /// Question records in submission order, one per distinct `qId`.
    pub upserts: Vec<Item>,
    /// Stored questions absent from the snapshot, in key order.
    pub deletes: Vec<Key>,
}

impl SyncPlan {
    /// Diffs `snapshot` against the sort keys of the currently stored
    /// questions.
    pub fn new<I>(snapshot: &QuizSnapshot, existing_sort_keys: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut existing: BTreeSet<String> = existing_sort_keys.into_iter().collect();
        let mut upserts: Vec<Item> = Vec::with_capacity(snapshot.questions.len());
        let mut slots: HashMap<String, usize> = HashMap::new();

        for (idx, input) in snapshot.questions.iter().enumerate() {
            let question = resolve_question(input, idx + 1);
            let item = schema::question_item(&snapshot.quiz_id, &question);
            existing.remove(&item.key.sort);

            match slots.get(&question.q_id) {
                Some(&slot) => {
                    log::warn!(
                        "Quiz {}: question {} submitted more than once, keeping the last entry",
                        snapshot.quiz_id,
                        question.q_id
                    );
                    upserts[slot] = item;
                }
                None => {
                    slots.insert(question.q_id, upserts.len());
                    upserts.push(item);
                }
            }
        }

        let partition = schema::quiz_partition(&snapshot.quiz_id);
        let deletes = existing
            .into_iter()
            .map(|sort| Key::new(partition.clone(), sort))
            .collect();

        SyncPlan {
            upserts,
            deletes,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub upserted: usize,
    pub deleted: usize,
    pub batches: usize,
}

/// Synchronizes one quiz. Store calls are issued strictly one after another;
/// a failure stops the sequence and nothing already written is rolled back.
pub async fn synchronize(
    store: &dyn QuizStore,
    snapshot: &QuizSnapshot,
) -> Result<SyncReport, StoreError> {
    let partition = schema::quiz_partition(&snapshot.quiz_id);

    store
        .put(schema::metadata_item(&snapshot.quiz_id, &snapshot.title))
        .await?;

    let current = store
        .query_prefix(&partition, schema::QUESTION_PREFIX)
        .await?;
    let plan = SyncPlan::new(snapshot, current.into_iter().map(|item| item.key.sort));

    let puts: Vec<WriteOp> = plan.upserts.into_iter().map(WriteOp::Put).collect();
    let dels: Vec<WriteOp> = plan.deletes.into_iter().map(WriteOp::Delete).collect();

    let mut report = SyncReport {
        upserted: puts.len(),
        deleted: dels.len(),
        batches: 0,
    };
    report.batches += write_batches(store, puts).await?;
    report.batches += write_batches(store, dels).await?;

    log::info!(
        "Synchronized quiz {}: {} upserted, {} deleted in {} batches",
        snapshot.quiz_id,
        report.upserted,
        report.deleted,
        report.batches
    );
    Ok(report)
}

async fn write_batches(store: &dyn QuizStore, ops: Vec<WriteOp>) -> Result<usize, StoreError> {
    let mut batches = 0;
    for chunk in ops.chunks(MAX_BATCH_SIZE) {
        store.batch_write(chunk.to_vec()).await?;
        batches += 1;
    }
    Ok(batches)
}
