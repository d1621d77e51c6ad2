use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// One entry of the quiz listing.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub quiz_id: String,
    pub title: String,
}

/// A quiz with its (possibly sampled) questions.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    pub quiz_id: String,
    pub title: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Zero-padded id, unique within the quiz (`"001"`).
    pub q_id: String,
    pub prompt: String,
    pub choices: Vec<String>,
    /// Indices or labels of the correct choices.
    #[schema(value_type = Vec<Object>)]
    pub correct: Vec<Value>,
    pub explanation: String,
}

/// Full snapshot of a quiz, as accepted by `PUT /quizzes`. The body is
/// validated field by field in [`crate::sync::QuizSnapshot::parse`].
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncQuizRequest {
    pub quiz_id: String,
    pub title: Option<String>,
    pub questions: Vec<QuestionInput>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    /// Explicit id; the 1-based position is used when absent.
    #[schema(value_type = Option<String>)]
    pub q_id: Option<QuestionRef>,
    pub prompt: Option<String>,
    pub choices: Option<Vec<String>>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub correct: Option<Vec<Value>>,
    pub explanation: Option<String>,
}

/// A caller-supplied question id, given either as text or as a number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum QuestionRef {
    Number(u64),
    Text(String),
}

impl QuestionRef {
    pub fn as_text(&self) -> String {
        match self {
            QuestionRef::Number(n) => n.to_string(),
            QuestionRef::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
