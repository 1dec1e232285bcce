// src/models/session.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    question::{PublicQuestion, QuestionSet},
    results::ResultsPayload,
};

/// Where a quiz session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "position", rename_all = "camelCase")]
pub enum Phase {
    /// No quiz has been started.
    Idle,
    /// The question at `position` is displayed and has no recorded answer.
    AwaitingAnswer(usize),
    /// An answer for `position` was recorded and its correctness shown.
    Evaluated(usize),
    Finished,
}

impl Phase {
    pub fn is_active(&self) -> bool {
        matches!(self, Phase::AwaitingAnswer(_) | Phase::Evaluated(_))
    }
}

/// The mutable state of one quiz run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub questions: QuestionSet,
    pub position: usize,
    pub score: usize,
    pub missed_topics: Vec<String>,
    pub phase: Phase,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            questions: QuestionSet::default(),
            position: 0,
            score: 0,
            missed_topics: Vec::new(),
            phase: Phase::Idle,
        }
    }
}

/// Result of evaluating a single answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_index: usize,
    pub explanation: String,
}

/// What happens after leaving the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The session moved on to the question at this position.
    Next(usize),
    /// The last question was passed and the session is over.
    Finished(ResultsPayload),
}

/// Uploaded file embedded in a quiz request.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFile {
    pub filename: String,
    #[serde(alias = "base64")]
    pub content: String,
}

/// DTO for generating a quiz and starting a session in one call.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    /// Reuse an existing session (start over) instead of opening a new one.
    pub session_id: Option<Uuid>,

    #[serde(default)]
    pub text: String,

    pub file: Option<UploadedFile>,

    #[validate(range(min = 1, max = 30))]
    pub num_questions: Option<u32>,

    #[validate(length(min = 1, max = 40))]
    pub difficulty: Option<String>,
}

/// DTO for answering the current question. A missing `choice` means nothing
/// was selected.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub choice: Option<i64>,
}

/// Response after a quiz has been generated and started.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizStartedResponse {
    pub session_id: Uuid,
    pub total: usize,
    pub question: PublicQuestion,
}

/// Snapshot of a session for status views.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizStatusResponse {
    pub session_id: Uuid,
    pub phase: Phase,
    pub score: usize,
    pub total: usize,
    pub question: Option<PublicQuestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<ResultsPayload>,
}

/// Response to `advance`, `skip` and `finish`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum StepResponse {
    Next { question: PublicQuestion },
    Finished { results: ResultsPayload },
}
