// src/models/results.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

use crate::models::question::QuestionSet;

/// Summary of a finished quiz, handed to the results page.
///
/// The serialized layout (`score`, `total`, `wrongTopics`, `questions`) is what
/// the results page reads back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsPayload {
    pub score: usize,

    /// Original question count, including questions never answered.
    pub total: usize,

    #[serde(rename = "wrongTopics", alias = "missedTopics")]
    pub missed_topics: Vec<String>,

    pub questions: QuestionSet,
}

/// Represents the 'quiz_results' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredResults {
    pub session_id: String,

    /// The payload, stored as a JSON document and flattened when serialized.
    #[serde(flatten)]
    pub payload: Json<ResultsPayload>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}
