// src/models/generation.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::question::QuestionSet;

/// DTO for the text extraction endpoint.
#[derive(Debug, Deserialize)]
pub struct ExtractTextRequest {
    #[serde(default)]
    pub filename: String,

    /// Base64-encoded file body.
    #[serde(default, alias = "base64")]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractTextResponse {
    pub text: String,
}

/// DTO for the question generation endpoint.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionsRequest {
    #[validate(custom(function = validate_not_blank))]
    pub text: String,

    #[validate(range(min = 1, max = 30))]
    pub num_questions: Option<u32>,

    #[validate(length(min = 1, max = 40))]
    pub difficulty: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateQuestionsResponse {
    pub questions: QuestionSet,
}

/// DTO for the performance analysis endpoint.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_score_within_total))]
pub struct AnalyzeAnswersRequest {
    pub score: u32,
    pub total: u32,
    #[serde(default, alias = "wrongTopics")]
    pub missed_topics: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeAnswersResponse {
    pub analysis: String,
}

fn validate_not_blank(text: &str) -> Result<(), validator::ValidationError> {
    if text.trim().is_empty() {
        return Err(validator::ValidationError::new("missing_text"));
    }
    Ok(())
}

fn validate_score_within_total(
    req: &AnalyzeAnswersRequest,
) -> Result<(), validator::ValidationError> {
    if req.score > req.total {
        return Err(validator::ValidationError::new("score_exceeds_total"));
    }
    Ok(())
}
