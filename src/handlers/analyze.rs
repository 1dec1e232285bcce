// src/handlers/analyze.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::generation::{AnalyzeAnswersRequest, AnalyzeAnswersResponse},
    services::analyzer::AnswerAnalyzer,
    utils::api_key::ApiKey,
};

/// Returns a short study analysis for a quiz result.
/// Falls back to a placeholder text when the completion API is unavailable.
pub async fn analyze_answers(
    State(analyzer): State<AnswerAnalyzer>,
    Extension(api_key): Extension<ApiKey>,
    Json(req): Json<AnalyzeAnswersRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let analysis = analyzer
        .analyze(api_key.as_deref(), req.score, req.total, &req.missed_topics)
        .await?;

    Ok(Json(AnalyzeAnswersResponse { analysis }))
}
