// src/handlers/generate.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    config::{DEFAULT_DIFFICULTY, DEFAULT_QUESTION_COUNT},
    error::AppError,
    models::generation::{GenerateQuestionsRequest, GenerateQuestionsResponse},
    services::generator::{GenerationRequest, QuestionGenerator},
    utils::api_key::ApiKey,
};

/// Generates multiple-choice questions from source text.
///
/// Uses the `x-api-key` header when present, otherwise the server's key.
/// Malformed questions in the model's reply are dropped, not reported.
pub async fn generate_questions(
    State(generator): State<QuestionGenerator>,
    Extension(api_key): Extension<ApiKey>,
    Json(req): Json<GenerateQuestionsRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let request = GenerationRequest {
        text: req.text.trim(),
        num_questions: req.num_questions.unwrap_or(DEFAULT_QUESTION_COUNT) as usize,
        difficulty: req.difficulty.as_deref().unwrap_or(DEFAULT_DIFFICULTY),
    };

    let questions = generator.generate(api_key.as_deref(), &request).await?;

    Ok(Json(GenerateQuestionsResponse { questions }))
}
