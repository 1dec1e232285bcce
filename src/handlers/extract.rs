// src/handlers/extract.rs

use axum::{Json, response::IntoResponse};

use crate::{
    error::AppError,
    models::generation::{ExtractTextRequest, ExtractTextResponse},
    services::extractor,
};

/// Extracts plain text from an uploaded PDF, DOCX or TXT file.
///
/// * Expects `{ filename, content }` with base64 content (`base64` is accepted too).
/// * Returns the normalized text, clamped to 120K characters.
pub async fn extract_text(
    Json(req): Json<ExtractTextRequest>,
) -> Result<impl IntoResponse, AppError> {
    let text = extractor::extract_text(&req.filename, &req.content)
        .await
        .map_err(|e| {
            tracing::warn!("Failed to extract text from '{}': {}", req.filename, e);
            AppError::from(e)
        })?;

    Ok(Json(ExtractTextResponse { text }))
}
