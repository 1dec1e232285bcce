// src/handlers/results.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{error::AppError, services::results_store::ResultsStore};

/// Retrieves the stored results of one finished quiz.
pub async fn get_results(
    State(store): State<ResultsStore>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let results = store.load(session_id).await.map_err(|e| {
        tracing::error!("Failed to load results for {}: {:?}", session_id, e);
        AppError::InternalServerError(e.to_string())
    })?;

    results
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No results for session {}", session_id)))
}

/// Retrieves the most recently finished quiz for the results page.
pub async fn get_latest_results(
    State(store): State<ResultsStore>,
) -> Result<impl IntoResponse, AppError> {
    let results = store.latest().await.map_err(|e| {
        tracing::error!("Failed to load latest results: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    results
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No quiz has been finished yet".to_string()))
}
