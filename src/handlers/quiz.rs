// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::{DEFAULT_DIFFICULTY, DEFAULT_QUESTION_COUNT, MIN_SOURCE_TEXT_CHARS},
    error::AppError,
    models::{
        question::PublicQuestion,
        results::ResultsPayload,
        session::{
            CreateQuizRequest, QuizStartedResponse, QuizStatusResponse, Step, StepResponse,
            SubmitAnswerRequest,
        },
    },
    quiz::{QuizController, SessionError, SessionRegistry},
    services::{
        extractor,
        generator::{GenerationRequest, QuestionGenerator},
        results_store::ResultsStore,
    },
    utils::api_key::ApiKey,
};

/// Generates a quiz from the submitted material and starts a session on it.
///
/// * Extracts text from the uploaded file (if any) and appends the pasted text.
/// * Marks the session busy until generation finishes; a second request for
///   the same session in the meantime gets 409.
/// * On any failure the session keeps whatever quiz it had before, and a
///   session opened by this request is discarded.
pub async fn create_quiz(
    State(sessions): State<Arc<SessionRegistry>>,
    State(generator): State<QuestionGenerator>,
    Extension(api_key): Extension<ApiKey>,
    Json(req): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let mut text = String::new();
    if let Some(file) = &req.file {
        text = extractor::extract_text(&file.filename, &file.content)
            .await
            .map_err(|e| {
                tracing::warn!("Extraction of '{}' failed: {}", file.filename, e);
                AppError::from(e)
            })?;
        text.push('\n');
    }
    text.push_str(&req.text);
    let text = text.trim();

    if text.chars().count() < MIN_SOURCE_TEXT_CHARS {
        return Err(AppError::BadRequest(format!(
            "Source text is too short (at least {} characters needed)",
            MIN_SOURCE_TEXT_CHARS
        )));
    }

    let guard = sessions.begin_generation(req.session_id)?;
    let session_id = guard.session_id();

    let request = GenerationRequest {
        text,
        num_questions: req.num_questions.unwrap_or(DEFAULT_QUESTION_COUNT) as usize,
        difficulty: req.difficulty.as_deref().unwrap_or(DEFAULT_DIFFICULTY),
    };
    let questions = generator.generate(api_key.as_deref(), &request).await?;
    let total = questions.len();

    let question = guard.finish(|quiz| -> Result<PublicQuestion, SessionError> {
        quiz.start(questions)?;
        Ok(quiz.current_question()?.to_public(0, total))
    })?;

    tracing::info!("Session {}: started quiz with {} questions", session_id, total);

    Ok((
        StatusCode::CREATED,
        Json(QuizStartedResponse {
            session_id,
            total,
            question,
        }),
    ))
}

/// Returns the session's phase, score and open question.
pub async fn get_quiz(
    State(sessions): State<Arc<SessionRegistry>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let status = sessions.with_session(session_id, |quiz| {
        let state = quiz.state();
        let total = state.questions.len();
        QuizStatusResponse {
            session_id,
            phase: state.phase,
            score: state.score,
            total,
            question: quiz
                .current_question()
                .ok()
                .map(|q| q.to_public(state.position, total)),
            results: quiz.results().cloned(),
        }
    })?;

    Ok(Json(status))
}

/// Records the answer to the open question and reveals whether it was correct.
pub async fn submit_answer(
    State(sessions): State<Arc<SessionRegistry>>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = sessions.with_session(session_id, |quiz| quiz.submit_answer(req.choice))??;
    Ok(Json(outcome))
}

/// Moves on from an answered question.
pub async fn advance(
    State(sessions): State<Arc<SessionRegistry>>,
    State(store): State<ResultsStore>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let step = sessions.with_session(session_id, |quiz| -> Result<StepResponse, SessionError> {
        let step = quiz.advance()?;
        step_response(quiz, step)
    })??;

    Ok(respond_with_step(&store, session_id, step).await)
}

/// Passes over the open question without scoring it.
pub async fn skip(
    State(sessions): State<Arc<SessionRegistry>>,
    State(store): State<ResultsStore>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let step = sessions.with_session(session_id, |quiz| -> Result<StepResponse, SessionError> {
        let step = quiz.skip()?;
        step_response(quiz, step)
    })??;

    Ok(respond_with_step(&store, session_id, step).await)
}

/// Ends the quiz now. Unanswered questions still count toward the total.
pub async fn finish(
    State(sessions): State<Arc<SessionRegistry>>,
    State(store): State<ResultsStore>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let results = sessions.with_session(session_id, |quiz| quiz.finish_early())??;

    Ok(respond_with_step(&store, session_id, StepResponse::Finished { results }).await)
}

fn step_response(quiz: &QuizController, step: Step) -> Result<StepResponse, SessionError> {
    match step {
        Step::Next(position) => {
            let total = quiz.state().questions.len();
            let question = quiz.current_question()?.to_public(position, total);
            Ok(StepResponse::Next { question })
        }
        Step::Finished(results) => Ok(StepResponse::Finished { results }),
    }
}

/// Persists the results when the step finished the quiz.
///
/// The session has already finished at this point, so a storage failure is
/// logged and the results still go back to the client.
async fn respond_with_step(
    store: &ResultsStore,
    session_id: Uuid,
    step: StepResponse,
) -> Json<StepResponse> {
    if let StepResponse::Finished { results } = &step {
        persist(store, session_id, results).await;
    }
    Json(step)
}

async fn persist(store: &ResultsStore, session_id: Uuid, results: &ResultsPayload) {
    if let Err(e) = store.save(session_id, results).await {
        tracing::error!("Failed to store results for {}: {:?}", session_id, e);
    }
}
