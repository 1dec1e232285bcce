// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    config::REQUEST_BODY_LIMIT,
    handlers::{analyze, extract, generate, quiz, results},
    state::AppState,
    utils::api_key::{API_KEY_HEADER, api_key_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (collaborators, quiz, results).
/// * Resolves the completion API key for routes that call the model.
/// * Applies global middleware (Trace, CORS, body limit).
/// * Serves the static front end, if one is deployed, for everything else.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static(API_KEY_HEADER),
        ]);

    // Routes that talk to the completion API
    let model_routes = Router::new()
        .route("/generate-questions", post(generate::generate_questions))
        .route("/analyze-answers", post(analyze::analyze_answers))
        .route("/quiz", post(quiz::create_quiz))
        .layer(middleware::from_fn_with_state(state.clone(), api_key_middleware));

    let quiz_routes = Router::new()
        .route("/{id}", get(quiz::get_quiz))
        .route("/{id}/answer", post(quiz::submit_answer))
        .route("/{id}/advance", post(quiz::advance))
        .route("/{id}/skip", post(quiz::skip))
        .route("/{id}/finish", post(quiz::finish));

    let results_routes = Router::new()
        .route("/latest", get(results::get_latest_results))
        .route("/{id}", get(results::get_results));

    let api_routes = Router::new()
        .route("/extract-text", post(extract::extract_text))
        .merge(model_routes)
        .nest("/quiz", quiz_routes)
        .nest("/results", results_routes);

    Router::new()
        .nest("/api", api_routes)
        .fallback_service(ServeDir::new(&state.config.static_dir))
        // Global Middleware (applied from outside in)
        .layer(DefaultBodyLimit::max(REQUEST_BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
