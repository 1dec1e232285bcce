// tests/common/mod.rs

#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use parking_lot::Mutex;
use quizgen::{
    config::Config,
    routes,
    services::llm::{CompletionClient, CompletionRequest, LlmError},
    state::AppState,
};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

/// Completion client that replays a canned reply and remembers what it was sent.
pub struct ScriptedClient {
    reply: Result<String, u16>,
    delay: Duration,
    pub calls: Mutex<Vec<(String, CompletionRequest)>>,
}

impl ScriptedClient {
    pub fn replying(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.into()),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(status),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(reply: impl Into<String>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.into()),
            delay,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Result<String, LlmError> {
        self.calls.lock().push((api_key.to_string(), request.clone()));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply.clone().map_err(|status| LlmError::Status {
            status,
            body: "scripted failure".to_string(),
        })
    }
}

/// A generated question in the shape the model is asked to produce.
pub fn generated_question(i: usize, answer: usize, option_count: usize) -> serde_json::Value {
    serde_json::json!({
        "q": format!("Security question {}?", i),
        "options": (0..option_count).map(|o| format!("Choice {}", o)).collect::<Vec<_>>(),
        "answer": answer,
        "topic": format!("Topic {}", i),
        "explanation": format!("Choice {} is correct.", answer)
    })
}

/// Model reply with one question per entry of `answers`.
pub fn model_reply(answers: &[usize]) -> String {
    let questions: Vec<_> = answers
        .iter()
        .enumerate()
        .map(|(i, a)| generated_question(i, *a, 4))
        .collect();
    serde_json::json!({ "questions": questions }).to_string()
}

pub const SOURCE_TEXT: &str = "A firewall filters network traffic according to rules. \
Phishing emails trick users into revealing credentials. \
Multi-factor authentication adds a second proof of identity.";

pub fn test_config(api_key: Option<&str>) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        openai_api_key: api_key.map(str::to_owned),
        openai_base_url: "http://127.0.0.1:9".to_string(),
        openai_model: "gpt-4o".to_string(),
        llm_timeout_secs: 5,
        bind_addr: "127.0.0.1:0".to_string(),
        static_dir: "does-not-exist".to_string(),
        rust_log: "error".to_string(),
        warnings: Vec::new(),
    }
}

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
pub async fn spawn_app(client: Arc<ScriptedClient>, api_key: Option<&str>) -> String {
    spawn_app_with_state(client, api_key).await.0
}

/// Like `spawn_app`, but also hands back the state and pool the server runs on.
pub async fn spawn_app_with_state(
    client: Arc<ScriptedClient>,
    api_key: Option<&str>,
) -> (String, AppState, SqlitePool) {
    // 1. Create an in-memory pool
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    // 2. Create the state and run migrations
    let state = AppState::new(test_config(api_key), pool.clone(), client);
    state
        .results
        .migrate()
        .await
        .expect("Failed to migrate database");

    // 3. Create the router with the app state
    let app = routes::create_router(state.clone());

    // 4. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 5. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, state, pool)
}
