// src/config.rs

use std::env;
use dotenvy::dotenv;
use url::Url;

/// Decoded upload ceiling for text extraction (20 MiB).
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Request body ceiling; leaves room for the base64 overhead of a full upload.
pub const REQUEST_BODY_LIMIT: usize = 30 * 1024 * 1024;

/// Extracted text is clamped to this many characters.
pub const EXTRACTED_TEXT_LIMIT: usize = 120_000;

/// Source text is clamped to this many characters before it is sent to the model.
pub const GENERATION_TEXT_LIMIT: usize = 35_000;

/// Minimum amount of source text needed to build a quiz.
pub const MIN_SOURCE_TEXT_CHARS: usize = 60;

pub const DEFAULT_QUESTION_COUNT: u32 = 8;
pub const MAX_QUESTION_COUNT: u32 = 30;
pub const DEFAULT_DIFFICULTY: &str = "medium";

/// Upper bound on the length of a performance analysis.
pub const ANALYSIS_WORD_LIMIT: usize = 140;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub llm_timeout_secs: u64,
    pub bind_addr: String,
    pub static_dir: String,
    pub rust_log: String,
    /// Settings that were rejected while reading the environment. Logged by
    /// `main` once tracing is up.
    pub warnings: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://quizgen.db?mode=rwc".to_string());

        let openai_api_key = env::var("OPENAI_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let mut warnings = Vec::new();

        let openai_base_url = base_url(env::var("OPENAI_BASE_URL").ok(), &mut warnings);

        let openai_model = env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());

        let llm_timeout_secs = env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| "public".to_string());

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            openai_api_key,
            openai_base_url,
            openai_model,
            llm_timeout_secs,
            bind_addr,
            static_dir,
            rust_log,
            warnings,
        }
    }
}

/// Falls back to the public endpoint when the configured URL does not parse.
fn base_url(raw: Option<String>, warnings: &mut Vec<String>) -> String {
    raw.filter(|raw| match Url::parse(raw) {
        Ok(_) => true,
        Err(e) => {
            warnings.push(format!("Ignoring invalid OPENAI_BASE_URL '{}': {}", raw, e));
            false
        }
    })
    .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
    .trim_end_matches('/')
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_base_url_is_reported_and_replaced() {
        let mut warnings = Vec::new();

        let url = base_url(Some("not a url".to_string()), &mut warnings);

        assert_eq!(url, "https://api.openai.com/v1");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("not a url"));
    }

    #[test]
    fn valid_base_url_loses_trailing_slash() {
        let mut warnings = Vec::new();

        let url = base_url(Some("http://localhost:8080/v1/".to_string()), &mut warnings);

        assert_eq!(url, "http://localhost:8080/v1");
        assert!(warnings.is_empty());
    }
}
