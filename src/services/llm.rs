// src/services/llm.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("completion API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion API returned no text")]
    EmptyOutput,
}

/// A single system + user prompt exchange.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Anything that can turn a prompt into model text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Result<String, LlmError>;
}

#[derive(Serialize)]
struct InputMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<InputMessage<'a>>,
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output: Vec<OutputItem>,
    output_text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Debug, Default, Deserialize)]
struct OutputContent {
    text: Option<String>,
}

impl ResponsesResponse {
    /// First text part of the first output item, falling back to `output_text`.
    fn into_text(self) -> Option<String> {
        self.output
            .into_iter()
            .next()
            .and_then(|item| item.content.into_iter().next())
            .and_then(|part| part.text)
            .or(self.output_text)
            .filter(|text| !text.trim().is_empty())
    }
}

/// Client for the OpenAI "responses" endpoint.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        Self::new(
            config.openai_base_url.clone(),
            config.openai_model.clone(),
            Duration::from_secs(config.llm_timeout_secs),
        )
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Result<String, LlmError> {
        let body = ResponsesRequest {
            model: &self.model,
            input: vec![
                InputMessage {
                    role: "system",
                    content: &request.system,
                },
                InputMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_output_tokens: request.max_output_tokens,
        };

        tracing::info!("Sending completion request with model: {}", self.model);

        let response = self
            .client
            .post(format!("{}/responses", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Completion API error {}: {}", status, body);
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ResponsesResponse = response.json().await?;
        parsed.into_text().ok_or(LlmError::EmptyOutput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_nested_output_text_first() {
        let parsed: ResponsesResponse = serde_json::from_value(serde_json::json!({
            "output": [{ "content": [{ "type": "output_text", "text": "nested" }] }],
            "output_text": "flat"
        }))
        .unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("nested"));
    }

    #[test]
    fn falls_back_to_output_text() {
        let parsed: ResponsesResponse = serde_json::from_value(serde_json::json!({
            "output": [],
            "output_text": "flat"
        }))
        .unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("flat"));
    }

    #[test]
    fn blank_output_is_empty() {
        let parsed: ResponsesResponse =
            serde_json::from_value(serde_json::json!({ "output_text": "  " })).unwrap();
        assert_eq!(parsed.into_text(), None);
    }
}
