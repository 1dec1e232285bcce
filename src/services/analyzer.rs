// src/services/analyzer.rs

use std::sync::Arc;

use crate::{
    config::ANALYSIS_WORD_LIMIT,
    services::{
        generator::GenerateError,
        llm::{CompletionClient, CompletionRequest},
    },
};

/// Returned when the completion API cannot produce an analysis.
pub const ANALYSIS_UNAVAILABLE: &str = "Analysis is not available right now.";

/// Writes a short study recommendation for a finished quiz.
#[derive(Clone)]
pub struct AnswerAnalyzer {
    client: Arc<dyn CompletionClient>,
}

impl AnswerAnalyzer {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Only a missing credential is an error. Upstream failures degrade to
    /// [`ANALYSIS_UNAVAILABLE`].
    pub async fn analyze(
        &self,
        api_key: Option<&str>,
        score: u32,
        total: u32,
        missed_topics: &[String],
    ) -> Result<String, GenerateError> {
        let api_key = api_key.ok_or(GenerateError::MissingCredential)?;

        let weak = if missed_topics.is_empty() {
            "none identified".to_string()
        } else {
            missed_topics.join(", ")
        };

        let request = CompletionRequest {
            system: format!(
                "You are a friendly tutor. Write a concise, focused analysis of a quiz result in at most {} words.",
                ANALYSIS_WORD_LIMIT
            ),
            user: format!(
                "Score: {}/{}\nWeak topics: {}\nGive 3 numbered study recommendations.",
                score, total, weak
            ),
            temperature: 0.5,
            max_output_tokens: 400,
        };

        match self.client.complete(api_key, &request).await {
            Ok(text) => Ok(clamp_words(text.trim(), ANALYSIS_WORD_LIMIT).to_string()),
            Err(e) => {
                tracing::warn!("Answer analysis unavailable: {}", e);
                Ok(ANALYSIS_UNAVAILABLE.to_string())
            }
        }
    }
}

/// Cuts `text` after its `max_words`-th word, keeping the original line breaks.
pub fn clamp_words(text: &str, max_words: usize) -> &str {
    let mut words = 0;
    let mut in_word = false;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if in_word && words == max_words {
                return &text[..i];
            }
            in_word = false;
        } else if !in_word {
            in_word = true;
            words += 1;
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::llm::LlmError;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct Recording {
        reply: Result<String, u16>,
        seen: Mutex<Option<CompletionRequest>>,
    }

    #[async_trait]
    impl CompletionClient for Recording {
        async fn complete(&self, _: &str, request: &CompletionRequest) -> Result<String, LlmError> {
            *self.seen.lock() = Some(request.clone());
            self.reply.clone().map_err(|status| LlmError::Status {
                status,
                body: "upstream down".to_string(),
            })
        }
    }

    fn analyzer(reply: Result<String, u16>) -> (AnswerAnalyzer, Arc<Recording>) {
        let client = Arc::new(Recording {
            reply,
            seen: Mutex::new(None),
        });
        (AnswerAnalyzer::new(client.clone()), client)
    }

    #[test]
    fn clamp_keeps_short_text() {
        assert_eq!(clamp_words("1. Review ports\n2. Practice", 10), "1. Review ports\n2. Practice");
    }

    #[test]
    fn clamp_cuts_after_limit() {
        assert_eq!(clamp_words("one two\nthree four", 3), "one two\nthree");
        assert_eq!(clamp_words("  one   two  ", 1), "  one");
    }

    #[tokio::test]
    async fn prompt_mentions_score_and_topics() {
        let (analyzer, client) = analyzer(Ok("Focus on hashing.".to_string()));
        let topics = vec!["Hashing".to_string(), "general".to_string()];

        let text = analyzer.analyze(Some("sk-test"), 3, 5, &topics).await.unwrap();
        assert_eq!(text, "Focus on hashing.");

        let seen = client.seen.lock().clone().unwrap();
        assert!(seen.user.contains("Score: 3/5"));
        assert!(seen.user.contains("Hashing, general"));
    }

    #[tokio::test]
    async fn upstream_failure_degrades_to_placeholder() {
        let (analyzer, _) = analyzer(Err(503));
        let text = analyzer.analyze(Some("sk-test"), 1, 2, &[]).await.unwrap();
        assert_eq!(text, ANALYSIS_UNAVAILABLE);
    }

    #[tokio::test]
    async fn missing_key_is_an_error() {
        let (analyzer, client) = analyzer(Ok("unused".to_string()));
        assert!(matches!(
            analyzer.analyze(None, 1, 2, &[]).await,
            Err(GenerateError::MissingCredential)
        ));
        assert!(client.seen.lock().is_none());
    }
}
