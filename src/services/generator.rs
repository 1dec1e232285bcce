// src/services/generator.rs

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::{
    config::GENERATION_TEXT_LIMIT,
    models::question::{OPTION_COUNT, Question, QuestionSet},
    services::llm::{CompletionClient, CompletionRequest, LlmError},
    utils::html::clean_html,
};

static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid JSON span pattern"));

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("missing OPENAI_API_KEY")]
    MissingCredential,

    #[error(transparent)]
    Upstream(#[from] LlmError),

    #[error("model output is not the expected JSON shape")]
    MalformedResponse,

    #[error("model returned no usable questions")]
    NoValidQuestions,
}

/// Parameters for one generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
    pub text: &'a str,
    pub num_questions: usize,
    pub difficulty: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeneratedBatch {
    questions: Vec<Value>,
}

/// Turns source text into a validated question set via the completion client.
#[derive(Clone)]
pub struct QuestionGenerator {
    client: Arc<dyn CompletionClient>,
}

impl QuestionGenerator {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub async fn generate(
        &self,
        api_key: Option<&str>,
        req: &GenerationRequest<'_>,
    ) -> Result<QuestionSet, GenerateError> {
        let api_key = api_key.ok_or(GenerateError::MissingCredential)?;

        let completion = CompletionRequest {
            system: system_prompt(req.difficulty),
            user: user_prompt(req.text, req.num_questions),
            temperature: 0.4,
            max_output_tokens: 2000,
        };

        let content = self.client.complete(api_key, &completion).await?;
        let questions = parse_questions(&content, req.num_questions)?;

        tracing::info!(
            "Generated {} questions (requested {})",
            questions.len(),
            req.num_questions
        );
        Ok(questions)
    }
}

fn system_prompt(difficulty: &str) -> String {
    format!(
        r#"You write multiple-choice quizzes. Reply with valid JSON only, no prose:
{{
  "questions": [
    {{
      "q": "question text",
      "options": ["option A", "option B", "option C", "option D"],
      "answer": 0,
      "topic": "topic or chapter",
      "explanation": "short explanation"
    }}
  ]
}}
Every question has exactly 4 options and "answer" is the 0-based index of the correct one.
Match this difficulty level: {}."#,
        difficulty
    )
}

fn user_prompt(text: &str, num_questions: usize) -> String {
    format!(
        "Source text:\n\"\"\"\n{}\n\"\"\"\n\nWrite {} varied questions. Do not copy sentences word for word from the source.",
        truncate_chars(text, GENERATION_TEXT_LIMIT),
        num_questions
    )
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

/// Parses model output into at most `limit` valid questions.
///
/// The whole reply is tried as JSON first, then the outermost `{...}` span in
/// it. Individual malformed questions are dropped; the batch only fails when
/// nothing usable is left.
pub fn parse_questions(content: &str, limit: usize) -> Result<QuestionSet, GenerateError> {
    let batch = serde_json::from_str::<GeneratedBatch>(content.trim())
        .ok()
        .or_else(|| {
            JSON_OBJECT
                .find(content)
                .and_then(|m| serde_json::from_str::<GeneratedBatch>(m.as_str()).ok())
        })
        .ok_or(GenerateError::MalformedResponse)?;

    let received = batch.questions.len();
    let questions: Vec<Question> = batch
        .questions
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| match question_from_value(raw) {
            Ok(q) => Some(q),
            Err(reason) => {
                tracing::debug!("Discarding generated question #{}: {}", i, reason);
                None
            }
        })
        .take(limit)
        .collect();

    if questions.is_empty() {
        tracing::warn!("None of the {} generated questions were usable", received);
        return Err(GenerateError::NoValidQuestions);
    }

    Ok(questions.into())
}

/// Validates one generated question object.
fn question_from_value(raw: &Value) -> Result<Question, String> {
    let prompt = ["q", "prompt", "question"]
        .iter()
        .find_map(|key| raw.get(key).and_then(Value::as_str))
        .map(clean_html)
        .filter(|p| !p.is_empty())
        .ok_or("missing question text")?;

    let options = raw
        .get("options")
        .and_then(Value::as_array)
        .ok_or("missing options")?;
    if options.len() != OPTION_COUNT {
        return Err(format!("expected {} options, got {}", OPTION_COUNT, options.len()));
    }
    let options: Vec<String> = options
        .iter()
        .map(|o| o.as_str().map(clean_html).ok_or("option is not a string"))
        .collect::<Result<_, _>>()?;
    let options: [String; OPTION_COUNT] = options
        .try_into()
        .map_err(|_| "option count changed while converting".to_string())?;

    let correct_index = ["answer", "correctIndex"]
        .iter()
        .find_map(|key| raw.get(key).and_then(Value::as_u64))
        .ok_or("answer is not a non-negative integer")?;
    let correct_index =
        usize::try_from(correct_index).map_err(|_| format!("answer {} is out of range", correct_index))?;

    let text_field = |key: &str| {
        raw.get(key)
            .and_then(Value::as_str)
            .map(clean_html)
            .unwrap_or_default()
    };

    Question::new(
        prompt,
        options,
        correct_index,
        text_field("topic"),
        text_field("explanation"),
    )
}
