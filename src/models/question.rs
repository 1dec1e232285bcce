// src/models/question.rs

use serde::{Deserialize, Serialize};

/// Every question offers exactly this many options.
pub const OPTION_COUNT: usize = 4;

/// A single multiple-choice question.
///
/// Deserialization goes through [`QuestionRecord`] so a question with an
/// out-of-range `correctIndex` can never be constructed from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "QuestionRecord")]
pub struct Question {
    /// The question text shown to the user.
    pub prompt: String,

    /// Answer options in display order.
    pub options: [String; OPTION_COUNT],

    /// Index into `options` of the correct answer.
    pub correct_index: usize,

    /// Topic label used for the missed-topics summary. May be empty.
    pub topic: String,

    /// Short explanation displayed after the question is answered.
    pub explanation: String,
}

impl Question {
    pub fn new(
        prompt: impl Into<String>,
        options: [String; OPTION_COUNT],
        correct_index: usize,
        topic: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Result<Self, String> {
        if correct_index >= OPTION_COUNT {
            return Err(format!(
                "correct index {} is outside 0..{}",
                correct_index, OPTION_COUNT
            ));
        }

        Ok(Self {
            prompt: prompt.into(),
            options,
            correct_index,
            topic: topic.into(),
            explanation: explanation.into(),
        })
    }

    /// Strips the answer key for display while the question is still open.
    pub fn to_public(&self, position: usize, total: usize) -> PublicQuestion {
        PublicQuestion {
            position,
            total,
            prompt: self.prompt.clone(),
            options: self.options.clone(),
        }
    }
}

/// Wire form of a question. Accepts both the camelCase names and the short
/// names the generator prompt asks the model for (`q`, `answer`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    #[serde(alias = "q")]
    pub prompt: String,
    pub options: [String; OPTION_COUNT],
    #[serde(alias = "answer")]
    pub correct_index: usize,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub explanation: String,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = String;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        Question::new(
            record.prompt,
            record.options,
            record.correct_index,
            record.topic,
            record.explanation,
        )
    }
}

/// DTO for sending a question to the client (excludes answer and explanation).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub position: usize,
    pub total: usize,
    pub prompt: String,
    pub options: [String; OPTION_COUNT],
}

/// Ordered questions for one quiz. Insertion order is presentation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionSet(Vec<Question>);

impl QuestionSet {
    pub fn new(questions: Vec<Question>) -> Self {
        Self(questions)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Question> {
        self.0.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.0.iter()
    }
}

impl From<Vec<Question>> for QuestionSet {
    fn from(questions: Vec<Question>) -> Self {
        Self(questions)
    }
}
