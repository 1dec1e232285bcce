// src/quiz/controller.rs

use thiserror::Error;

use crate::models::{
    question::{OPTION_COUNT, Question, QuestionSet},
    results::ResultsPayload,
    session::{AnswerOutcome, Phase, SessionState, Step},
};

/// Label recorded for a missed question whose topic is blank.
pub const FALLBACK_TOPIC: &str = "general";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot start a quiz without questions")]
    EmptyQuestionSet,

    #[error("select one of the 4 options")]
    NoSelection,

    #[error("'{operation}' is not allowed while {phase:?}")]
    InvalidState {
        operation: &'static str,
        phase: Phase,
    },

    #[error("no quiz is in progress")]
    NoActiveSession,
}

/// Drives one quiz from a generated question set to its results.
///
/// Every operation either applies completely or leaves the state untouched.
#[derive(Debug, Default)]
pub struct QuizController {
    state: SessionState,
    results: Option<ResultsPayload>,
}

impl QuizController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The payload produced when the session finished, if it has.
    pub fn results(&self) -> Option<&ResultsPayload> {
        self.results.as_ref()
    }

    /// Begins a new session, discarding whatever session came before.
    pub fn start(&mut self, questions: QuestionSet) -> Result<(), SessionError> {
        if questions.is_empty() {
            return Err(SessionError::EmptyQuestionSet);
        }

        self.state = SessionState {
            questions,
            position: 0,
            score: 0,
            missed_topics: Vec::new(),
            phase: Phase::AwaitingAnswer(0),
        };
        self.results = None;
        Ok(())
    }

    pub fn current_question(&self) -> Result<&Question, SessionError> {
        match self.state.phase {
            Phase::AwaitingAnswer(position) | Phase::Evaluated(position) => self
                .state
                .questions
                .get(position)
                .ok_or(SessionError::NoActiveSession),
            Phase::Idle | Phase::Finished => Err(SessionError::NoActiveSession),
        }
    }

    /// Records an answer for the current question and reports whether it was
    /// right. `None` means the user did not pick anything.
    pub fn submit_answer(&mut self, choice: Option<i64>) -> Result<AnswerOutcome, SessionError> {
        let position = self.expect_awaiting("submit_answer")?;

        let choice = choice
            .and_then(|c| usize::try_from(c).ok())
            .filter(|c| *c < OPTION_COUNT)
            .ok_or(SessionError::NoSelection)?;

        let question = self
            .state
            .questions
            .get(position)
            .ok_or(SessionError::NoActiveSession)?;

        let correct = choice == question.correct_index;
        let outcome = AnswerOutcome {
            correct,
            correct_index: question.correct_index,
            explanation: question.explanation.clone(),
        };

        if correct {
            self.state.score += 1;
        } else {
            let topic = question.topic.trim();
            let topic = if topic.is_empty() { FALLBACK_TOPIC } else { topic };
            self.state.missed_topics.push(topic.to_string());
        }
        self.state.phase = Phase::Evaluated(position);

        Ok(outcome)
    }

    /// Moves past an evaluated question.
    pub fn advance(&mut self) -> Result<Step, SessionError> {
        match self.state.phase {
            Phase::Evaluated(position) => Ok(self.move_past(position)),
            Phase::AwaitingAnswer(_) => Err(self.invalid("advance")),
            Phase::Idle | Phase::Finished => Err(SessionError::NoActiveSession),
        }
    }

    /// Passes over the current question without scoring it either way.
    pub fn skip(&mut self) -> Result<Step, SessionError> {
        let position = self.expect_awaiting("skip")?;
        Ok(self.move_past(position))
    }

    /// Ends the session now. Unanswered questions still count toward `total`.
    pub fn finish_early(&mut self) -> Result<ResultsPayload, SessionError> {
        if !self.state.phase.is_active() {
            return Err(SessionError::NoActiveSession);
        }
        Ok(self.finish())
    }

    fn expect_awaiting(&self, operation: &'static str) -> Result<usize, SessionError> {
        match self.state.phase {
            Phase::AwaitingAnswer(position) => Ok(position),
            Phase::Evaluated(_) => Err(self.invalid(operation)),
            Phase::Idle | Phase::Finished => Err(SessionError::NoActiveSession),
        }
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidState {
            operation,
            phase: self.state.phase,
        }
    }

    fn move_past(&mut self, position: usize) -> Step {
        let next = position + 1;
        self.state.position = next;

        if next >= self.state.questions.len() {
            Step::Finished(self.finish())
        } else {
            self.state.phase = Phase::AwaitingAnswer(next);
            Step::Next(next)
        }
    }

    fn finish(&mut self) -> ResultsPayload {
        self.state.phase = Phase::Finished;

        let payload = ResultsPayload {
            score: self.state.score,
            total: self.state.questions.len(),
            missed_topics: self.state.missed_topics.clone(),
            questions: self.state.questions.clone(),
        };
        self.results = Some(payload.clone());
        payload
    }
}
