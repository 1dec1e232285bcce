use std::sync::Arc;

use crate::config::Config;
use crate::quiz::SessionRegistry;
use crate::services::{
    analyzer::AnswerAnalyzer, generator::QuestionGenerator, llm::CompletionClient,
    results_store::ResultsStore,
};
use axum::extract::FromRef;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: Arc<SessionRegistry>,
    pub results: ResultsStore,
    pub generator: QuestionGenerator,
    pub analyzer: AnswerAnalyzer,
}

impl AppState {
    /// Wires the services around one completion client and one database pool.
    pub fn new(config: Config, pool: SqlitePool, llm: Arc<dyn CompletionClient>) -> Self {
        Self {
            config,
            sessions: Arc::new(SessionRegistry::new()),
            results: ResultsStore::new(pool),
            generator: QuestionGenerator::new(llm.clone()),
            analyzer: AnswerAnalyzer::new(llm),
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<SessionRegistry> {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for ResultsStore {
    fn from_ref(state: &AppState) -> Self {
        state.results.clone()
    }
}

impl FromRef<AppState> for QuestionGenerator {
    fn from_ref(state: &AppState) -> Self {
        state.generator.clone()
    }
}

impl FromRef<AppState> for AnswerAnalyzer {
    fn from_ref(state: &AppState) -> Self {
        state.analyzer.clone()
    }
}
