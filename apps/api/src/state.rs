use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::ChatClient;
use crate::lookup::LookupTables;
use crate::recommendation::ranker::RecommendationRanker;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Starts unloaded unless `EAGER_MODEL_LOAD` is set; initialised exactly once.
    pub ranker: Arc<RecommendationRanker>,
    pub lookups: Arc<LookupTables>,
    /// `None` when `OPENROUTER_API_KEY` is not configured.
    pub chat: Option<Arc<dyn ChatClient>>,
    pub config: Config,
}

impl AppState {
    pub fn chat(&self) -> Result<&Arc<dyn ChatClient>, AppError> {
        self.chat.as_ref().ok_or(AppError::ChatUnavailable)
    }

    /// Unloaded ranker, bundled tables, default config.
    #[cfg(test)]
    pub fn for_tests(chat: Option<Arc<dyn ChatClient>>) -> Self {
        AppState {
            ranker: Arc::new(RecommendationRanker::unloaded()),
            lookups: Arc::new(LookupTables::bundled().expect("bundled tables parse")),
            chat,
            config: Config::default(),
        }
    }
}
