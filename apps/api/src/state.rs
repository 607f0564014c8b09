use std::sync::Arc;

use crate::config::Config;
use crate::embedding::EmbeddingProvider;
use crate::matching::ml_ranker::MlRanker;
use crate::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ResumeStore>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub ranker: Arc<MlRanker>,
    pub config: Config,
}
