//! In-process embedding backend: all-MiniLM-L6-v2 through the ONNX runtime
//! bundled with `fastembed`.
//!
//! The model files are fetched and the session built on the first non-empty
//! `embed` call, then shared by every later call. Inference is CPU-bound, so it
//! runs on the blocking pool.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tokio::sync::OnceCell;
use tracing::info;

use super::{EmbeddingError, EmbeddingProvider};

pub const MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DIMENSION: usize = 384;

pub struct LocalEmbeddingProvider {
    cache_dir: Option<PathBuf>,
    model: OnceCell<Arc<TextEmbedding>>,
}

impl LocalEmbeddingProvider {
    /// `cache_dir` overrides where fastembed keeps downloaded model files.
    pub fn new(cache_dir: Option<PathBuf>) -> Self {
        Self {
            cache_dir,
            model: OnceCell::new(),
        }
    }

    async fn load(&self) -> Result<Arc<TextEmbedding>, EmbeddingError> {
        info!("Loading embedding model {MODEL_ID} in process");

        let mut options =
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
        if let Some(dir) = &self.cache_dir {
            options = options.with_cache_dir(dir.clone());
        }

        let model = tokio::task::spawn_blocking(move || TextEmbedding::try_new(options))
            .await
            .map_err(|e| EmbeddingError::Unavailable(format!("model load task failed: {e}")))?
            .map_err(|e| EmbeddingError::Unavailable(format!("failed to load {MODEL_ID}: {e}")))?;

        info!("Embedding model {MODEL_ID} ready (dimension {DIMENSION})");
        Ok(Arc::new(model))
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.model.get_or_try_init(|| self.load()).await?.clone();
        let input = text.to_string();
        let vectors = tokio::task::spawn_blocking(move || model.embed(vec![input], None))
            .await
            .map_err(|e| EmbeddingError::Unavailable(format!("inference task failed: {e}")))?
            .map_err(|e| EmbeddingError::Unavailable(format!("inference failed: {e}")))?;

        let vector = vectors.into_iter().next().unwrap_or_default();
        if vector.len() != DIMENSION {
            return Err(EmbeddingError::Unavailable(format!(
                "model {MODEL_ID} returned dimension {}, expected {DIMENSION}",
                vector.len()
            )));
        }
        Ok(vector)
    }

    fn model_id(&self) -> &str {
        MODEL_ID
    }

    fn dimension(&self) -> Option<usize> {
        Some(DIMENSION)
    }
}
