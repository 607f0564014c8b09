//! Embedding Provider: turns resume and job-description text into vectors.
//!
//! All embedding calls go through `EmbeddingProvider`; the matching code never
//! reaches a model handle directly. `AppState` holds an `Arc<dyn EmbeddingProvider>`
//! chosen at startup via `EMBEDDING_BACKEND`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::config::{Config, EmbeddingBackend};

pub mod hashing;
pub mod local;
pub mod remote;

pub use hashing::HashingEmbeddingProvider;
pub use local::LocalEmbeddingProvider;
pub use remote::RemoteEmbeddingProvider;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Embedding model unavailable: {0}")]
    Unavailable(String),

    #[error("Embedding call timed out after {0:?}")]
    Timeout(Duration),
}

/// Text → vector. Implementations must be deterministic for a fixed model and
/// return an empty vector (not an error) for empty or whitespace-only input.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Identifier of the model producing the vectors (for logs and status output).
    fn model_id(&self) -> &str;

    /// Output dimension, once known. Remote models only learn it on first load.
    fn dimension(&self) -> Option<usize> {
        None
    }
}

/// Calls the provider with a deadline. A provider that does not answer in time
/// fails with `EmbeddingError::Timeout` instead of stalling the caller.
pub async fn embed_with_deadline(
    provider: &dyn EmbeddingProvider,
    text: &str,
    deadline: Duration,
) -> Result<Vec<f32>, EmbeddingError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    match tokio::time::timeout(deadline, provider.embed(text)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                "Embedding provider {} did not respond within {:?}",
                provider.model_id(),
                deadline
            );
            Err(EmbeddingError::Timeout(deadline))
        }
    }
}

/// Builds the configured embedding backend.
pub fn build_provider(config: &Config) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    Ok(match config.embedding_backend {
        EmbeddingBackend::Remote => Arc::new(RemoteEmbeddingProvider::new(
            config.embedding_api_url.clone(),
            config.embedding_model.clone(),
            config.hf_api_key.clone(),
        )?),
        EmbeddingBackend::Local => Arc::new(LocalEmbeddingProvider::new(
            config.embedding_cache_dir.clone(),
        )),
        EmbeddingBackend::Hashing => Arc::new(HashingEmbeddingProvider::default()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SlowProvider;

    #[async_trait]
    impl EmbeddingProvider for SlowProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![1.0])
        }

        fn model_id(&self) -> &str {
            "slow"
        }
    }

    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for CountingProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0.5, 0.5])
        }

        fn model_id(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_fails_fast_with_timeout() {
        let result = embed_with_deadline(&SlowProvider, "rust engineer", Duration::from_secs(2)).await;
        assert!(matches!(result, Err(EmbeddingError::Timeout(d)) if d == Duration::from_secs(2)));
    }

    #[tokio::test]
    async fn test_blank_text_skips_provider() {
        let provider = CountingProvider::default();
        let vector = embed_with_deadline(&provider, "   \n\t", Duration::from_secs(1))
            .await
            .unwrap();
        assert!(vector.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_build_provider_selects_backend() {
        let mut config = Config::for_tests();
        assert_eq!(build_provider(&config).unwrap().model_id(), "hashing-384");

        config.embedding_backend = EmbeddingBackend::Local;
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.model_id(), local::MODEL_ID);
        assert_eq!(provider.dimension(), Some(local::DIMENSION));
    }

    #[tokio::test]
    async fn test_deadline_passes_through_result() {
        let provider = CountingProvider::default();
        let vector = embed_with_deadline(&provider, "text", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(vector, vec![0.5, 0.5]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
