use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::embedding::{embed_with_deadline, EmbeddingProvider};
use crate::errors::AppError;
use crate::store::ResumeStore;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct BackfillReport {
    pub processed: usize,
    pub embedded: usize,
    /// Records with no raw text.
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddingCoverage {
    pub total: usize,
    /// Embedded at the current model's dimension.
    pub with_embedding: usize,
    pub missing_embedding: usize,
    /// Embedded at some other dimension, so invisible to matching.
    pub stale_dimension: usize,
    pub model: String,
}

/// Embeds every record that has none. A failure on one record is counted
/// and the run continues.
pub async fn backfill_embeddings(
    store: &dyn ResumeStore,
    embedder: &dyn EmbeddingProvider,
    deadline: Duration,
) -> Result<BackfillReport, AppError> {
    let pending = store.missing_embeddings().await?;
    let mut report = BackfillReport::default();

    for (id, raw_text) in pending {
        report.processed += 1;
        match embed_with_deadline(embedder, &raw_text, deadline).await {
            Ok(vector) if vector.is_empty() => report.skipped += 1,
            Ok(vector) => {
                if store.set_embedding(id, vector).await? {
                    report.embedded += 1;
                } else {
                    // deleted mid-run
                    report.skipped += 1;
                }
            }
            Err(e) => {
                warn!(resume_id = %id, "Back-fill embedding failed: {e}");
                report.failed += 1;
            }
        }
    }

    info!(
        "Embedding back-fill: {} processed, {} embedded, {} skipped, {} failed",
        report.processed, report.embedded, report.skipped, report.failed
    );
    Ok(report)
}

pub async fn embedding_status(
    store: &dyn ResumeStore,
    embedder: &dyn EmbeddingProvider,
) -> Result<EmbeddingCoverage, AppError> {
    let total = store.all().await?.len();
    let embedded = store.with_embedding().await?;
    let stale_dimension = match embedder.dimension() {
        Some(dimension) => embedded.iter().filter(|(_, v)| v.len() != dimension).count(),
        None => 0,
    };
    let with_embedding = embedded.len() - stale_dimension;
    Ok(EmbeddingCoverage {
        total,
        with_embedding,
        missing_embedding: total.saturating_sub(embedded.len()),
        stale_dimension,
        model: embedder.model_id().to_string(),
    })
}
