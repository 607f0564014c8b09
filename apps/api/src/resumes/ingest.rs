use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::embedding::{embed_with_deadline, EmbeddingProvider};
use crate::errors::AppError;
use crate::models::resume::ResumeRecord;
use crate::resumes::validation::{normalize_extracted, MalformedField};
use crate::store::ResumeStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EmbeddingStatus {
    Computed { dimension: usize },
    /// No raw text to embed.
    Skipped,
    Failed { reason: String },
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub record: ResumeRecord,
    pub embedding: EmbeddingStatus,
    pub warnings: Vec<MalformedField>,
}

/// Validates an extracted resume, embeds its raw text and stores it.
///
/// Embedding is best-effort: when the provider fails the record is stored
/// without an embedding and can be picked up later by the back-fill.
pub async fn ingest_resume(
    store: &dyn ResumeStore,
    embedder: &dyn EmbeddingProvider,
    deadline: Duration,
    extracted: &Value,
) -> Result<IngestResponse, AppError> {
    if !extracted.is_object() {
        return Err(AppError::Validation(
            "Extracted resume must be a JSON object".to_string(),
        ));
    }

    let (mut resume, warnings) = normalize_extracted(extracted);
    for w in &warnings {
        warn!(field = %w.field, "Malformed resume field: {}", w.reason);
    }

    let embedding = match embed_with_deadline(embedder, &resume.raw_text, deadline).await {
        Ok(vector) if vector.is_empty() => EmbeddingStatus::Skipped,
        Ok(vector) => {
            let dimension = vector.len();
            resume.embedding = Some(vector);
            EmbeddingStatus::Computed { dimension }
        }
        Err(e) => {
            warn!("Storing resume without embedding: {e}");
            EmbeddingStatus::Failed {
                reason: e.to_string(),
            }
        }
    };

    let record = store.insert(resume).await?;
    info!(
        resume_id = %record.id,
        warnings = warnings.len(),
        "Ingested resume"
    );

    Ok(IngestResponse {
        record,
        embedding,
        warnings,
    })
}
