//! Caller-facing matching and ranking operations. Each one snapshots the store,
//! then hands the snapshot to a pure scoring function.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::embedding::{embed_with_deadline, EmbeddingProvider};
use crate::errors::AppError;
use crate::matching::ml_ranker::{HireModel, MlRanker, ModelState, TrainingSummary};
use crate::matching::{ml_ranker, rule_ranker, similarity};
use crate::models::resume::ResumeRecord;
use crate::store::ResumeStore;

pub const DEFAULT_MATCH_TOP_N: usize = 10;
pub const DEFAULT_RANK_TOP_N: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct ScoredResume {
    pub resume: ResumeRecord,
    pub score: f64,
}

impl From<(ResumeRecord, f64)> for ScoredResume {
    fn from((resume, score): (ResumeRecord, f64)) -> Self {
        Self { resume, score }
    }
}

#[derive(Debug, Serialize)]
pub struct ModelRanking {
    pub model: ModelState,
    pub results: Vec<ScoredResume>,
}

/// Semantic match of a job description against every embedded resume.
/// Records without an embedding are never returned.
pub async fn match_job_description(
    store: &dyn ResumeStore,
    embedder: &dyn EmbeddingProvider,
    deadline: Duration,
    text: &str,
    top_n: usize,
    min_similarity: f64,
) -> Result<Vec<ScoredResume>, AppError> {
    let query = embed_with_deadline(embedder, text, deadline).await?;
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let candidates = store.with_embedding().await?;
    let hits = similarity::search(
        &query,
        candidates.iter().map(|(id, v)| (*id, v.as_slice())),
        top_n,
        min_similarity,
    );
    if hits.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<_> = hits.iter().map(|h| h.id).collect();
    let mut by_id: HashMap<_, _> = store
        .get_many(&ids)
        .await?
        .into_iter()
        .map(|r| (r.id, r))
        .collect();

    // a record deleted between the two reads simply drops out
    let matches: Vec<ScoredResume> = hits
        .into_iter()
        .filter_map(|hit| {
            by_id.remove(&hit.id).map(|resume| ScoredResume {
                resume,
                score: hit.score,
            })
        })
        .collect();

    info!(
        "Matched job description against {} candidates: {} results",
        candidates.len(),
        matches.len()
    );
    Ok(matches)
}

pub async fn rank_by_skill_rule(
    store: &dyn ResumeStore,
    preferred_skills: &[String],
    top_n: usize,
) -> Result<Vec<ScoredResume>, AppError> {
    let records = store.all().await?;
    Ok(rule_ranker::rank_scored(records, preferred_skills, top_n)
        .into_iter()
        .map(ScoredResume::from)
        .collect())
}

/// Ranks by hire probability. An untrained ranker yields no results and
/// reports `ModelState::Untrained`.
pub async fn rank_by_model(
    store: &dyn ResumeStore,
    ranker: &MlRanker,
    top_n: usize,
) -> Result<ModelRanking, AppError> {
    // one snapshot: a retrain landing mid-request cannot split state from scores
    let Some(model) = ranker.current_model() else {
        return Ok(rank_with(None, Vec::new(), top_n));
    };
    let records = store.all().await?;
    Ok(rank_with(Some(&model), records, top_n))
}

fn rank_with(model: Option<&HireModel>, records: Vec<ResumeRecord>, top_n: usize) -> ModelRanking {
    ModelRanking {
        model: ModelState::of(model),
        results: ml_ranker::score(model, records, top_n)
            .into_iter()
            .map(ScoredResume::from)
            .collect(),
    }
}

pub async fn train_model(
    store: &dyn ResumeStore,
    ranker: &MlRanker,
) -> Result<TrainingSummary, AppError> {
    let records = store.all().await?;
    Ok(ranker.train(records).await?)
}
