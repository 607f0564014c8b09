use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::matching::ml_ranker::{ModelState, TrainingSummary};
use crate::matching::service::{
    match_job_description, rank_by_model, rank_by_skill_rule, train_model, ModelRanking,
    ScoredResume, DEFAULT_MATCH_TOP_N, DEFAULT_RANK_TOP_N,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    #[serde(alias = "job_description")]
    pub text: String,
    pub top_n: Option<usize>,
    pub min_similarity: Option<f64>,
}

#[derive(Serialize)]
pub struct MatchResponse {
    pub matches: Vec<ScoredResume>,
}

/// POST /api/v1/match
pub async fn handle_match(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let min_similarity = req.min_similarity.unwrap_or(0.0);
    if !min_similarity.is_finite() {
        return Err(AppError::Validation(
            "min_similarity must be a finite number".to_string(),
        ));
    }

    let matches = match_job_description(
        state.store.as_ref(),
        state.embedder.as_ref(),
        state.config.embedding_timeout,
        &req.text,
        req.top_n.unwrap_or(DEFAULT_MATCH_TOP_N),
        min_similarity,
    )
    .await?;
    Ok(Json(MatchResponse { matches }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RuleRankRequest {
    pub preferred_skills: Vec<String>,
    pub top_n: Option<usize>,
}

#[derive(Serialize)]
pub struct RankResponse {
    pub results: Vec<ScoredResume>,
}

/// POST /api/v1/rank/rules
pub async fn handle_rank_rules(
    State(state): State<AppState>,
    Json(req): Json<RuleRankRequest>,
) -> Result<Json<RankResponse>, AppError> {
    let results = rank_by_skill_rule(
        state.store.as_ref(),
        &req.preferred_skills,
        req.top_n.unwrap_or(DEFAULT_RANK_TOP_N),
    )
    .await?;
    Ok(Json(RankResponse { results }))
}

#[derive(Debug, Deserialize)]
pub struct TopNQuery {
    pub top_n: Option<usize>,
}

/// GET /api/v1/rank/model
pub async fn handle_rank_model(
    State(state): State<AppState>,
    Query(params): Query<TopNQuery>,
) -> Result<Json<ModelRanking>, AppError> {
    let ranking = rank_by_model(
        state.store.as_ref(),
        &state.ranker,
        params.top_n.unwrap_or(DEFAULT_RANK_TOP_N),
    )
    .await?;
    Ok(Json(ranking))
}

/// POST /api/v1/model/train
pub async fn handle_train(
    State(state): State<AppState>,
) -> Result<Json<TrainingSummary>, AppError> {
    let summary = train_model(state.store.as_ref(), &state.ranker).await?;
    Ok(Json(summary))
}

#[derive(Serialize)]
pub struct ModelStatusResponse {
    pub model: ModelState,
    pub artifact_location: String,
    pub artifact_exists: bool,
}

/// GET /api/v1/model
pub async fn handle_model_status(
    State(state): State<AppState>,
) -> Result<Json<ModelStatusResponse>, AppError> {
    Ok(Json(ModelStatusResponse {
        model: state.ranker.state(),
        artifact_location: state.ranker.artifact_location(),
        artifact_exists: state.ranker.artifact_exists().await?,
    }))
}
