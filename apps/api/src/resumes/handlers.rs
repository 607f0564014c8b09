use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeRecord;
use crate::resumes::backfill::{
    backfill_embeddings, embedding_status, BackfillReport, EmbeddingCoverage,
};
use crate::resumes::ingest::{ingest_resume, IngestResponse};
use crate::state::AppState;
use crate::store::ResumeFilter;

#[derive(Serialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<ResumeRecord>,
    pub count: usize,
}

/// POST /api/v1/resumes
pub async fn handle_ingest(
    State(state): State<AppState>,
    Json(extracted): Json<Value>,
) -> Result<(StatusCode, Json<IngestResponse>), AppError> {
    let response = ingest_resume(
        state.store.as_ref(),
        state.embedder.as_ref(),
        state.config.embedding_timeout,
        &extracted,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/resumes
pub async fn handle_list(
    State(state): State<AppState>,
    Query(filter): Query<ResumeFilter>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let resumes = state.store.search(&filter).await?;
    Ok(Json(ResumeListResponse {
        count: resumes.len(),
        resumes,
    }))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeRecord>, AppError> {
    let record = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(Json(record))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete(id).await? {
        return Err(AppError::NotFound(format!("Resume {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct HiredToggle {
    pub hired: bool,
}

/// PATCH /api/v1/resumes/:id/hired
pub async fn handle_set_hired(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<HiredToggle>,
) -> Result<StatusCode, AppError> {
    if !state.store.set_hired(id, req.hired).await? {
        return Err(AppError::NotFound(format!("Resume {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resumes/embeddings/backfill
pub async fn handle_backfill(
    State(state): State<AppState>,
) -> Result<Json<BackfillReport>, AppError> {
    let report = backfill_embeddings(
        state.store.as_ref(),
        state.embedder.as_ref(),
        state.config.embedding_timeout,
    )
    .await?;
    Ok(Json(report))
}

/// GET /api/v1/resumes/embeddings/status
pub async fn handle_embedding_status(
    State(state): State<AppState>,
) -> Result<Json<EmbeddingCoverage>, AppError> {
    let status = embedding_status(state.store.as_ref(), state.embedder.as_ref()).await?;
    Ok(Json(status))
}
