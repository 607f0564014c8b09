pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::matching::handlers as matching;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resumes
        .route(
            "/api/v1/resumes",
            post(resumes::handle_ingest).get(resumes::handle_list),
        )
        .route(
            "/api/v1/resumes/:id",
            get(resumes::handle_get).delete(resumes::handle_delete),
        )
        .route("/api/v1/resumes/:id/hired", patch(resumes::handle_set_hired))
        .route(
            "/api/v1/resumes/embeddings/backfill",
            post(resumes::handle_backfill),
        )
        .route(
            "/api/v1/resumes/embeddings/status",
            get(resumes::handle_embedding_status),
        )
        // Matching and ranking
        .route("/api/v1/match", post(matching::handle_match))
        .route("/api/v1/rank/rules", post(matching::handle_rank_rules))
        .route("/api/v1/rank/model", get(matching::handle_rank_model))
        .route("/api/v1/model/train", post(matching::handle_train))
        .route("/api/v1/model", get(matching::handle_model_status))
        .with_state(state)
}
