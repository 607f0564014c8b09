use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and the active embedding model.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "ranker-api",
        "embedding_model": state.embedder.model_id(),
        "model": state.ranker.state(),
    }))
}
