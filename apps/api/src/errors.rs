use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::matching::ml_ranker::RankerError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Ranker error: {0}")]
    Ranker(#[from] RankerError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Embedding(e) => {
                tracing::warn!("Embedding error: {e}");
                let code = match e {
                    EmbeddingError::Timeout(_) => "EMBEDDING_TIMEOUT",
                    EmbeddingError::Unavailable(_) => "EMBEDDING_UNAVAILABLE",
                };
                (StatusCode::SERVICE_UNAVAILABLE, code, e.to_string())
            }
            AppError::Ranker(e) => match e {
                RankerError::InsufficientData => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "INSUFFICIENT_DATA",
                    e.to_string(),
                ),
                RankerError::IncompatibleModelVersion { .. } | RankerError::CorruptArtifact(_) => {
                    tracing::error!("Model artifact error: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "MODEL_ARTIFACT_ERROR",
                        e.to_string(),
                    )
                }
                RankerError::Training(msg) => {
                    tracing::error!("Model training task failed: {msg}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "MODEL_TRAINING_ERROR",
                        "Model training failed".to_string(),
                    )
                }
                RankerError::Storage(msg) => {
                    tracing::error!("Model storage error: {msg}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "MODEL_STORAGE_ERROR",
                        "A model storage error occurred".to_string(),
                    )
                }
            },
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
