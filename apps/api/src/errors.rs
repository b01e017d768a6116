use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::recommendation::model::RankError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Recommendation model is not loaded")]
    ModelNotLoaded,

    #[error("AI career coach is not configured")]
    ChatUnavailable,

    /// The classifier or embedder failed while serving the request.
    #[error("Model inference failed: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<RankError> for AppError {
    fn from(err: RankError) -> Self {
        match err {
            RankError::ModelNotLoaded => AppError::ModelNotLoaded,
            RankError::AlreadyInitialized => AppError::Conflict(err.to_string()),
            RankError::Upstream(e) => AppError::Upstream(format!("{e:#}")),
            other => AppError::Internal(other.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::ModelNotLoaded => (
                StatusCode::SERVICE_UNAVAILABLE,
                "MODEL_NOT_LOADED",
                "Model not loaded. POST /api/v1/model/load first.".to_string(),
            ),
            AppError::ChatUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "CHAT_UNAVAILABLE",
                "Set OPENROUTER_API_KEY to enable the AI career coach".to_string(),
            ),
            AppError::Upstream(msg) => {
                tracing::error!("Model inference error: {msg}");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone())
            }
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
