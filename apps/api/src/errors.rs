use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure taxonomy of the matching and routing core.
///
/// Every gateway, store and pipeline in the library returns this type so the
/// caller can decide between degrading, retrying or surfacing the failure.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Upstream embedding or generation service unavailable, or it answered
    /// with something we could not interpret.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Vector length disagrees with the configured embedding dimensionality.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Model returned no usable text")]
    EmptyGeneration,

    /// Reserved: the router's priority table always yields a category.
    #[error("Routing ambiguity: {0}")]
    RoutingAmbiguity(String),
}

impl CoreError {
    pub fn provider(message: impl Into<String>) -> Self {
        CoreError::Provider(message.into())
    }

    /// Stable machine-readable kind, used in logs and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Provider(_) => "PROVIDER_ERROR",
            CoreError::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            CoreError::EmptyGeneration => "EMPTY_GENERATION",
            CoreError::RoutingAmbiguity(_) => "ROUTING_AMBIGUITY",
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Core(e @ CoreError::Provider(_)) | AppError::Core(e @ CoreError::EmptyGeneration) => {
                tracing::error!("Provider failure ({}): {e}", e.kind());
                (
                    StatusCode::BAD_GATEWAY,
                    e.kind(),
                    "The AI service could not produce an answer. Please try again.".to_string(),
                )
            }
            AppError::Core(e) => {
                tracing::error!("Core failure ({}): {e}", e.kind());
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    e.kind(),
                    "An internal processing error occurred".to_string(),
                )
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
