use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::extract::ExtractError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Domain rejections (invalid role/topic, résumé below the score gate) are not
/// errors and never appear here; see `provisioning::Rejection`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A collaborator was unreachable, timed out, or answered with an empty payload.
    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    /// The Oracle answered, but no usable JSON object could be recovered from the reply.
    #[error("Malformed generation: {0}")]
    MalformedGeneration(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether resubmitting the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::Upstream(_) | AppError::MalformedGeneration(_) | AppError::Database(_)
        )
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::EmptyContent => AppError::Upstream("oracle returned an empty reply".into()),
            other => AppError::Upstream(format!("oracle call failed: {other}")),
        }
    }
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        AppError::MalformedGeneration(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let retryable = self.is_retryable();
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_UNAVAILABLE",
                    "A dependent service is unavailable, please retry".to_string(),
                )
            }
            AppError::MalformedGeneration(msg) => {
                tracing::error!("Malformed generation: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MALFORMED_GENERATION",
                    "Invalid or incomplete generation, please retry".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
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
                "message": message,
                "retryable": retryable
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Upstream("x".into()), StatusCode::BAD_GATEWAY),
            (AppError::MalformedGeneration("x".into()), StatusCode::BAD_GATEWAY),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_input_errors_are_not_retryable() {
        assert!(!AppError::Validation("bad".into()).is_retryable());
        assert!(!AppError::NotFound("gone".into()).is_retryable());
        assert!(AppError::Upstream("down".into()).is_retryable());
        assert!(AppError::MalformedGeneration("junk".into()).is_retryable());
    }

    #[test]
    fn test_empty_oracle_reply_maps_to_upstream() {
        let err: AppError = LlmError::EmptyContent.into();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[test]
    fn test_extract_failure_maps_to_malformed() {
        let err: AppError = ExtractError::NoObject.into();
        assert!(matches!(err, AppError::MalformedGeneration(_)));
    }
}
