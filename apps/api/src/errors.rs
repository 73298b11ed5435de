use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Profile not found for user {0}")]
    ProfileNotFound(i32),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Test not found: {0}")]
    TestNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The completion service was unreachable, overloaded, or rejected the call.
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// The completion service answered, but the answer held no parseable JSON.
    /// `snippet` is the text around the parse error position, for diagnosis.
    #[error("Malformed model response: {reason} (near: {snippet:?})")]
    MalformedResponse { reason: String, snippet: String },

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::ProfileNotFound(user_id) => (
                StatusCode::NOT_FOUND,
                "PROFILE_NOT_FOUND",
                format!("No psychometric profile found for user {user_id}"),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::TestNotFound(msg) => (StatusCode::NOT_FOUND, "TEST_NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::GenerationFailed(msg) => {
                tracing::error!("Generation failed: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_FAILED",
                    "The completion service could not fulfil the request".to_string(),
                )
            }
            AppError::MalformedResponse { reason, snippet } => {
                tracing::error!("Malformed model response: {reason} near {snippet:?}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MALFORMED_RESPONSE",
                    format!("The completion service returned unparseable output near: {snippet}"),
                )
            }
            AppError::Persistence(e) => {
                tracing::error!("Persistence error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_ERROR",
                    "A storage error occurred".to_string(),
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
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
