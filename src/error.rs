//! Structured error handling for the HTTP API.
//!
//! Internal details are logged but never exposed to clients.

use std::fmt::Display;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Application error type with automatic HTTP response conversion.
///
/// Internal details are logged but sanitized messages are sent to clients.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    /// Create a not found error for an entity.
    pub fn not_found(entity: &str, id: impl Display) -> Self {
        Self::NotFound(format!("{entity} not found: {id}"))
    }

    /// Create an invalid argument error for a specific request field.
    #[must_use]
    pub fn field_violation(field: &str, description: &str) -> Self {
        Self::InvalidArgument(format!("{field}: {description}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(ref msg) => {
                error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            Self::Database(ref e) => {
                error!(error = %e, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for the application.
pub type AppResult<T> = Result<T, AppError>;
