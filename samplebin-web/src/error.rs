//! Error types for samplebin-web
//!
//! Validation failures re-render the originating form with a message and are
//! not represented here; this type covers the terminal failures: not-found
//! (404), authorization (401), malformed payloads (400) and persistence/IO
//! errors (500). Bodies are plain text.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Authenticated user does not own the resource (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Malformed multipart payload (400)
    #[error("Invalid upload: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    /// Database failure (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO failure (500)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Shared-crate error
    #[error(transparent)]
    Common(#[from] samplebin_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            ApiError::Common(samplebin_common::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
