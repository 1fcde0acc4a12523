//! Error types for giftscan
//!
//! Store operations surface exactly two failure categories: bad caller data
//! ([`StoreError::Validation`]) and backend trouble
//! ([`StoreError::Persistence`]). Lookups that simply find nothing return
//! `Option::None` rather than an error. Decoder failures are separate
//! ([`DecodeError`]) because a clean "no barcode in this image" is not a
//! failure at all.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type for store and storage operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors from profile/item stores and their storage backends
#[derive(Debug, Error)]
pub enum StoreError {
    /// Caller-supplied data failed validation (blank name, malformed barcode)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The storage backend could not durably complete the operation
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Persistence(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Persistence(err.to_string())
    }
}

impl From<uuid::Error> for StoreError {
    fn from(err: uuid::Error) -> Self {
        StoreError::Persistence(format!("malformed id in stored data: {}", err))
    }
}

/// Fatal decoder failures
///
/// "No barcode found" is not an error; decoders report that as `Ok(None)`.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Input bytes are not a readable image
    #[error("Unreadable image data: {0}")]
    BadImage(String),

    /// The decoder itself failed
    #[error("Decoder failure: {0}")]
    Internal(String),
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Capability not configured (503) - e.g., no image decoder installed
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => ApiError::BadRequest(msg),
            StoreError::Persistence(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", msg)
            }
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg,
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;
