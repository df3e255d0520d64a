//! Error types for the cache
//!
//! Provides unified error handling using thiserror.
//!
//! None of these errors escape `CacheStore` or `NamespaceHandle` operations:
//! storage failures are logged and absorbed where they happen. They surface
//! only from the durable storage backends themselves and from the
//! diagnostics API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Storage Error Enum ==
/// Failure reported by a durable storage backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Underlying filesystem failure
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing would exceed the backend's capacity
    #[error("Storage quota exceeded writing '{key}' ({needed} bytes, limit {limit})")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    /// Backend disabled or otherwise not usable
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

// == Cache Error Enum ==
/// Unified error type for the cache and its diagnostics surface.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache (or found stale)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Durable storage failure
    #[error(transparent)]
    Storage(#[from] StorageError),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Storage(StorageError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
