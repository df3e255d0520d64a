//! Response DTOs for the cache inspector API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;

/// Response body for an entry lookup (GET /entries/:namespace)
#[derive(Debug, Clone, Serialize)]
pub struct EntryResponse {
    /// The derived cache key
    pub key: String,
    /// The cached value
    pub value: Value,
}

impl EntryResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for prefix invalidation (DELETE /entries/:prefix)
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// The prefix that was invalidated
    pub prefix: String,
    /// Number of in-memory entries removed
    pub removed: usize,
}

impl InvalidateResponse {
    pub fn new(prefix: impl Into<String>, removed: usize) -> Self {
        Self {
            prefix: prefix.into(),
            removed,
        }
    }
}

/// Response body for a global clear (DELETE /entries)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

impl ClearResponse {
    pub fn cleared() -> Self {
        Self {
            message: "Cache cleared".to_string(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Entries dropped by lazy expiry
    pub expirations: u64,
    /// Entries dropped by invalidation
    pub invalidated: u64,
    /// Swallowed durable storage failures
    pub persist_failures: u64,
    /// Entries restored from durable storage
    pub restored: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Current keys, sorted
    pub keys: Vec<String>,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics and keys
    pub fn new(stats: &CacheStats, keys: Vec<String>) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            invalidated: stats.invalidated,
            persist_failures: stats.persist_failures,
            restored: stats.restored,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
            keys,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
