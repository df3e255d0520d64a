//! Cache Entry Module
//!
//! Defines in-memory cache entries and the blob shape written to durable storage.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// Represents a single cache entry: a shared value and its write time.
///
/// The TTL is not part of the entry. Readers supply it on every lookup, so the
/// same entry can be fresh for one caller and stale for another.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: Arc<Value>,
    /// Last write timestamp (Unix milliseconds)
    pub written_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stamped with `written_at`.
    pub fn new(value: Arc<Value>, written_at: u64) -> Self {
        Self { value, written_at }
    }

    // == Age ==
    /// Milliseconds elapsed since the entry was written.
    ///
    /// A write timestamp ahead of `now` (clock skew between sessions) counts as age 0.
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.written_at)
    }

    // == Is Stale ==
    /// Checks whether the entry has outlived `ttl_ms`.
    ///
    /// Boundary condition: an entry is still fresh when its age equals the TTL
    /// exactly; it becomes stale one millisecond later.
    pub fn is_stale(&self, now: u64, ttl_ms: u64) -> bool {
        self.age_ms(now) > ttl_ms
    }
}

// == Persisted Entry ==
/// JSON blob stored in durable storage: `{"data": ..., "timestamp": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedEntry {
    /// The cached payload
    pub data: Value,
    /// Write timestamp (Unix milliseconds)
    pub timestamp: u64,
}

impl PersistedEntry {
    /// Builds the durable form of an in-memory entry.
    pub fn from_entry(entry: &CacheEntry) -> Self {
        Self {
            data: entry.value.as_ref().clone(),
            timestamp: entry.written_at,
        }
    }

    /// Converts a restored blob back into an in-memory entry.
    pub fn into_entry(self) -> CacheEntry {
        CacheEntry::new(Arc::new(self.data), self.timestamp)
    }
}
