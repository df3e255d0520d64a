//! Cache Statistics Module
//!
//! Tracks hits, misses, lazy expirations, invalidations and persistence failures.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache activity counters.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CacheStats {
    /// Lookups that returned a value
    pub hits: u64,
    /// Lookups that returned nothing (absent or stale)
    pub misses: u64,
    /// Entries dropped because a read found them stale
    pub expirations: u64,
    /// Entries dropped by prefix invalidation
    pub invalidated: u64,
    /// Durable storage operations that failed and were swallowed
    pub persist_failures: u64,
    /// Entries seeded from durable storage
    pub restored: u64,
    /// Current number of in-memory entries
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    pub fn record_invalidated(&mut self, count: usize) {
        self.invalidated += count as u64;
    }

    pub fn record_persist_failure(&mut self) {
        self.persist_failures += 1;
    }

    pub fn record_restored(&mut self, count: usize) {
        self.restored += count as u64;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
