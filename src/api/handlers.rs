//! API Handlers
//!
//! HTTP request handlers for each inspector endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::info;

use crate::cache::{CacheStore, DurableStorage, FileStorage};
use crate::config::Config;
use crate::domains;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, EntryQuery, EntryResponse, HealthResponse, InvalidateResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// The store synchronizes internally, so handlers share it through a plain `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache store
    pub cache: Arc<CacheStore>,
    /// TTL for namespaces outside the domain catalog
    pub default_ttl_ms: u64,
}

impl AppState {
    /// Creates a new AppState around the given cache store.
    pub fn new(cache: CacheStore) -> Self {
        Self {
            cache: Arc::new(cache),
            default_ttl_ms: domains::DEFAULT_TTL_MS,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens file storage in the configured directory and restores any
    /// persisted entries young enough to keep.
    pub fn from_config(config: &Config) -> Self {
        let storage: Arc<dyn DurableStorage> = Arc::new(FileStorage::new(config.storage_dir.clone()));
        let cache = CacheStore::new(storage, config.persistence());
        Self {
            cache: Arc::new(cache),
            default_ttl_ms: config.default_ttl_ms,
        }
    }

    /// Read TTL for `namespace`: catalogued TTL, else the configured default.
    pub fn ttl_for(&self, namespace: &str) -> u64 {
        domains::find(namespace).map_or(self.default_ttl_ms, |domain| domain.ttl_ms)
    }
}

/// Handler for GET /entries/:namespace
///
/// Derives the key from the query parameters and reads it with the
/// namespace's TTL, or the `ttl` query parameter when given. Like any read,
/// a stale entry is dropped.
pub async fn get_entry_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<EntryResponse>> {
    let query = EntryQuery::from_pairs(query)?;
    let ttl = query.ttl.unwrap_or_else(|| state.ttl_for(&namespace));
    let key = CacheStore::generate_key(&namespace, &query.params);

    match state.cache.get(&key, ttl) {
        Some(value) => Ok(Json(EntryResponse::new(key, value.as_ref().clone()))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /entries/:prefix
///
/// Invalidates every entry whose key starts with the prefix.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
) -> Result<Json<InvalidateResponse>> {
    if prefix.is_empty() {
        return Err(CacheError::InvalidRequest(
            "Prefix cannot be empty, use DELETE /entries to clear".to_string(),
        ));
    }

    let removed = state.cache.invalidate(&prefix);
    info!("Invalidated {} entries under '{}'", removed, prefix);

    Ok(Json(InvalidateResponse::new(prefix, removed)))
}

/// Handler for DELETE /entries
///
/// Clears the whole cache, including persisted namespaces.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.clear();
    info!("Cache cleared");
    Json(ClearResponse::cleared())
}

/// Handler for GET /stats
///
/// Returns current cache statistics and keys.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats();
    let keys = state.cache.keys();
    Json(StatsResponse::new(&stats, keys))
}

/// Handler for GET /health
///
/// Returns health status of the inspector.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(items: &[(&str, &str)]) -> Query<HashMap<String, String>> {
        Query(
            items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_get_entry_handler_hit() {
        let state = AppState::new(CacheStore::in_memory());
        state.cache.set("offers::q:ab", json!([1, 2, 3]));

        let result = get_entry_handler(
            State(state),
            Path("offers".to_string()),
            query(&[("q", "ab")]),
        )
        .await;

        let response = result.unwrap();
        assert_eq!(response.key, "offers::q:ab");
        assert_eq!(response.value, json!([1, 2, 3]));
    }

    #[tokio::test]
    async fn test_get_entry_handler_miss() {
        let state = AppState::new(CacheStore::in_memory());

        let result =
            get_entry_handler(State(state), Path("offers".to_string()), query(&[])).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_entry_handler_bad_ttl() {
        let state = AppState::new(CacheStore::in_memory());

        let result = get_entry_handler(
            State(state),
            Path("offers".to_string()),
            query(&[("ttl", "-1")]),
        )
        .await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_invalidate_handler() {
        let state = AppState::new(CacheStore::in_memory());
        state.cache.set("offers::page:1", json!(1));
        state.cache.set("offers::page:2", json!(2));
        state.cache.set("events", json!(3));

        let response = invalidate_handler(State(state.clone()), Path("offers".to_string()))
            .await
            .unwrap();

        assert_eq!(response.removed, 2);
        assert_eq!(state.cache.keys(), vec!["events".to_string()]);
    }

    #[tokio::test]
    async fn test_clear_handler() {
        let state = AppState::new(CacheStore::in_memory());
        state.cache.set("groups", json!(1));

        clear_handler(State(state.clone())).await;
        assert!(state.cache.is_empty());
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = AppState::new(CacheStore::in_memory());
        state.cache.set("groups", json!(1));

        let response = stats_handler(State(state)).await;
        assert_eq!(response.total_entries, 1);
        assert_eq!(response.keys, vec!["groups".to_string()]);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[test]
    fn test_ttl_for_uses_catalog_then_default() {
        let mut state = AppState::new(CacheStore::in_memory());
        state.default_ttl_ms = 1_000;

        assert_eq!(state.ttl_for("notifications"), 30_000);
        assert_eq!(state.ttl_for("somethingElse"), 1_000);
    }
}
