//! Namespace Handle Module
//!
//! Per-caller view of the shared `CacheStore`, bound to one namespace and TTL.

use std::future::Future;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{CacheParams, CacheStore};

// == Namespace Handle ==
/// Capability to read and write one namespace of a [`CacheStore`].
///
/// Holds only the namespace, its TTL and a reference to the shared store.
/// Cloning a handle is cheap and yields an equivalent capability.
#[derive(Debug, Clone)]
pub struct NamespaceHandle {
    store: Arc<CacheStore>,
    namespace: String,
    ttl_ms: u64,
}

impl NamespaceHandle {
    pub fn new(store: Arc<CacheStore>, namespace: impl Into<String>, ttl_ms: u64) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            ttl_ms,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    /// Cache key for `params` within this namespace.
    pub fn key(&self, params: &CacheParams) -> String {
        CacheStore::generate_key(&self.namespace, params)
    }

    // == Get ==
    /// Returns the cached value for `params` if younger than this handle's TTL.
    ///
    /// Like [`CacheStore::get`], a stale entry is removed as a side effect.
    pub fn get(&self, params: &CacheParams) -> Option<Arc<Value>> {
        self.store.get(&self.key(params), self.ttl_ms)
    }

    /// Typed [`get`](Self::get). A cached value that does not decode as `T`
    /// is reported as a miss.
    pub fn get_as<T: DeserializeOwned>(&self, params: &CacheParams) -> Option<T> {
        let value = self.get(params)?;
        match <T as Deserialize>::deserialize(value.as_ref()) {
            Ok(typed) => Some(typed),
            Err(e) => {
                debug!(namespace = %self.namespace, error = %e, "cached value has unexpected shape");
                None
            }
        }
    }

    // == Set ==
    /// Caches `value` for `params`.
    ///
    /// A value that cannot be represented as JSON is logged and skipped.
    pub fn set<T: Serialize + ?Sized>(&self, params: &CacheParams, value: &T) {
        match serde_json::to_value(value) {
            Ok(json) => self.store.set(self.key(params), json),
            Err(e) => {
                warn!(namespace = %self.namespace, error = %e, "Failed to serialize value for cache");
            }
        }
    }

    // == Invalidate ==
    /// Drops every entry under this namespace, whatever its params.
    ///
    /// This is a raw prefix match: invalidating `group` also drops `groups`.
    pub fn invalidate(&self) -> usize {
        self.store.invalidate(&self.namespace)
    }

    // == Clear ==
    /// Global reset: clears the whole store, not just this namespace.
    pub fn clear(&self) {
        self.store.clear();
    }

    // == Get Or Fetch ==
    /// Returns the cached value for `params`, or runs `fetch` and caches its
    /// successful result.
    ///
    /// `force_refresh` skips the lookup. A failed fetch is returned untouched
    /// and caches nothing. Concurrent callers missing on the same key each run
    /// their own fetch; the last one to finish wins.
    pub async fn get_or_fetch<T, E, F, Fut>(
        &self,
        params: &CacheParams,
        force_refresh: bool,
        fetch: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !force_refresh {
            if let Some(cached) = self.get_as::<T>(params) {
                return Ok(cached);
            }
        }

        let fresh = fetch().await?;
        self.set(params, &fresh);
        Ok(fresh)
    }
}
