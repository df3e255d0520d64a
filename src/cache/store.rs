//! Cache Store Module
//!
//! Main cache engine: in-memory map with reader-supplied TTLs, prefix
//! invalidation and write-through persistence for an allow-list of namespaces.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{
    generate_key, CacheEntry, CacheParams, CacheStats, Clock, DurableStorage, MemoryStorage,
    NamespaceHandle, PersistedEntry, SystemClock,
};

/// Storage key prefix for persisted entries.
pub const DEFAULT_STORAGE_PREFIX: &str = "sc_cache_";

/// Namespaces mirrored into durable storage unless configured otherwise.
pub const DEFAULT_PERSISTED_NAMESPACES: [&str; 3] = ["conversations", "groups", "notifications"];

/// Persisted entries at least this old (30 minutes) are dropped on restore.
pub const DEFAULT_RESTORE_MAX_AGE_MS: u64 = 30 * 60 * 1000;

// == Persistence ==
/// Which entries reach durable storage, and how long they stay restorable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persistence {
    /// Prepended to a cache key to form its storage key
    pub storage_prefix: String,
    /// Cache keys starting with any of these are persisted
    pub namespaces: Vec<String>,
    /// Restore ceiling in milliseconds, independent of reader TTLs
    pub max_age_ms: u64,
}

impl Persistence {
    /// Persistence with no namespaces: a purely in-memory cache.
    pub fn disabled() -> Self {
        Self {
            namespaces: Vec::new(),
            ..Self::default()
        }
    }

    /// Whether `key` belongs to a persisted namespace.
    pub fn persists(&self, key: &str) -> bool {
        self.namespaces.iter().any(|ns| key.starts_with(ns.as_str()))
    }

    /// Storage key under which `key` is persisted.
    pub fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.storage_prefix, key)
    }

    /// Cache key behind a storage key, if it is one of ours.
    fn cache_key<'a>(&self, storage_key: &'a str) -> Option<&'a str> {
        storage_key
            .strip_prefix(self.storage_prefix.as_str())
            .filter(|key| self.persists(key))
    }
}

impl Default for Persistence {
    fn default() -> Self {
        Self {
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            namespaces: DEFAULT_PERSISTED_NAMESPACES
                .iter()
                .map(|ns| ns.to_string())
                .collect(),
            max_age_ms: DEFAULT_RESTORE_MAX_AGE_MS,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
}

// == Cache Store ==
/// Keyed store of `(value, written_at)` pairs shared by every namespace handle.
///
/// All operations take `&self` and never fail: durable storage errors are
/// logged, counted in [`CacheStats::persist_failures`] and otherwise ignored.
/// Construct one per application and share it behind an `Arc`.
pub struct CacheStore {
    inner: Mutex<Inner>,
    storage: Arc<dyn DurableStorage>,
    persistence: Persistence,
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store on the system clock and restores persisted entries.
    pub fn new(storage: Arc<dyn DurableStorage>, persistence: Persistence) -> Self {
        Self::with_clock(storage, persistence, Arc::new(SystemClock))
    }

    /// Creates a store on the given clock and restores persisted entries.
    pub fn with_clock(
        storage: Arc<dyn DurableStorage>,
        persistence: Persistence,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store = Self {
            inner: Mutex::new(Inner::default()),
            storage,
            persistence,
            clock,
        };
        store.restore_from_storage();
        store
    }

    /// Store backed by fresh in-process storage with the default allow-list.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), Persistence::default())
    }

    // == Key Derivation ==
    /// Derives the key for `namespace` and `params`. See [`generate_key`].
    pub fn generate_key(namespace: &str, params: &CacheParams) -> String {
        generate_key(namespace, params)
    }

    // == Namespace Handle ==
    /// Returns a handle bound to `namespace` and `ttl_ms`.
    pub fn namespace(
        self: &Arc<Self>,
        namespace: impl Into<String>,
        ttl_ms: u64,
    ) -> NamespaceHandle {
        NamespaceHandle::new(Arc::clone(self), namespace, ttl_ms)
    }

    // == Get ==
    /// Returns the value stored under `key` if it is at most `ttl_ms` old.
    ///
    /// This read mutates: an entry found stale is removed from memory and
    /// from durable storage before `None` is returned. Use [`peek`](Self::peek)
    /// for a lookup without side effects.
    pub fn get(&self, key: &str, ttl_ms: u64) -> Option<Arc<Value>> {
        let now = self.clock.now_ms();
        let mut guard = self.lock();
        let inner = &mut *guard;

        let age_ms = match inner.entries.get(key) {
            None => {
                inner.stats.record_miss();
                debug!(key, "cache miss");
                return None;
            }
            Some(entry) if !entry.is_stale(now, ttl_ms) => {
                inner.stats.record_hit();
                debug!(key, "cache hit");
                return Some(Arc::clone(&entry.value));
            }
            Some(entry) => entry.age_ms(now),
        };

        inner.entries.remove(key);
        inner.stats.record_miss();
        inner.stats.record_expiration();
        inner.stats.set_total_entries(inner.entries.len());
        debug!(key, age_ms, ttl_ms, "cache entry expired");

        if self.persistence.persists(key) {
            self.remove_durable(inner, key);
        }
        None
    }

    // == Peek ==
    /// Returns the stored value regardless of age, without touching stats.
    pub fn peek(&self, key: &str) -> Option<Arc<Value>> {
        self.lock().entries.get(key).map(|entry| Arc::clone(&entry.value))
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry and stamping
    /// the current time. Persisted namespaces are written through to durable
    /// storage on a best-effort basis.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        let entry = CacheEntry::new(Arc::new(value), self.clock.now_ms());
        let mut guard = self.lock();
        let inner = &mut *guard;

        if self.persistence.persists(&key) {
            self.persist(inner, &key, &entry);
        }

        inner.entries.insert(key, entry);
        inner.stats.set_total_entries(inner.entries.len());
    }

    // == Invalidate ==
    /// Removes every entry whose key starts with `prefix`, in memory and in
    /// durable storage. A full key as prefix invalidates that key (and any
    /// key it is a prefix of). Returns the number of in-memory entries removed.
    pub fn invalidate(&self, prefix: &str) -> usize {
        let mut guard = self.lock();
        let inner = &mut *guard;

        let doomed: Vec<String> = inner
            .entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();

        for key in &doomed {
            inner.entries.remove(key);
            if self.persistence.persists(key) {
                self.remove_durable(inner, key);
            }
        }

        inner.stats.set_total_entries(inner.entries.len());
        inner.stats.record_invalidated(doomed.len());
        debug!(prefix, removed = doomed.len(), "cache prefix invalidated");
        doomed.len()
    }

    // == Clear ==
    /// Drops every in-memory entry and every durable item belonging to a
    /// persisted namespace.
    pub fn clear(&self) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        inner.entries.clear();
        inner.stats.set_total_entries(0);

        let storage_keys: Vec<String> = match self.storage.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter(|storage_key| self.persistence.cache_key(storage_key).is_some())
                .collect(),
            Err(e) => {
                warn!(error = %e, "Failed to list durable cache entries, clearing namespace roots only");
                inner.stats.record_persist_failure();
                self.persistence
                    .namespaces
                    .iter()
                    .map(|ns| self.persistence.storage_key(ns))
                    .collect()
            }
        };

        for storage_key in storage_keys {
            if let Err(e) = self.storage.remove_item(&storage_key) {
                warn!(key = %storage_key, error = %e, "Failed to remove durable cache entry");
                inner.stats.record_persist_failure();
            }
        }
        debug!("cache cleared");
    }

    // == Restore ==
    /// Seeds the in-memory map from durable storage.
    ///
    /// Items younger than the restore ceiling are loaded with their original
    /// write time; stale or unparseable items are removed from storage.
    /// Runs once at construction; calling it again simulates a restart
    /// without discarding newer in-memory writes. Returns the number of
    /// entries restored.
    pub fn restore_from_storage(&self) -> usize {
        let now = self.clock.now_ms();
        let mut guard = self.lock();
        let inner = &mut *guard;

        let storage_keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Failed to restore cache from storage");
                inner.stats.record_persist_failure();
                return 0;
            }
        };

        let mut restored = 0;
        for storage_key in storage_keys {
            let Some(key) = self.persistence.cache_key(&storage_key) else {
                continue;
            };

            let raw = match self.storage.get_item(&storage_key) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    warn!(key = %storage_key, error = %e, "Failed to read durable cache entry");
                    inner.stats.record_persist_failure();
                    continue;
                }
            };

            let blob = match serde_json::from_str::<PersistedEntry>(&raw) {
                Ok(blob) => blob,
                Err(e) => {
                    warn!(key = %storage_key, error = %e, "Discarding malformed durable cache entry");
                    self.remove_durable_raw(inner, &storage_key);
                    continue;
                }
            };

            if now.saturating_sub(blob.timestamp) >= self.persistence.max_age_ms {
                debug!(key, "discarding durable cache entry past restore ceiling");
                self.remove_durable_raw(inner, &storage_key);
                continue;
            }

            let newer_in_memory = inner
                .entries
                .get(key)
                .is_some_and(|existing| existing.written_at > blob.timestamp);
            if !newer_in_memory {
                inner.entries.insert(key.to_string(), blob.into_entry());
                restored += 1;
            }
        }

        inner.stats.set_total_entries(inner.entries.len());
        inner.stats.record_restored(restored);
        if restored > 0 {
            info!("Restored {} cache entries from durable storage", restored);
        }
        restored
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.entries.len());
        stats
    }

    /// Returns the in-memory keys in ascending order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    // == Length ==
    /// Returns the current number of in-memory entries, stale ones included.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, inner: &mut Inner, key: &str, entry: &CacheEntry) {
        let storage_key = self.persistence.storage_key(key);
        let written = serde_json::to_string(&PersistedEntry::from_entry(entry))
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.storage
                    .set_item(&storage_key, &json)
                    .map_err(|e| e.to_string())
            });

        if let Err(error) = written {
            warn!(key = %storage_key, %error, "Failed to persist cache to storage");
            inner.stats.record_persist_failure();
        }
    }

    fn remove_durable(&self, inner: &mut Inner, key: &str) {
        let storage_key = self.persistence.storage_key(key);
        self.remove_durable_raw(inner, &storage_key);
    }

    fn remove_durable_raw(&self, inner: &mut Inner, storage_key: &str) {
        if let Err(e) = self.storage.remove_item(storage_key) {
            warn!(key = %storage_key, error = %e, "Failed to remove durable cache entry");
            inner.stats.record_persist_failure();
        }
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("entries", &self.len())
            .field("persistence", &self.persistence)
            .finish_non_exhaustive()
    }
}
