//! Cache Module
//!
//! Client-side cache with reader-supplied TTLs, prefix invalidation,
//! namespace handles and selective durable persistence.

mod clock;
mod entry;
mod handle;
mod key;
mod stats;
mod storage;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, PersistedEntry};
pub use handle::NamespaceHandle;
pub use key::{generate_key, CacheParams, NAMESPACE_SEPARATOR};
pub use stats::CacheStats;
pub use storage::{DurableStorage, FileStorage, MemoryStorage, StorageResult};
pub use store::{
    CacheStore, Persistence, DEFAULT_PERSISTED_NAMESPACES, DEFAULT_RESTORE_MAX_AGE_MS,
    DEFAULT_STORAGE_PREFIX,
};
