//! Startup Cache - client-side TTL cache for the startup-networking app
//!
//! Keyed cache with reader-supplied TTLs, prefix invalidation, namespace
//! handles and write-through persistence for selected namespaces, plus a
//! small HTTP inspector.

pub mod api;
pub mod cache;
pub mod config;
pub mod domains;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::{CacheParams, CacheStore, NamespaceHandle, Persistence};
pub use config::Config;
