//! Configuration Module
//!
//! Handles loading cache and inspector configuration from environment variables.

use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use directories::ProjectDirs;

use crate::cache::{
    Persistence, DEFAULT_PERSISTED_NAMESPACES, DEFAULT_RESTORE_MAX_AGE_MS, DEFAULT_STORAGE_PREFIX,
};
use crate::domains::DEFAULT_TTL_MS;

/// Cache and inspector configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding persisted cache entries
    pub storage_dir: PathBuf,
    /// Prefix of every persisted storage key
    pub storage_prefix: String,
    /// Namespaces written through to durable storage
    pub persisted_namespaces: Vec<String>,
    /// Persisted entries at least this old are dropped on restore
    pub restore_max_age_ms: u64,
    /// TTL for inspector reads of namespaces outside the catalog
    pub default_ttl_ms: u64,
    /// Inspector bind address
    pub server_host: IpAddr,
    /// Inspector port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_STORAGE_DIR` - Persistence directory (default: platform cache dir)
    /// - `CACHE_STORAGE_PREFIX` - Storage key prefix (default: `sc_cache_`)
    /// - `CACHE_PERSISTED_NAMESPACES` - Comma-separated allow-list
    ///   (default: `conversations,groups,notifications`)
    /// - `CACHE_RESTORE_MAX_AGE_MS` - Restore ceiling (default: 1800000)
    /// - `CACHE_DEFAULT_TTL_MS` - Fallback read TTL (default: 300000)
    /// - `SERVER_HOST` - Inspector bind address (default: 127.0.0.1)
    /// - `SERVER_PORT` - Inspector port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            storage_dir: env::var("CACHE_STORAGE_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            storage_prefix: env::var("CACHE_STORAGE_PREFIX")
                .ok()
                .unwrap_or(defaults.storage_prefix),
            persisted_namespaces: env::var("CACHE_PERSISTED_NAMESPACES")
                .ok()
                .map(|v| parse_list(&v))
                .unwrap_or(defaults.persisted_namespaces),
            restore_max_age_ms: env::var("CACHE_RESTORE_MAX_AGE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.restore_max_age_ms),
            default_ttl_ms: env::var("CACHE_DEFAULT_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl_ms),
            server_host: env::var("SERVER_HOST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_host),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
        }
    }

    /// Persistence settings for the cache store.
    pub fn persistence(&self) -> Persistence {
        Persistence {
            storage_prefix: self.storage_prefix.clone(),
            namespaces: self.persisted_namespaces.clone(),
            max_age_ms: self.restore_max_age_ms,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            persisted_namespaces: DEFAULT_PERSISTED_NAMESPACES
                .iter()
                .map(|ns| ns.to_string())
                .collect(),
            restore_max_age_ms: DEFAULT_RESTORE_MAX_AGE_MS,
            default_ttl_ms: DEFAULT_TTL_MS,
            server_host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            server_port: 3000,
        }
    }
}

/// `~/.cache/startup_cache` on Linux, `.startup_cache` when no home directory exists.
fn default_storage_dir() -> PathBuf {
    ProjectDirs::from("", "", "startup_cache")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".startup_cache"))
}

/// Splits a comma-separated list, dropping blanks. An empty string disables persistence.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
