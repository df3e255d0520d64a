//! Request DTOs for the cache inspector API
//!
//! Defines how incoming query strings map onto cache lookups.

use std::collections::HashMap;

use crate::cache::CacheParams;
use crate::error::{CacheError, Result};

/// Query parameter reserved for the read TTL; every other parameter is a
/// cache key parameter.
pub const TTL_PARAM: &str = "ttl";

/// Parsed query string for `GET /entries/:namespace`.
///
/// # Fields
/// - `ttl`: Optional read TTL in milliseconds
/// - `params`: Remaining query parameters, used to derive the cache key
#[derive(Debug, Clone, PartialEq)]
pub struct EntryQuery {
    pub ttl: Option<u64>,
    pub params: CacheParams,
}

impl EntryQuery {
    /// Splits raw query pairs into TTL and key parameters.
    ///
    /// Returns an error if `ttl` is present but not a non-negative integer.
    pub fn from_pairs(mut pairs: HashMap<String, String>) -> Result<Self> {
        let ttl = match pairs.remove(TTL_PARAM) {
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
                CacheError::InvalidRequest(format!("ttl must be milliseconds, got '{}'", raw))
            })?),
            None => None,
        };

        Ok(Self {
            ttl,
            params: pairs.into_iter().collect(),
        })
    }
}
