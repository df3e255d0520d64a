//! Domain Catalog
//!
//! Namespaces used by the application's data stores and the TTL each one
//! reads with.

use std::sync::Arc;

use crate::cache::{CacheStore, NamespaceHandle};

/// TTL for namespaces missing from the catalog: 5 minutes.
pub const DEFAULT_TTL_MS: u64 = 5 * 60 * 1000;

const SECOND: u64 = 1000;
const MINUTE: u64 = 60 * SECOND;

/// A cached data domain: namespace and read TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    pub namespace: &'static str,
    pub ttl_ms: u64,
}

/// Every namespace the stores cache under.
pub const KNOWN: &[Domain] = &[
    Domain { namespace: "events", ttl_ms: 3 * MINUTE },
    Domain { namespace: "myEvents", ttl_ms: 3 * MINUTE },
    Domain { namespace: "posts", ttl_ms: 2 * MINUTE },
    Domain { namespace: "notifications", ttl_ms: 30 * SECOND },
    Domain { namespace: "autocomplete", ttl_ms: 2 * MINUTE },
    Domain { namespace: "offers", ttl_ms: 3 * MINUTE },
    Domain { namespace: "offerDetails", ttl_ms: 5 * MINUTE },
    Domain { namespace: "savedOffers", ttl_ms: 2 * MINUTE },
    Domain { namespace: "groups", ttl_ms: 5 * MINUTE },
    Domain { namespace: "groupMessages", ttl_ms: 2 * MINUTE },
    Domain { namespace: "myApplications", ttl_ms: 2 * MINUTE },
    Domain { namespace: "receivedApplications", ttl_ms: 2 * MINUTE },
    Domain { namespace: "startupSearch", ttl_ms: 5 * MINUTE },
    Domain { namespace: "startupDetails", ttl_ms: 5 * MINUTE },
    Domain { namespace: "startupMembers", ttl_ms: 3 * MINUTE },
    Domain { namespace: "startupsList", ttl_ms: 3 * MINUTE },
    Domain { namespace: "conversations", ttl_ms: 5 * MINUTE },
    Domain { namespace: "messages", ttl_ms: 2 * MINUTE },
    Domain { namespace: "group-search", ttl_ms: 2 * MINUTE },
    Domain { namespace: "user-search", ttl_ms: 3 * MINUTE },
];

/// Looks up a namespace in the catalog.
pub fn find(namespace: &str) -> Option<&'static Domain> {
    KNOWN.iter().find(|domain| domain.namespace == namespace)
}

/// TTL for `namespace`, falling back to [`DEFAULT_TTL_MS`].
pub fn ttl_for(namespace: &str) -> u64 {
    find(namespace).map_or(DEFAULT_TTL_MS, |domain| domain.ttl_ms)
}

/// Handle for `namespace` with its catalogued TTL.
pub fn handle(store: &Arc<CacheStore>, namespace: &str) -> NamespaceHandle {
    store.namespace(namespace, ttl_for(namespace))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_has_unique_namespaces() {
        let names: HashSet<_> = KNOWN.iter().map(|d| d.namespace).collect();
        assert_eq!(names.len(), KNOWN.len());
    }

    #[test]
    fn test_ttls_within_observed_range() {
        for domain in KNOWN {
            assert!(domain.ttl_ms >= 30 * SECOND, "{} too short", domain.namespace);
            assert!(domain.ttl_ms <= 5 * MINUTE, "{} too long", domain.namespace);
        }
    }

    #[test]
    fn test_ttl_lookup() {
        assert_eq!(ttl_for("notifications"), 30_000);
        assert_eq!(ttl_for("offers"), 180_000);
        assert_eq!(ttl_for("unknown"), DEFAULT_TTL_MS);
    }

    #[test]
    fn test_handle_carries_catalog_ttl() {
        let store = Arc::new(CacheStore::in_memory());
        let posts = handle(&store, "posts");

        assert_eq!(posts.namespace(), "posts");
        assert_eq!(posts.ttl_ms(), 120_000);
    }
}
