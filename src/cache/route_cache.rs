//! Persistence of registered route descriptors.

use std::sync::Arc;

use crate::cache::{read_json, write_json, CacheError, CacheStore};
use crate::routing::RouteDescriptor;

/// Caches the registry contents so registrants can be skipped on startup.
#[derive(Debug, Clone)]
pub struct RouteCache {
    store: Arc<dyn CacheStore>,
}

impl RouteCache {
    pub fn new(store: impl CacheStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Returns the cached routes, or `None` when absent or unreadable.
    pub fn fetch(&self) -> Option<Vec<RouteDescriptor>> {
        match read_json(self.store.as_ref()) {
            Ok(routes) => routes,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable route cache");
                None
            }
        }
    }

    pub fn store(&self, routes: &[RouteDescriptor]) -> Result<(), CacheError> {
        write_json(self.store.as_ref(), routes)
    }

    pub fn has(&self) -> bool {
        self.fetch().is_some()
    }

    pub fn flush(&self) -> Result<(), CacheError> {
        self.store.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheStore;
    use crate::routing::HandlerRef;

    #[test]
    fn test_routes_roundtrip_with_metadata() {
        let cache = RouteCache::new(MemoryCacheStore::new());
        let mut route = RouteDescriptor::new(["GET"], "/a", HandlerRef::new("a"));
        route.metadata.insert("roles".into(), serde_json::json!(["admin"]));

        cache.store(std::slice::from_ref(&route)).unwrap();
        assert!(cache.has());
        assert_eq!(cache.fetch().unwrap(), vec![route]);
    }

    #[test]
    fn test_corrupt_cache_is_absent() {
        let store = MemoryCacheStore::new();
        store.put_raw("[{\"path\": 3}]");
        assert!(RouteCache::new(store).fetch().is_none());
    }
}
