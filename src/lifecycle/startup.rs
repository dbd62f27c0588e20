//! Startup orchestration.
//!
//! # Responsibilities
//! - Wire the config-declared routes into a registrant collection
//! - Put the route and trie caches in front of them in production
//! - Hand back a `TrieProvider` ready for first use
//!
//! # Design Decisions
//! - Outside production no cache is read or written
//! - Extra registrants are appended after the config routes

use crate::cache::{CacheError, FileCacheStore, RouteCache, TrieCache};
use crate::config::{Environment, RouterConfig, RoutingConfig};
use crate::routing::{ConfigRouteRegistrant, RouteRegistrantCollection, TrieProvider};

/// The file-backed caches named in the routing config.
#[derive(Debug, Clone)]
pub struct Caches {
    pub trie: TrieCache,
    pub routes: RouteCache,
}

impl Caches {
    pub fn from_config(routing: &RoutingConfig) -> Self {
        Self {
            trie: TrieCache::new(FileCacheStore::new(&routing.trie_cache_path)),
            routes: RouteCache::new(FileCacheStore::new(&routing.route_cache_path)),
        }
    }

    /// Removes both cached artifacts.
    pub fn flush(&self) -> Result<(), CacheError> {
        self.routes.flush()?;
        self.trie.flush()?;
        tracing::info!("Route caches flushed");
        Ok(())
    }
}

/// Builds the provider for `config`.
///
/// `extra` registrants run after the routes declared in the config file.
pub fn bootstrap(
    config: &RouterConfig,
    environment: Environment,
    extra: RouteRegistrantCollection,
) -> TrieProvider {
    let mut registrants = RouteRegistrantCollection::new();
    registrants.add(ConfigRouteRegistrant::new(config.routes.clone()));
    registrants.add(extra);

    tracing::info!(
        environment = %environment,
        config_routes = config.routes.len(),
        "Routing bootstrap"
    );

    if environment.is_production() {
        let caches = Caches::from_config(&config.routing);
        TrieProvider::new(registrants.with_route_cache(caches.routes), Some(caches.trie))
    } else {
        TrieProvider::new(registrants, None)
    }
}
