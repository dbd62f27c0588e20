//! Lazily built, memoized routing table.
//!
//! # Lifecycle
//! ```text
//! TrieProvider::new(registrants, trie_cache)
//!     first matcher()/uri_factory() call:
//!         trie cache hit  → use cached trie
//!         trie cache miss → run registrants → build → store in cache
//!     every later call → same Arc<CompiledTrie>
//! ```
//!
//! # Design Decisions
//! - Double-checked initialization: lock-free fast path via `OnceLock`,
//!   a mutex serializes the one build
//! - Registrants are dropped after a successful build
//! - A failed build is not memoized; the error surfaces to the caller

use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::cache::TrieCache;
use crate::routing::error::BuildError;
use crate::routing::matcher::RouteMatcher;
use crate::routing::registrant::RouteRegistrantCollection;
use crate::routing::registry::RouteRegistry;
use crate::routing::trie::CompiledTrie;
use crate::routing::uri::RouteUriFactory;

/// Builds the trie on first use and hands out matchers over it.
#[derive(Debug)]
pub struct TrieProvider {
    registrants: Mutex<Option<RouteRegistrantCollection>>,
    trie_cache: Option<TrieCache>,
    trie: OnceLock<Arc<CompiledTrie>>,
}

impl TrieProvider {
    /// All registrants must already be in the collection.
    pub fn new(registrants: RouteRegistrantCollection, trie_cache: Option<TrieCache>) -> Self {
        Self {
            registrants: Mutex::new(Some(registrants)),
            trie_cache,
            trie: OnceLock::new(),
        }
    }

    /// Returns the compiled trie, building or loading it on the first call.
    pub fn trie(&self) -> Result<Arc<CompiledTrie>, BuildError> {
        if let Some(trie) = self.trie.get() {
            return Ok(trie.clone());
        }

        let mut registrants = self.registrants.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(trie) = self.trie.get() {
            return Ok(trie.clone());
        }

        let trie = match self.trie_cache.as_ref().and_then(TrieCache::fetch) {
            Some(cached) => {
                tracing::info!(routes = cached.routes().len(), "Route trie loaded from cache");
                cached
            }
            None => {
                let mut registry = RouteRegistry::new();
                if let Some(registrants) = registrants.as_ref() {
                    registrants.register_routes(&mut registry);
                }
                let built = CompiledTrie::build(registry)?;
                if let Some(cache) = &self.trie_cache {
                    if let Err(e) = cache.store(&built) {
                        tracing::warn!(error = %e, "Failed to store trie cache");
                    }
                }
                built
            }
        };

        let trie = self.trie.get_or_init(|| Arc::new(trie)).clone();
        *registrants = None;
        Ok(trie)
    }

    pub fn matcher(&self) -> Result<RouteMatcher, BuildError> {
        self.trie().map(RouteMatcher::new)
    }

    pub fn uri_factory(&self) -> Result<RouteUriFactory, BuildError> {
        self.trie().map(RouteUriFactory::new)
    }
}
