//! Compiled-artifact caching subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (production only):
//!     route_cache.rs  → fetch RouteDescriptor[]  (hit: skip registrants)
//!     trie_cache.rs   → fetch CompiledTrie       (hit: skip the build)
//!
//! After a fresh build:
//!     serialize → CacheStore::store (failure is logged, never fatal)
//! ```
//!
//! # Design Decisions
//! - One slot per artifact; staleness is the operator's responsibility
//! - Unreadable or corrupt artifacts are treated as absent
//! - The byte format is internal and not stable across versions

pub mod route_cache;
pub mod store;
pub mod trie_cache;

pub use route_cache::RouteCache;
pub use store::{FileCacheStore, MemoryCacheStore};
pub use trie_cache::TrieCache;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors at the cache boundary. All of them are recoverable.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cached artifact is corrupt: {0}")]
    Corrupt(String),
}

/// Byte-level persistence for one cached artifact.
pub trait CacheStore: Send + Sync + std::fmt::Debug {
    /// Returns the stored bytes, or `None` if nothing has been stored.
    fn fetch(&self) -> Result<Option<Vec<u8>>, CacheError>;

    fn store(&self, bytes: &[u8]) -> Result<(), CacheError>;

    /// Removes the stored artifact, if any.
    fn flush(&self) -> Result<(), CacheError>;
}

fn read_json<T: DeserializeOwned>(store: &dyn CacheStore) -> Result<Option<T>, CacheError> {
    match store.fetch()? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

fn write_json<T: Serialize + ?Sized>(store: &dyn CacheStore, value: &T) -> Result<(), CacheError> {
    let bytes = serde_json::to_vec(value)?;
    store.store(&bytes)
}
