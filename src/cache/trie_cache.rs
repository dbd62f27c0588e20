//! Persistence of the compiled trie.

use std::sync::Arc;

use crate::cache::{read_json, write_json, CacheError, CacheStore};
use crate::routing::CompiledTrie;

/// Fetches and stores the compiled trie through a `CacheStore`.
#[derive(Debug, Clone)]
pub struct TrieCache {
    store: Arc<dyn CacheStore>,
}

impl TrieCache {
    pub fn new(store: impl CacheStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Returns the cached trie, or `None` when absent or unreadable.
    pub fn fetch(&self) -> Option<CompiledTrie> {
        match self.try_fetch() {
            Ok(trie) => trie,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable trie cache");
                None
            }
        }
    }

    fn try_fetch(&self) -> Result<Option<CompiledTrie>, CacheError> {
        let Some(trie) = read_json::<CompiledTrie>(self.store.as_ref())? else {
            return Ok(None);
        };
        trie.check_integrity().map_err(CacheError::Corrupt)?;
        Ok(Some(trie))
    }

    pub fn store(&self, trie: &CompiledTrie) -> Result<(), CacheError> {
        write_json(self.store.as_ref(), trie)
    }

    pub fn has(&self) -> bool {
        self.fetch().is_some()
    }

    pub fn flush(&self) -> Result<(), CacheError> {
        self.store.flush()
    }
}
