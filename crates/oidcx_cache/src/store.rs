use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::entry::CacheEntry;

/// Key → current entry, behind one reader-writer lock.
///
/// The lock is only ever held for the map access itself.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    inner: RwLock<HashMap<String, Arc<CacheEntry>>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<CacheEntry>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Last writer wins; the previous entry, if any, is returned.
    pub fn insert(&self, key: String, entry: Arc<CacheEntry>) -> Option<Arc<CacheEntry>> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entry)
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
