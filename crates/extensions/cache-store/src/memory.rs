//! In-process cache store.

use std::num::NonZeroUsize;

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;

use focusflow_protocols::cache::{CacheKey, CacheStore, EvictionPolicy};
use focusflow_protocols::error::CacheError;

/// Volatile cache kept in an [`LruCache`]. Contents die with the process.
pub struct MemoryCacheStore {
    entries: Mutex<LruCache<String, String>>,
    policy: EvictionPolicy,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::with_policy(EvictionPolicy::Unbounded)
    }

    pub fn with_policy(policy: EvictionPolicy) -> Self {
        let entries = match policy.max_entries().and_then(NonZeroUsize::new) {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };
        Self {
            entries: Mutex::new(entries),
            policy,
        }
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    fn id(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        Ok(self.entries.lock().get(key.as_str()).cloned())
    }

    async fn put(&self, key: &CacheKey, text: &str) -> Result<(), CacheError> {
        self.entries
            .lock()
            .put(key.as_str().to_string(), text.to_string());
        Ok(())
    }

    async fn contains(&self, key: &CacheKey) -> Result<bool, CacheError> {
        Ok(self.entries.lock().contains(key.as_str()))
    }

    async fn len(&self) -> Result<usize, CacheError> {
        Ok(self.entries.lock().len())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.entries.lock().clear();
        Ok(())
    }
}
