//! Cache collaborator contract and an in-memory implementation.
//!
//! A cache stores the fully linked container. A miss (`Ok(None)`) is
//! distinct from a cached empty container.

use std::sync::Arc;

use dashmap::DashMap;

use crate::error::CacheError;
use crate::mapping::SchemaContainer;

/// Default cache key for the mapping container.
pub const DEFAULT_CACHE_KEY: &str = "graphql-mapper:mapping";

/// Opaque persistence of a linked [`SchemaContainer`].
///
/// The cache key is part of the driver's own configuration.
pub trait CacheDriver: Send + Sync {
    /// Returns the cached container, or `None` on a miss.
    ///
    /// # Errors
    ///
    /// Backend failures; the factory treats them as a miss.
    fn load(&self) -> Result<Option<SchemaContainer>, CacheError>;

    /// # Errors
    ///
    /// Backend failures; the factory logs them and carries on.
    fn save(&self, container: &SchemaContainer) -> Result<(), CacheError>;
}

/// Process-local cache keyed by name; clones share one store.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    key: String,
    store: Arc<DashMap<String, SchemaContainer>>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_KEY)
    }
}

impl MemoryCache {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_store(key, Arc::new(DashMap::new()))
    }

    /// Cache entry `key` inside a store shared with other caches.
    #[must_use]
    pub fn with_store(key: impl Into<String>, store: Arc<DashMap<String, SchemaContainer>>) -> Self {
        Self {
            key: key.into(),
            store,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Drops the cached entry.
    pub fn clear(&self) {
        self.store.remove(&self.key);
    }
}

impl CacheDriver for MemoryCache {
    fn load(&self) -> Result<Option<SchemaContainer>, CacheError> {
        Ok(self.store.get(&self.key).map(|entry| entry.value().clone()))
    }

    fn save(&self, container: &SchemaContainer) -> Result<(), CacheError> {
        self.store.insert(self.key.clone(), container.clone());
        Ok(())
    }
}
