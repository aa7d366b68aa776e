//! Mapper configuration.
//!
//! Read from the `[graphql]` section of the host application's TOML file.
//! Limits live in their own table and caching is off unless a `[cache]`
//! table is present.
//!
//! # Example Configuration
//!
//! ```toml
//! [graphql]
//! enabled = true
//! introspection = true
//!
//! [graphql.limits]
//! max_depth = 15
//! max_complexity = 500
//!
//! [graphql.cache]
//! key = "graphql-mapper:mapping"
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::{DEFAULT_CACHE_KEY, MemoryCache};
use crate::error::SchemaError;
use crate::loader::Loader;
use crate::schema::{LazySchema, SchemaFactory, SchemaFactoryConfig};

/// Schema mapper configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Build the schema at all. A disabled mapper yields no factory.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    /// Answer introspection queries.
    #[serde(default = "enabled_by_default")]
    pub introspection: bool,

    #[serde(default)]
    pub limits: QueryLimits,

    /// Mapping cache; absent means every build reloads.
    #[serde(default)]
    pub cache: Option<MappingCacheConfig>,
}

/// Per-query execution limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryLimits {
    pub max_depth: usize,
    pub max_complexity: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        let defaults = SchemaFactoryConfig::default();
        Self {
            max_depth: defaults.max_depth,
            max_complexity: defaults.max_complexity,
        }
    }
}

/// Where the prepared mapping is cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingCacheConfig {
    #[serde(default = "default_cache_key")]
    pub key: String,
}

impl Default for MappingCacheConfig {
    fn default() -> Self {
        Self {
            key: default_cache_key(),
        }
    }
}

fn enabled_by_default() -> bool {
    true
}

fn default_cache_key() -> String {
    DEFAULT_CACHE_KEY.to_string()
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            introspection: true,
            limits: QueryLimits::default(),
            cache: None,
        }
    }
}

impl MapperConfig {
    /// Checks limits and the cache key.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidConfig`] naming the offending setting.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let invalid = |key: &str, reason: &str| SchemaError::InvalidConfig {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        if self.limits.max_depth == 0 {
            return Err(invalid("graphql.limits.max_depth", "must be > 0"));
        }
        if self.limits.max_complexity == 0 {
            return Err(invalid("graphql.limits.max_complexity", "must be > 0"));
        }
        if let Some(cache) = &self.cache
            && cache.key.trim().is_empty()
        {
            return Err(invalid("graphql.cache.key", "must not be blank"));
        }
        Ok(())
    }

    #[must_use]
    pub fn factory_config(&self) -> SchemaFactoryConfig {
        SchemaFactoryConfig {
            max_depth: self.limits.max_depth,
            max_complexity: self.limits.max_complexity,
            introspection_enabled: self.introspection,
        }
    }

    /// Creates the configured factory over `loader`.
    ///
    /// Returns `Ok(None)` when the mapper is disabled; the loader is never
    /// consulted in that case.
    ///
    /// # Errors
    ///
    /// Fails when [`validate`](Self::validate) does.
    pub fn factory(&self, loader: impl Loader + 'static) -> Result<Option<SchemaFactory>, SchemaError> {
        if !self.enabled {
            info!("GraphQL mapper disabled, no schema will be built");
            return Ok(None);
        }
        self.validate()?;

        let factory = SchemaFactory::new(loader, self.factory_config());
        Ok(Some(match &self.cache {
            Some(cache) => factory.with_cache(MemoryCache::new(cache.key.clone())),
            None => factory,
        }))
    }

    /// Like [`factory`](Self::factory), wrapped for lazy first-request builds.
    ///
    /// # Errors
    ///
    /// Fails when [`validate`](Self::validate) does.
    pub fn lazy_schema(&self, loader: impl Loader + 'static) -> Result<Option<LazySchema>, SchemaError> {
        Ok(self.factory(loader)?.map(LazySchema::new))
    }
}
