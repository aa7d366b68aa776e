//! Lazy schema holder.
//!
//! `LazySchema` defers the factory build until first access and keeps the
//! result for later callers. `invalidate()` drops it so the next access
//! rebuilds, e.g. after the mapping source changed.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use super::factory::{ExecutableSchema, SchemaFactory};
use crate::error::SchemaError;

/// State of the lazy schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    /// Schema has not been built yet.
    Uninitialized,
    /// Schema is currently being built.
    Building,
    /// Schema is ready for use.
    Ready,
    /// Schema build failed.
    Failed,
}

/// Thread-safe lazy schema holder.
///
/// # Example
///
/// ```ignore
/// let lazy = LazySchema::new(factory);
///
/// // First access triggers build
/// let schema = lazy.get_or_build().await?;
///
/// // Force rebuild on next access
/// lazy.invalidate().await;
/// ```
pub struct LazySchema {
    schema: RwLock<Option<Arc<ExecutableSchema>>>,

    /// Only one build at a time.
    build_lock: Mutex<()>,

    state: RwLock<SchemaState>,

    factory: Arc<SchemaFactory>,

    /// Last build error message, for diagnostics.
    last_error: RwLock<Option<String>>,
}

impl LazySchema {
    #[must_use]
    pub fn new(factory: SchemaFactory) -> Self {
        Self::from_shared(Arc::new(factory))
    }

    #[must_use]
    pub fn from_shared(factory: Arc<SchemaFactory>) -> Self {
        Self {
            schema: RwLock::new(None),
            build_lock: Mutex::new(()),
            state: RwLock::new(SchemaState::Uninitialized),
            factory,
            last_error: RwLock::new(None),
        }
    }

    pub async fn state(&self) -> SchemaState {
        *self.state.read().await
    }

    /// Gets the schema, building it if necessary.
    ///
    /// Concurrent callers get an error instead of waiting while a build is
    /// in progress; use [`LazySchema::get_or_build_wait`] to wait.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Initializing` if another build is in progress.
    /// Returns `SchemaError::BuildFailed` if the build fails.
    pub async fn get_or_build(&self) -> Result<Arc<ExecutableSchema>, SchemaError> {
        if let Some(schema) = self.get().await {
            return Ok(schema);
        }

        if *self.state.read().await == SchemaState::Building {
            return Err(SchemaError::Initializing);
        }

        let Ok(_guard) = self.build_lock.try_lock() else {
            return Err(SchemaError::Initializing);
        };

        if let Some(schema) = self.get().await {
            return Ok(schema);
        }

        self.build().await
    }

    /// Gets the schema, waiting for an in-progress build to complete.
    ///
    /// A previous failure is reported again without rebuilding; call
    /// [`LazySchema::invalidate`] to retry.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::BuildFailed` if the build fails.
    pub async fn get_or_build_wait(&self) -> Result<Arc<ExecutableSchema>, SchemaError> {
        if let Some(schema) = self.get().await {
            return Ok(schema);
        }

        let _guard = self.build_lock.lock().await;

        if let Some(schema) = self.get().await {
            return Ok(schema);
        }

        if *self.state.read().await == SchemaState::Failed
            && let Some(err) = self.last_error.read().await.as_ref()
        {
            return Err(SchemaError::BuildFailed(err.clone()));
        }

        self.build().await
    }

    /// Must be called with `build_lock` held.
    async fn build(&self) -> Result<Arc<ExecutableSchema>, SchemaError> {
        *self.state.write().await = SchemaState::Building;
        info!("Building GraphQL schema...");

        let factory = Arc::clone(&self.factory);
        let result = tokio::task::spawn_blocking(move || factory.create_schema())
            .await
            .map_err(|e| SchemaError::BuildFailed(e.to_string()))
            .and_then(|built| built);

        match result {
            Ok(schema) => {
                let schema = Arc::new(schema);
                *self.schema.write().await = Some(Arc::clone(&schema));
                *self.state.write().await = SchemaState::Ready;
                *self.last_error.write().await = None;
                info!("GraphQL schema built successfully");
                Ok(schema)
            }
            Err(e) => {
                let error_msg = e.to_string();
                warn!(error = %error_msg, "Failed to build GraphQL schema");
                *self.state.write().await = SchemaState::Failed;
                *self.last_error.write().await = Some(error_msg.clone());
                Err(SchemaError::BuildFailed(error_msg))
            }
        }
    }

    /// Gets the schema if it is already built, without triggering a build.
    pub async fn get(&self) -> Option<Arc<ExecutableSchema>> {
        self.schema.read().await.clone()
    }

    /// Drops the cached schema so the next access rebuilds it.
    ///
    /// The factory's cache driver is not cleared; clear it as well to force
    /// a fresh load of the mapping.
    pub async fn invalidate(&self) {
        let _guard = self.build_lock.lock().await;

        *self.schema.write().await = None;
        *self.state.write().await = SchemaState::Uninitialized;
        *self.last_error.write().await = None;

        info!("GraphQL schema invalidated - will rebuild on next access");
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    pub async fn is_ready(&self) -> bool {
        *self.state.read().await == SchemaState::Ready
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::LoadError;
    use crate::mapping::{Field, SchemaContainer, Type};
    use crate::schema::SchemaFactoryConfig;

    fn counting_factory(calls: Arc<AtomicUsize>) -> SchemaFactory {
        let loader = move |container: &mut SchemaContainer| -> Result<(), LoadError> {
            calls.fetch_add(1, Ordering::SeqCst);
            container.set_query_schema(
                Type::object("Query").field(Field::new("hello").with_type("String")),
            );
            Ok(())
        };
        SchemaFactory::new(loader, SchemaFactoryConfig::default())
    }

    #[tokio::test]
    async fn test_builds_once_and_reuses() {
        let calls = Arc::new(AtomicUsize::new(0));
        let lazy = LazySchema::new(counting_factory(Arc::clone(&calls)));
        assert_eq!(lazy.state().await, SchemaState::Uninitialized);
        assert!(lazy.get().await.is_none());

        let first = lazy.get_or_build().await.unwrap();
        let second = lazy.get_or_build_wait().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(lazy.is_ready().await);
    }

    #[tokio::test]
    async fn test_invalidate_triggers_rebuild() {
        let calls = Arc::new(AtomicUsize::new(0));
        let lazy = LazySchema::new(counting_factory(Arc::clone(&calls)));

        lazy.get_or_build().await.unwrap();
        lazy.invalidate().await;
        assert_eq!(lazy.state().await, SchemaState::Uninitialized);

        lazy.get_or_build().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_is_recorded() {
        let loader = |_: &mut SchemaContainer| -> Result<(), LoadError> {
            Err(LoadError::Malformed {
                source_name: "mapping".into(),
                reason: "empty document".into(),
            })
        };
        let lazy = LazySchema::new(SchemaFactory::new(loader, SchemaFactoryConfig::default()));

        let err = lazy.get_or_build().await.unwrap_err();
        assert!(matches!(err, SchemaError::BuildFailed(_)));
        assert_eq!(lazy.state().await, SchemaState::Failed);
        assert!(lazy.last_error().await.unwrap().contains("empty document"));

        assert!(matches!(
            lazy.get_or_build_wait().await,
            Err(SchemaError::BuildFailed(_))
        ));
    }
}
