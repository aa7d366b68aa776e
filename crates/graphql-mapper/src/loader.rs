//! Loader collaborator contract.

use crate::error::LoadError;
use crate::mapping::SchemaContainer;

/// Populates an empty container from some external mapping source.
pub trait Loader: Send + Sync {
    /// # Errors
    ///
    /// Returns [`LoadError`] when the source is malformed or unreachable;
    /// the factory propagates it unchanged.
    fn load(&self, container: &mut SchemaContainer) -> Result<(), LoadError>;
}

impl<F> Loader for F
where
    F: Fn(&mut SchemaContainer) -> Result<(), LoadError> + Send + Sync,
{
    fn load(&self, container: &mut SchemaContainer) -> Result<(), LoadError> {
        self(container)
    }
}

/// Loader that copies a prebuilt container's declarations.
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    mapping: SchemaContainer,
}

impl StaticLoader {
    #[must_use]
    pub fn new(mapping: SchemaContainer) -> Self {
        Self { mapping }
    }
}

impl Loader for StaticLoader {
    fn load(&self, container: &mut SchemaContainer) -> Result<(), LoadError> {
        for interface in self.mapping.interfaces() {
            container.add_interface(interface.clone())?;
        }
        for ty in self.mapping.types() {
            container.add_type(ty.clone())?;
        }
        if let Some(query) = self.mapping.query_schema() {
            container.set_query_schema(query.clone());
        }
        if let Some(mutation) = self.mapping.mutation_schema() {
            container.set_mutation_schema(mutation.clone());
        }
        Ok(())
    }
}
