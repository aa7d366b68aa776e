//! Interface dispatch by domain model identity.
//!
//! An interface's implementers are recorded as `(type name, model)` pairs in
//! linkage order. At execution time a concrete instance is tested against
//! each model in that order and the first match decides the concrete type.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use async_graphql::Value;
use async_graphql::dynamic::FieldValue;
use indexmap::IndexMap;

use super::registry::{MaterializedType, RegistryInner, TypeRegistry};
use crate::error::SchemaError;

/// A runtime value that knows which domain model it is.
pub trait ModelInstance: Send + Sync {
    /// Stable identifier of the concrete model.
    fn model(&self) -> &str;

    /// Whether this instance counts as an instance of `model`.
    ///
    /// Defaults to identity; override to let a subtype match its parents.
    fn is_instance_of(&self, model: &str) -> bool {
        self.model() == model
    }

    /// Reads a property for the default field resolver.
    fn property(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Reads a single related instance, consulted when no property matches.
    fn relation(&self, _name: &str) -> Option<ModelRef> {
        None
    }

    /// Reads a list of related instances, consulted last.
    fn relations(&self, _name: &str) -> Option<Vec<ModelRef>> {
        None
    }
}

/// Shared handle to a model instance, as stored in resolver output.
pub type ModelRef = Arc<dyn ModelInstance>;

/// Maps model instances to the concrete type implementing an interface.
#[derive(Debug, Clone)]
pub struct InterfaceDispatcher {
    interface: String,
    mapping: Arc<Vec<(String, String)>>,
    registry: Weak<RegistryInner>,
}

impl InterfaceDispatcher {
    /// Builds a dispatcher from an interface's `type name -> model` mapping.
    pub fn new(
        interface: impl Into<String>,
        mapping: &IndexMap<String, String>,
        registry: &TypeRegistry,
    ) -> Self {
        Self {
            interface: interface.into(),
            mapping: Arc::new(
                mapping
                    .iter()
                    .map(|(type_name, model)| (type_name.clone(), model.clone()))
                    .collect(),
            ),
            registry: registry.downgrade(),
        }
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Name of the first mapped type whose model matches `instance`.
    pub fn type_name_for(&self, instance: &dyn ModelInstance) -> Option<&str> {
        self.mapping
            .iter()
            .find(|(_, model)| instance.is_instance_of(model))
            .map(|(type_name, _)| type_name.as_str())
    }

    /// Resolves `instance` to its materialized concrete type.
    ///
    /// Returns `Ok(None)` when no mapped model matches; the runtime treats
    /// that as an unresolved type.
    ///
    /// # Errors
    ///
    /// Fails if the matched type is missing from the registry.
    pub fn resolve(
        &self,
        instance: &dyn ModelInstance,
    ) -> Result<Option<Arc<MaterializedType>>, SchemaError> {
        let Some(type_name) = self.type_name_for(instance) else {
            return Ok(None);
        };
        let registry = self
            .registry
            .upgrade()
            .ok_or_else(|| SchemaError::RegistryReleased(type_name.to_string()))?;
        registry.get(type_name).map(Some)
    }

    /// Wraps `instance` as resolver output tagged with its concrete type.
    pub fn dispatch<'a>(&self, instance: ModelRef) -> Option<FieldValue<'a>> {
        let type_name = self.type_name_for(instance.as_ref())?.to_string();
        Some(FieldValue::owned_any(instance).with_type(type_name))
    }
}

/// Every interface dispatcher of one schema, keyed by interface name.
///
/// Registered as schema data so resolvers can reach it through
/// `ctx.data::<InterfaceDispatchers>()`.
#[derive(Debug, Clone, Default)]
pub struct InterfaceDispatchers(Arc<HashMap<String, InterfaceDispatcher>>);

impl InterfaceDispatchers {
    pub(crate) fn new(dispatchers: HashMap<String, InterfaceDispatcher>) -> Self {
        Self(Arc::new(dispatchers))
    }

    pub fn get(&self, interface: &str) -> Option<&InterfaceDispatcher> {
        self.0.get(interface)
    }

    /// Dispatches `instance` through the named interface.
    pub fn dispatch<'a>(&self, interface: &str, instance: ModelRef) -> Option<FieldValue<'a>> {
        self.get(interface)?.dispatch(instance)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
