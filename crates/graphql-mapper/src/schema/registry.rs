//! Type registry with deferred, cycle-safe type references.
//!
//! Fields never hold their target type directly. They hold a
//! [`DeferredType`] that captures the registry and the reference string and
//! only performs the lookup when the schema is assembled, after every
//! declared type has been registered. That is what lets `Post.author: User`
//! be declared before `User` exists, and `User.posts: [Post]` point back.
//!
//! Uses DashMap so the populated registry can be shared read-only across
//! concurrent query executions.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use async_graphql::dynamic::TypeRef;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::trace;

use super::dispatch::InterfaceDispatcher;
use super::type_ref::TypeReference;
use crate::error::SchemaError;
use crate::mapping::{EnumValue, Field};

/// Names of the scalars every GraphQL runtime provides.
pub const BUILTIN_SCALARS: [&str; 5] = [
    TypeRef::STRING,
    TypeRef::INT,
    TypeRef::FLOAT,
    TypeRef::BOOLEAN,
    TypeRef::ID,
];

/// The executable kind a registered type materialized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Scalar,
    Object,
    Enum,
    Interface,
}

/// A type after field preparation, ready to be handed to the runtime.
#[derive(Debug)]
pub struct MaterializedType {
    pub(crate) name: String,
    pub(crate) kind: TypeKind,
    pub(crate) description: Option<String>,
    pub(crate) fields: Vec<Field>,
    pub(crate) interfaces: Vec<Arc<MaterializedType>>,
    pub(crate) values: Vec<EnumValue>,
    pub(crate) dispatcher: Option<InterfaceDispatcher>,
}

impl MaterializedType {
    pub(crate) fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            fields: Vec::new(),
            interfaces: Vec::new(),
            values: Vec::new(),
            dispatcher: None,
        }
    }

    /// A custom scalar.
    #[must_use]
    pub fn scalar(name: impl Into<String>, description: Option<String>) -> Self {
        let mut scalar = Self::new(name, TypeKind::Scalar);
        scalar.description = description;
        scalar
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Prepared fields, each carrying its resolver and deferred type.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Materialized interfaces this type implements.
    pub fn interfaces(&self) -> &[Arc<MaterializedType>] {
        &self.interfaces
    }

    pub fn values(&self) -> &[EnumValue] {
        &self.values
    }

    /// Model dispatcher of an interface with at least one modeled implementer.
    pub fn dispatcher(&self) -> Option<&InterfaceDispatcher> {
        self.dispatcher.as_ref()
    }

    pub fn is_builtin(&self) -> bool {
        self.kind == TypeKind::Scalar && BUILTIN_SCALARS.contains(&self.name.as_str())
    }
}

#[derive(Debug, Default)]
pub(crate) struct RegistryInner {
    types: DashMap<String, (usize, Arc<MaterializedType>)>,
    sequence: AtomicUsize,
}

impl RegistryInner {
    pub(crate) fn get(&self, name: &str) -> Result<Arc<MaterializedType>, SchemaError> {
        self.types
            .get(name)
            .map(|entry| Arc::clone(&entry.value().1))
            .ok_or_else(|| SchemaError::TypeNotFound(name.to_string()))
    }
}

/// Registry of materialized types, keyed by name.
///
/// One registry serves exactly one build; a fresh registry always starts
/// with the built-in scalars only.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    inner: Arc<RegistryInner>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates a registry holding the built-in scalars.
    #[must_use]
    pub fn new() -> Self {
        let registry = Self {
            inner: Arc::new(RegistryInner::default()),
        };
        for name in BUILTIN_SCALARS {
            registry.insert(MaterializedType::scalar(name, None));
        }
        registry
    }

    fn insert(&self, ty: MaterializedType) -> bool {
        match self.inner.types.entry(ty.name.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                let seq = self.inner.sequence.fetch_add(1, Ordering::Relaxed);
                slot.insert((seq, Arc::new(ty)));
                true
            }
        }
    }

    /// Registers a materialized type under its own name.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::AlreadyRegistered`] if the name is taken.
    pub fn add_type(&self, ty: MaterializedType) -> Result<(), SchemaError> {
        let name = ty.name.clone();
        if !self.insert(ty) {
            return Err(SchemaError::AlreadyRegistered(name));
        }
        trace!(type_name = %name, "Registered type");
        Ok(())
    }

    /// Looks up a type that must already be registered.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::TypeNotFound`] for unknown names.
    pub fn get_type(&self, name: &str) -> Result<Arc<MaterializedType>, SchemaError> {
        self.inner.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.types.contains_key(name)
    }

    /// Returns a deferred handle for `reference`; the lookup happens on
    /// [`DeferredType::resolve`].
    ///
    /// # Errors
    ///
    /// Fails only if the reference string itself is malformed.
    pub fn resolve_type(&self, reference: &str) -> Result<DeferredType, SchemaError> {
        Ok(DeferredType {
            registry: Arc::downgrade(&self.inner),
            reference: reference.parse()?,
        })
    }

    /// All registered types in registration order.
    pub fn types(&self) -> Vec<Arc<MaterializedType>> {
        let mut entries: Vec<_> = self
            .inner
            .types
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, ty)| ty).collect()
    }

    /// Registered types other than the built-in scalars.
    pub fn declared_types(&self) -> Vec<Arc<MaterializedType>> {
        self.types().into_iter().filter(|t| !t.is_builtin()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.types.is_empty()
    }

    pub(crate) fn downgrade(&self) -> Weak<RegistryInner> {
        Arc::downgrade(&self.inner)
    }
}

/// A type reference whose target is looked up only when dereferenced.
///
/// Holds a weak handle so that registry -> type -> field -> reference does
/// not keep the registry alive.
#[derive(Debug, Clone)]
pub struct DeferredType {
    registry: Weak<RegistryInner>,
    reference: TypeReference,
}

impl DeferredType {
    pub fn reference(&self) -> &TypeReference {
        &self.reference
    }

    /// Looks up the named type and returns the wrapped runtime reference.
    ///
    /// Idempotent; only reads the registry.
    ///
    /// # Errors
    ///
    /// Fails if the target was never registered or the registry is gone.
    pub fn resolve(&self) -> Result<TypeRef, SchemaError> {
        self.target()?;
        Ok(self.reference.to_type_ref())
    }

    /// The materialized named type behind the wrappers.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub fn target(&self) -> Result<Arc<MaterializedType>, SchemaError> {
        let name = self.reference.named_type();
        let registry = self
            .registry
            .upgrade()
            .ok_or_else(|| SchemaError::RegistryReleased(name.to_string()))?;
        registry.get(name)
    }
}
