//! The mutable, pre-materialization model of a whole API surface.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{FieldContainer, InterfaceType, Type};
use crate::error::SchemaError;

/// All declared types and interfaces plus the query and mutation roots.
///
/// Types and interfaces live in separate namespaces; both preserve
/// declaration order, which is also the materialization order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaContainer {
    #[serde(default)]
    types: IndexMap<String, Type>,
    #[serde(default)]
    interfaces: IndexMap<String, InterfaceType>,
    #[serde(rename = "query", default, skip_serializing_if = "Option::is_none")]
    query_schema: Option<Type>,
    #[serde(rename = "mutation", default, skip_serializing_if = "Option::is_none")]
    mutation_schema: Option<Type>,
}

impl SchemaContainer {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an object or enum type.
    ///
    /// # Errors
    ///
    /// Fails on a blank name or a name already used by another type.
    pub fn add_type(&mut self, ty: Type) -> Result<(), SchemaError> {
        if ty.name.trim().is_empty() {
            return Err(SchemaError::BlankName { kind: "Type" });
        }
        if self.types.contains_key(&ty.name) {
            return Err(SchemaError::DuplicateType(ty.name));
        }
        self.types.insert(ty.name.clone(), ty);
        Ok(())
    }

    /// Declares an interface.
    ///
    /// # Errors
    ///
    /// Fails on a blank name or a name already used by another interface.
    pub fn add_interface(&mut self, interface: InterfaceType) -> Result<(), SchemaError> {
        if interface.name.trim().is_empty() {
            return Err(SchemaError::BlankName { kind: "Interface" });
        }
        if self.interfaces.contains_key(&interface.name) {
            return Err(SchemaError::DuplicateInterface(interface.name));
        }
        self.interfaces.insert(interface.name.clone(), interface);
        Ok(())
    }

    pub fn get_type(&self, name: &str) -> Option<&Type> {
        self.types.get(name)
    }

    pub fn get_type_mut(&mut self, name: &str) -> Option<&mut Type> {
        self.types.get_mut(name)
    }

    pub fn get_interface(&self, name: &str) -> Option<&InterfaceType> {
        self.interfaces.get(name)
    }

    pub fn get_interface_mut(&mut self, name: &str) -> Option<&mut InterfaceType> {
        self.interfaces.get_mut(name)
    }

    pub fn types(&self) -> impl Iterator<Item = &Type> {
        self.types.values()
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &InterfaceType> {
        self.interfaces.values()
    }

    /// Finds the first declared type mirroring `model`.
    pub fn type_for_model(&self, model: &str) -> Option<&Type> {
        self.types.values().find(|t| t.model.as_deref() == Some(model))
    }

    pub fn query_schema(&self) -> Option<&Type> {
        self.query_schema.as_ref()
    }

    pub fn set_query_schema(&mut self, query: Type) {
        self.query_schema = Some(query);
    }

    pub fn mutation_schema(&self) -> Option<&Type> {
        self.mutation_schema.as_ref()
    }

    pub fn set_mutation_schema(&mut self, mutation: Type) {
        self.mutation_schema = Some(mutation);
    }

    /// True when nothing at all has been declared.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
            && self.interfaces.is_empty()
            && self.query_schema.is_none()
            && self.mutation_schema.is_none()
    }

    /// Every field container: types, interfaces, query root, mutation root.
    pub fn field_containers(&self) -> impl Iterator<Item = &dyn FieldContainer> {
        let types = self.types.values().map(|t| t as &dyn FieldContainer);
        let interfaces = self.interfaces.values().map(|i| i as &dyn FieldContainer);
        let roots = self
            .query_schema
            .iter()
            .chain(self.mutation_schema.iter())
            .map(|t| t as &dyn FieldContainer);
        types.chain(interfaces).chain(roots)
    }

    /// Mutable counterpart of [`field_containers`](Self::field_containers),
    /// yielding containers in the same order.
    pub fn field_containers_mut(&mut self) -> impl Iterator<Item = &mut dyn FieldContainer> {
        let types = self.types.values_mut().map(|t| t as &mut dyn FieldContainer);
        let interfaces = self
            .interfaces
            .values_mut()
            .map(|i| i as &mut dyn FieldContainer);
        let roots = self
            .query_schema
            .iter_mut()
            .chain(self.mutation_schema.iter_mut())
            .map(|t| t as &mut dyn FieldContainer);
        types.chain(interfaces).chain(roots)
    }

    /// Splits the container into its parts for materialization.
    pub(crate) fn into_parts(self) -> ContainerParts {
        ContainerParts {
            types: self.types.into_values().collect(),
            interfaces: self.interfaces.into_values().collect(),
            query: self.query_schema,
            mutation: self.mutation_schema,
        }
    }
}

pub(crate) struct ContainerParts {
    pub types: Vec<Type>,
    pub interfaces: Vec<InterfaceType>,
    pub query: Option<Type>,
    pub mutation: Option<Type>,
}
