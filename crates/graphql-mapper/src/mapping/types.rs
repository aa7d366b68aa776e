//! Type and interface declarations.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Field;
use crate::schema::InterfaceDispatcher;

/// Selects how a field container materializes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InternalType {
    ObjectType,
    EnumType,
    InterfaceType,
    /// Any discriminator this crate does not know how to build.
    Other(String),
}

impl InternalType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::ObjectType => "ObjectType",
            Self::EnumType => "EnumType",
            Self::InterfaceType => "InterfaceType",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for InternalType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ObjectType" => Self::ObjectType,
            "EnumType" => Self::EnumType,
            "InterfaceType" => Self::InterfaceType,
            _ => Self::Other(value),
        }
    }
}

impl From<InternalType> for String {
    fn from(value: InternalType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for InternalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that is named within a schema namespace.
pub trait AbstractType {
    fn name(&self) -> &str;

    fn description(&self) -> Option<&str>;
}

/// A named declaration that owns an ordered list of fields.
pub trait FieldContainer: AbstractType {
    fn fields(&self) -> &[Field];

    fn fields_mut(&mut self) -> &mut Vec<Field>;

    fn internal_type(&self) -> &InternalType;

    /// Domain model this container mirrors, if any.
    fn model(&self) -> Option<&str> {
        None
    }
}

/// One value of an enumeration type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation_reason: Option<String>,
}

impl EnumValue {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            deprecation_reason: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An object or enum type declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Type {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "internalType")]
    pub internal_type: InternalType,
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Names of the interfaces this type claims to implement.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    /// Concrete domain model, used for interface dispatch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Values of an `EnumType`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<EnumValue>,
}

impl Type {
    /// Creates a type with an explicit discriminator.
    #[must_use]
    pub fn new(name: impl Into<String>, internal_type: InternalType) -> Self {
        Self {
            name: name.into(),
            description: None,
            internal_type,
            fields: Vec::new(),
            interfaces: Vec::new(),
            model: None,
            values: Vec::new(),
        }
    }

    #[must_use]
    pub fn object(name: impl Into<String>) -> Self {
        Self::new(name, InternalType::ObjectType)
    }

    #[must_use]
    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::new(name, InternalType::EnumType)
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn value(mut self, value: EnumValue) -> Self {
        self.values.push(value);
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl AbstractType for Type {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl FieldContainer for Type {
    fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut Vec<Field> {
        &mut self.fields
    }

    fn internal_type(&self) -> &InternalType {
        &self.internal_type
    }

    fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }
}

static INTERFACE_KIND: InternalType = InternalType::InterfaceType;

/// An interface declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Implementing type name -> its model, in linkage order.
    #[serde(rename = "childrenClassMapping", default)]
    children_class_mapping: IndexMap<String, String>,
    #[serde(skip)]
    resolve_type: Option<InterfaceDispatcher>,
}

impl InterfaceType {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
            children_class_mapping: IndexMap::new(),
            resolve_type: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Records that `type_name` implements this interface for `model`.
    pub fn set_child_class(&mut self, type_name: impl Into<String>, model: impl Into<String>) {
        self.children_class_mapping.insert(type_name.into(), model.into());
    }

    pub fn children_class_mapping(&self) -> &IndexMap<String, String> {
        &self.children_class_mapping
    }

    pub fn resolve_type(&self) -> Option<&InterfaceDispatcher> {
        self.resolve_type.as_ref()
    }

    pub fn set_resolve_type(&mut self, dispatcher: InterfaceDispatcher) {
        self.resolve_type = Some(dispatcher);
    }

    pub(crate) fn take_resolve_type(&mut self) -> Option<InterfaceDispatcher> {
        self.resolve_type.take()
    }
}

impl AbstractType for InterfaceType {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl FieldContainer for InterfaceType {
    fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut Vec<Field> {
        &mut self.fields
    }

    fn internal_type(&self) -> &InternalType {
        &INTERFACE_KIND
    }
}
