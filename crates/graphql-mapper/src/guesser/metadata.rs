//! Guessers backed by domain model metadata.

use std::collections::HashMap;

use async_graphql::dynamic::TypeRef;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{FieldContext, FieldTypeGuesser, TypeGuess};

/// Scalar shapes a model property can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Int,
    Float,
    Boolean,
    Id,
}

impl ScalarKind {
    /// The built-in GraphQL scalar for this shape.
    pub fn graphql_name(self) -> &'static str {
        match self {
            Self::String => TypeRef::STRING,
            Self::Int => TypeRef::INT,
            Self::Float => TypeRef::FLOAT,
            Self::Boolean => TypeRef::BOOLEAN,
            Self::Id => TypeRef::ID,
        }
    }
}

/// Shape of one model property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Scalar(ScalarKind),
    /// Single-valued relation to another model.
    ToOne(String),
    /// Collection-valued relation to another model.
    ToMany(String),
}

/// Property metadata of one domain model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    pub properties: IndexMap<String, PropertyKind>,
}

impl ModelMetadata {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn property(mut self, name: impl Into<String>, kind: PropertyKind) -> Self {
        self.properties.insert(name.into(), kind);
        self
    }

    #[must_use]
    pub fn scalar(self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.property(name, PropertyKind::Scalar(kind))
    }
}

/// Metadata of every known model, keyed by model identifier.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: HashMap<String, ModelMetadata>,
}

impl ModelCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_model(mut self, metadata: ModelMetadata) -> Self {
        self.register(metadata);
        self
    }

    pub fn register(&mut self, metadata: ModelMetadata) {
        self.models.insert(metadata.name.clone(), metadata);
    }

    pub fn get(&self, model: &str) -> Option<&ModelMetadata> {
        self.models.get(model)
    }
}

/// Guesses field types from the property of the parent's model that shares
/// the field's name.
///
/// Scalars map to the built-in scalar; relations map to the declared type
/// mirroring the target model, list-wrapped for to-many.
#[derive(Debug, Clone, Default)]
pub struct MetadataTypeGuesser {
    catalog: ModelCatalog,
}

impl MetadataTypeGuesser {
    #[must_use]
    pub fn new(catalog: ModelCatalog) -> Self {
        Self { catalog }
    }
}

impl FieldTypeGuesser for MetadataTypeGuesser {
    fn guess_field_type(&self, context: &FieldContext<'_>) -> Option<TypeGuess> {
        let metadata = self.catalog.get(context.model()?)?;
        let property = metadata.properties.get(&context.field().name)?;

        let type_name = match property {
            PropertyKind::Scalar(kind) => kind.graphql_name().to_string(),
            PropertyKind::ToOne(target) => context.container().type_for_model(target)?.name.clone(),
            PropertyKind::ToMany(target) => {
                format!("[{}]", context.container().type_for_model(target)?.name)
            }
        };
        Some(TypeGuess::new(type_name, TypeGuess::HIGH))
    }
}

/// Guesses `ID` for fields named `id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifierGuesser;

impl FieldTypeGuesser for IdentifierGuesser {
    fn guess_field_type(&self, context: &FieldContext<'_>) -> Option<TypeGuess> {
        (context.field().name == "id").then(|| TypeGuess::new(TypeRef::ID, TypeGuess::MEDIUM))
    }
}
