//! Field declarations.
//!
//! A [`Field`] carries its type as an unresolved reference string. Arguments
//! are fields too, so the factory prepares both the same way: resolver first,
//! then a deferred type handle that is only dereferenced at assembly time.

use serde::{Deserialize, Serialize};

use crate::resolvers::Resolver;
use crate::schema::DeferredType;

/// Configuration consumed by a named resolver strategy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Name of the resolver factory that turns this config into a function.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,

    /// Directly invocable resolver, consumed by the `callable` strategy.
    #[serde(skip)]
    pub function: Option<Resolver>,

    /// Strategy-specific options.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl ResolveConfig {
    /// Creates a config routed to the given handler.
    #[must_use]
    pub fn handler(handler: impl Into<String>) -> Self {
        Self {
            handler: Some(handler.into()),
            ..Self::default()
        }
    }

    /// Creates a `callable` config around a ready-made resolver.
    #[must_use]
    pub fn callable(function: Resolver) -> Self {
        Self {
            handler: Some(crate::resolvers::CALLABLE_HANDLER.to_string()),
            function: Some(function),
            options: serde_json::Map::new(),
        }
    }

    /// Sets a strategy option.
    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Returns a string option, if present.
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(serde_json::Value::as_str)
    }
}

/// A field of a type or interface, or an argument of another field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Field {
    pub name: String,

    /// Type reference in GraphQL notation (`User`, `[Post!]!`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation_reason: Option<String>,

    /// Arguments; only meaningful on output fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<Field>>,

    /// Default value; only meaningful on arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,

    #[serde(rename = "resolve", default, skip_serializing_if = "Option::is_none")]
    pub resolve_config: Option<ResolveConfig>,

    #[serde(skip)]
    resolver: Option<Resolver>,

    #[serde(skip)]
    resolved_type: Option<DeferredType>,
}

impl Field {
    /// Creates a field with no type reference.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the type reference.
    #[must_use]
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn deprecated(mut self, reason: impl Into<String>) -> Self {
        self.deprecation_reason = Some(reason.into());
        self
    }

    /// Appends an argument.
    #[must_use]
    pub fn argument(mut self, argument: Field) -> Self {
        self.arguments.get_or_insert_with(Vec::new).push(argument);
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn resolve(mut self, config: ResolveConfig) -> Self {
        self.resolve_config = Some(config);
        self
    }

    /// Returns the type reference if it is set and not blank.
    pub fn declared_type(&self) -> Option<&str> {
        self.type_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Returns true when a type reference still has to be supplied.
    pub fn needs_type(&self) -> bool {
        self.declared_type().is_none()
    }

    pub fn arguments(&self) -> &[Field] {
        self.arguments.as_deref().unwrap_or_default()
    }

    /// The resolver attached during preparation, if any.
    pub fn resolver(&self) -> Option<&Resolver> {
        self.resolver.as_ref()
    }

    pub fn set_resolver(&mut self, resolver: Resolver) {
        self.resolver = Some(resolver);
    }

    /// The deferred type handle attached during preparation.
    pub fn resolved_type(&self) -> Option<&DeferredType> {
        self.resolved_type.as_ref()
    }

    pub fn set_resolved_type(&mut self, resolved_type: DeferredType) {
        self.resolved_type = Some(resolved_type);
    }
}
