//! Property-read strategy.
//!
//! Reads a named property from the parent value, which is either a plain
//! GraphQL object value or a [`ModelInstance`](crate::ModelInstance). Model
//! relations come back as model instances, so nested selections keep
//! resolving through the same strategy. This is also what fields without
//! any configured resolver do.

use async_graphql::Value;
use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};

use super::{Resolver, ResolverFactory};
use crate::error::SchemaError;
use crate::mapping::{Field, ResolveConfig};
use crate::schema::{ModelInstance, ModelRef};

/// Handler name of [`PropertyResolver`].
pub const PROPERTY_HANDLER: &str = "property";

/// Resolves a field by reading `options.property` (default: the field name)
/// from the parent.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyResolver;

impl PropertyResolver {
    /// Resolver reading `property` from the parent value.
    pub fn for_property(property: impl Into<String>) -> Resolver {
        let property = property.into();
        Resolver::new(move |ctx| read_property(ctx, property.clone()))
    }
}

impl ResolverFactory for PropertyResolver {
    fn name(&self) -> &str {
        PROPERTY_HANDLER
    }

    fn get_function(&self, config: &ResolveConfig, field: &Field) -> Result<Resolver, SchemaError> {
        match config.options.get("property") {
            None => Ok(Self::for_property(field.name.clone())),
            Some(serde_json::Value::String(property)) => Ok(Self::for_property(property.clone())),
            Some(_) => Err(SchemaError::InvalidResolveConfig {
                handler: PROPERTY_HANDLER.to_string(),
                field: field.name.clone(),
                reason: "option \"property\" must be a string".to_string(),
            }),
        }
    }
}

fn read_property(ctx: ResolverContext<'_>, property: String) -> FieldFuture<'_> {
    FieldFuture::new(async move {
        if let Some(Value::Object(obj)) = ctx.parent_value.as_value() {
            return Ok(obj.get(property.as_str()).cloned().map(FieldValue::value));
        }
        if let Some(model) = ctx.parent_value.downcast_ref::<ModelRef>() {
            return Ok(read_model(model.as_ref(), &property));
        }
        Ok(None)
    })
}

/// Scalar properties first, then single and list relations.
fn read_model<'a>(model: &dyn ModelInstance, name: &str) -> Option<FieldValue<'a>> {
    if let Some(value) = model.property(name) {
        return Some(FieldValue::value(value));
    }
    if let Some(related) = model.relation(name) {
        return Some(FieldValue::owned_any(related));
    }
    model
        .relations(name)
        .map(|related| FieldValue::list(related.into_iter().map(FieldValue::owned_any)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_string_property_option() {
        let config = ResolveConfig::handler(PROPERTY_HANDLER).option("property", 42);
        let err = PropertyResolver
            .get_function(&config, &Field::new("title"))
            .unwrap_err();

        assert!(matches!(err, SchemaError::InvalidResolveConfig { handler, .. } if handler == "property"));
    }

    #[test]
    fn test_accepts_default_and_explicit_property() {
        assert!(PropertyResolver
            .get_function(&ResolveConfig::handler(PROPERTY_HANDLER), &Field::new("title"))
            .is_ok());

        let config = ResolveConfig::handler(PROPERTY_HANDLER).option("property", "headline");
        assert!(PropertyResolver.get_function(&config, &Field::new("title")).is_ok());
    }
}
