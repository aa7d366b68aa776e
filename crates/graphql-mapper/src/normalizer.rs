//! Canonicalization of shorthand mapping syntax.

use crate::error::SchemaError;
use crate::mapping::{Field, SchemaContainer};
use crate::resolvers::CALLABLE_HANDLER;

/// Rewrites a loaded container into canonical form, in place.
pub trait Normalizer: Send + Sync {
    /// # Errors
    ///
    /// Implementations may reject declarations they cannot canonicalize.
    fn normalize(&self, container: &mut SchemaContainer) -> Result<(), SchemaError>;
}

/// Default normalizer.
///
/// - trims type references and drops blank ones
/// - expands the `Type[]` shorthand into `[Type]`
/// - routes resolve configs carrying only a function to `callable`
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingNormalizer;

impl Normalizer for MappingNormalizer {
    fn normalize(&self, container: &mut SchemaContainer) -> Result<(), SchemaError> {
        for parent in container.field_containers_mut() {
            normalize_fields(parent.fields_mut());
        }
        Ok(())
    }
}

fn normalize_fields(fields: &mut [Field]) {
    for field in fields {
        if let Some(arguments) = field.arguments.as_mut() {
            normalize_fields(arguments);
        }

        field.type_name = field
            .type_name
            .take()
            .map(|raw| expand_list_shorthand(raw.trim()))
            .filter(|name| !name.is_empty());

        if let Some(config) = field.resolve_config.as_mut()
            && config.handler.is_none()
            && config.function.is_some()
        {
            config.handler = Some(CALLABLE_HANDLER.to_string());
        }
    }
}

fn expand_list_shorthand(reference: &str) -> String {
    match reference.strip_suffix("[]") {
        Some(inner) => format!("[{}]", expand_list_shorthand(inner.trim_end())),
        None => reference.to_string(),
    }
}
