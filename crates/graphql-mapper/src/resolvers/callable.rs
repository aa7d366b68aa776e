//! Pass-through strategy for hosts that already have resolver functions.

use super::{Resolver, ResolverFactory};
use crate::error::SchemaError;
use crate::mapping::{Field, ResolveConfig};

/// Handler name of [`CallableResolver`].
pub const CALLABLE_HANDLER: &str = "callable";

/// Attaches the config's `function` as the field resolver, unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallableResolver;

impl ResolverFactory for CallableResolver {
    fn name(&self) -> &str {
        CALLABLE_HANDLER
    }

    fn get_function(&self, config: &ResolveConfig, field: &Field) -> Result<Resolver, SchemaError> {
        config
            .function
            .clone()
            .ok_or_else(|| SchemaError::InvalidResolveConfig {
                handler: CALLABLE_HANDLER.to_string(),
                field: field.name.clone(),
                reason: "no function configured".to_string(),
            })
    }
}
