//! Named resolver strategies.
//!
//! A field whose resolve config names a `handler` gets its executable
//! resolver from the factory registered under that name:
//! - `callable`: attaches a ready-made resolver unchanged (pre-registered)
//! - `property`: reads a property of the parent value

mod callable;
mod property;

pub use callable::{CALLABLE_HANDLER, CallableResolver};
pub use property::{PROPERTY_HANDLER, PropertyResolver};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_graphql::dynamic::{FieldFuture, ResolverContext};
use tracing::trace;

use crate::error::SchemaError;
use crate::mapping::{Field, ResolveConfig};

type BoxResolverFn = Arc<dyn for<'a> Fn(ResolverContext<'a>) -> FieldFuture<'a> + Send + Sync>;

/// An executable field resolver, as invoked by the async-graphql runtime.
#[derive(Clone)]
pub struct Resolver(BoxResolverFn);

impl Resolver {
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(ResolverContext<'a>) -> FieldFuture<'a> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call<'a>(&self, ctx: ResolverContext<'a>) -> FieldFuture<'a> {
        (self.0)(ctx)
    }

    /// True if both handles point at the same function.
    pub fn ptr_eq(&self, other: &Resolver) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver(..)")
    }
}

/// A named strategy turning a resolve config into a resolver.
pub trait ResolverFactory: Send + Sync {
    /// Handler name that selects this factory.
    fn name(&self) -> &str;

    /// Produces the resolver for `field`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidResolveConfig`] when `config` lacks what
    /// this strategy needs.
    fn get_function(&self, config: &ResolveConfig, field: &Field) -> Result<Resolver, SchemaError>;
}

/// Registry of resolver factories by handler name.
#[derive(Clone)]
pub struct ResolverRegistry {
    factories: HashMap<String, Arc<dyn ResolverFactory>>,
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ResolverRegistry")
            .field("factories", &names)
            .finish()
    }
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverRegistry {
    /// Creates a registry with the `callable` strategy registered.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.add_resolver(CallableResolver);
        registry
    }

    /// Registers a factory; a later registration under the same name wins.
    pub fn add_resolver(&mut self, factory: impl ResolverFactory + 'static) {
        let name = factory.name().to_string();
        trace!(handler = %name, "Registering resolver factory");
        self.factories.insert(name, Arc::new(factory));
    }

    pub fn get(&self, handler: &str) -> Option<&Arc<dyn ResolverFactory>> {
        self.factories.get(handler)
    }

    pub fn contains(&self, handler: &str) -> bool {
        self.factories.contains_key(handler)
    }

    /// Attaches a resolver to `field` if its resolve config names a handler.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::HandlerNotFound`] for unregistered handlers and
    /// propagates factory errors.
    pub fn prepare_resolver(&self, field: &mut Field) -> Result<(), SchemaError> {
        let Some(config) = field.resolve_config.as_ref() else {
            return Ok(());
        };
        let Some(handler) = config.handler.as_deref() else {
            return Ok(());
        };

        let factory = self
            .factories
            .get(handler)
            .ok_or_else(|| SchemaError::HandlerNotFound {
                handler: handler.to_string(),
                field: field.name.clone(),
            })?;
        let resolver = factory.get_function(config, field)?;

        field.set_resolver(resolver);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::Value;

    fn constant(value: &'static str) -> Resolver {
        Resolver::new(move |_| FieldFuture::new(async move { Ok(Some(Value::from(value))) }))
    }

    struct Fixed(&'static str, Resolver);

    impl ResolverFactory for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        fn get_function(&self, _: &ResolveConfig, _: &Field) -> Result<Resolver, SchemaError> {
            Ok(self.1.clone())
        }
    }

    #[test]
    fn test_callable_is_preregistered() {
        assert!(ResolverRegistry::new().contains(CALLABLE_HANDLER));
    }

    #[test]
    fn test_callable_attaches_function_unchanged() {
        let function = constant("hello");
        let mut field = Field::new("greeting")
            .with_type("String")
            .resolve(ResolveConfig::callable(function.clone()));

        ResolverRegistry::new().prepare_resolver(&mut field).unwrap();

        assert!(field.resolver().unwrap().ptr_eq(&function));
    }

    #[test]
    fn test_missing_handler_fails() {
        let mut field = Field::new("greeting").resolve(ResolveConfig::handler("missing"));
        let err = ResolverRegistry::new().prepare_resolver(&mut field).unwrap_err();

        assert!(matches!(
            err,
            SchemaError::HandlerNotFound { handler, field } if handler == "missing" && field == "greeting"
        ));
    }

    #[test]
    fn test_field_without_handler_is_untouched() {
        let mut field = Field::new("title").resolve(ResolveConfig::default());
        ResolverRegistry::new().prepare_resolver(&mut field).unwrap();
        assert!(field.resolver().is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let first = constant("first");
        let second = constant("second");
        let mut registry = ResolverRegistry::new();
        registry.add_resolver(Fixed("custom", first));
        registry.add_resolver(Fixed("custom", second.clone()));

        let mut field = Field::new("x").resolve(ResolveConfig::handler("custom"));
        registry.prepare_resolver(&mut field).unwrap();

        assert!(field.resolver().unwrap().ptr_eq(&second));
    }
}
