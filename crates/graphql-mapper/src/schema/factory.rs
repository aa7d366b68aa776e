//! Schema factory: from a declarative mapping to an executable schema.
//!
//! The build runs in two phases:
//!
//! 1. Acquire a linked [`SchemaContainer`], either from the cache or by
//!    loading, guessing, normalizing and linking interface implementers.
//! 2. Materialize it: interfaces first, then types, then the roots. Every
//!    field gets its resolver and a deferred type handle; handles are only
//!    dereferenced when the async-graphql schema is assembled, once the
//!    registry is complete. Fields returning a dispatched interface tag
//!    the model instances their resolver yields with the concrete type.
//!
//! Any defect aborts the build; no partial schema is ever returned.

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::{
    Enum, EnumItem, Field as RuntimeField, FieldFuture, FieldValue, InputValue, Interface,
    InterfaceField, Object, Scalar, Schema, SchemaBuilder,
};
use tracing::{debug, info, trace, warn};

use super::dispatch::{InterfaceDispatcher, InterfaceDispatchers, ModelRef};
use super::registry::{MaterializedType, TypeKind, TypeRegistry};
use crate::cache::CacheDriver;
use crate::error::SchemaError;
use crate::guesser::GuesserChain;
use crate::loader::Loader;
use crate::mapping::{Field, InterfaceType, InternalType, SchemaContainer, Type};
use crate::normalizer::{MappingNormalizer, Normalizer};
use crate::resolvers::{PropertyResolver, Resolver, ResolverFactory, ResolverRegistry};

/// Query root name used when the container declares none.
pub const DEFAULT_QUERY_ROOT: &str = "Query";

/// Limits applied to the assembled schema.
#[derive(Debug, Clone)]
pub struct SchemaFactoryConfig {
    /// Maximum query depth allowed.
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    pub max_complexity: usize,

    /// Whether to enable introspection queries.
    pub introspection_enabled: bool,
}

impl Default for SchemaFactoryConfig {
    fn default() -> Self {
        Self {
            max_depth: 15,
            max_complexity: 500,
            introspection_enabled: true,
        }
    }
}

/// The produced schema plus the registry and dispatch tables behind it.
pub struct ExecutableSchema {
    schema: Schema,
    registry: TypeRegistry,
    dispatchers: InterfaceDispatchers,
}

impl std::fmt::Debug for ExecutableSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutableSchema")
            .field("types", &self.registry.len())
            .field("dispatchers", &self.dispatchers.len())
            .finish_non_exhaustive()
    }
}

impl ExecutableSchema {
    /// The async-graphql schema, ready to execute requests.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn dispatchers(&self) -> &InterfaceDispatchers {
        &self.dispatchers
    }

    pub fn dispatcher(&self, interface: &str) -> Option<&InterfaceDispatcher> {
        self.dispatchers.get(interface)
    }

    /// SDL of the assembled schema.
    pub fn sdl(&self) -> String {
        self.schema.sdl()
    }

    pub fn into_schema(self) -> Schema {
        self.schema
    }
}

/// Builds executable schemas from a mapping loader.
///
/// # Example
///
/// ```ignore
/// let factory = SchemaFactory::new(loader, SchemaFactoryConfig::default())
///     .with_guesser(GuesserChain::new().with_guesser(IdentifierGuesser))
///     .with_cache(MemoryCache::new("blog:mapping"));
///
/// let schema = factory.create_schema()?;
/// ```
pub struct SchemaFactory {
    loader: Box<dyn Loader>,
    guesser: Option<GuesserChain>,
    normalizer: Box<dyn Normalizer>,
    cache: Option<Box<dyn CacheDriver>>,
    resolvers: ResolverRegistry,
    scalars: Vec<(String, Option<String>)>,
    config: SchemaFactoryConfig,
}

impl SchemaFactory {
    /// Creates a factory with the default normalizer and resolvers.
    #[must_use]
    pub fn new(loader: impl Loader + 'static, config: SchemaFactoryConfig) -> Self {
        Self {
            loader: Box::new(loader),
            guesser: None,
            normalizer: Box::new(MappingNormalizer),
            cache: None,
            resolvers: ResolverRegistry::new(),
            scalars: Vec::new(),
            config,
        }
    }

    #[must_use]
    pub fn with_guesser(mut self, guesser: GuesserChain) -> Self {
        self.guesser = Some(guesser);
        self
    }

    #[must_use]
    pub fn with_normalizer(mut self, normalizer: impl Normalizer + 'static) -> Self {
        self.normalizer = Box::new(normalizer);
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: impl CacheDriver + 'static) -> Self {
        self.cache = Some(Box::new(cache));
        self
    }

    pub fn set_cache_driver(&mut self, cache: Option<Box<dyn CacheDriver>>) {
        self.cache = cache;
    }

    #[must_use]
    pub fn with_resolver(mut self, factory: impl ResolverFactory + 'static) -> Self {
        self.add_resolver(factory);
        self
    }

    /// Registers a resolver factory; replaces one with the same name.
    pub fn add_resolver(&mut self, factory: impl ResolverFactory + 'static) {
        self.resolvers.add_resolver(factory);
    }

    /// Declares a custom scalar available to every build.
    #[must_use]
    pub fn with_scalar(mut self, name: impl Into<String>, description: Option<&str>) -> Self {
        self.scalars
            .push((name.into(), description.map(str::to_string)));
        self
    }

    pub fn config(&self) -> &SchemaFactoryConfig {
        &self.config
    }

    /// Builds the executable schema.
    ///
    /// Each call uses a fresh type registry.
    ///
    /// # Errors
    ///
    /// Returns the first configuration defect, loader failure or runtime
    /// rejection encountered.
    pub fn create_schema(&self) -> Result<ExecutableSchema, SchemaError> {
        debug!("Starting GraphQL schema build");
        let parts = self.schema_container()?.into_parts();

        let registry = TypeRegistry::new();
        for (name, description) in &self.scalars {
            registry.add_type(MaterializedType::scalar(name.clone(), description.clone()))?;
        }

        for interface in parts.interfaces {
            let materialized = self.create_interface(interface, &registry)?;
            registry.add_type(materialized)?;
        }

        for ty in parts.types {
            let materialized = self.create_type(ty, &registry)?;
            registry.add_type(materialized)?;
        }

        let query = parts
            .query
            .map(|root| self.create_root(root, &registry))
            .transpose()?;
        let mutation = parts
            .mutation
            .map(|root| self.create_root(root, &registry))
            .transpose()?;
        if let (Some(query), Some(mutation)) = (&query, &mutation)
            && query.name == mutation.name
        {
            return Err(SchemaError::AlreadyRegistered(mutation.name.clone()));
        }

        let schema = self.assemble(registry, query, mutation)?;
        info!(
            types = schema.registry.declared_types().len(),
            interfaces_dispatched = schema.dispatchers.len(),
            "GraphQL schema built"
        );
        Ok(schema)
    }

    /// Returns the linked container, from the cache when possible.
    ///
    /// # Errors
    ///
    /// Propagates loader and configuration errors of a fresh load.
    pub fn schema_container(&self) -> Result<SchemaContainer, SchemaError> {
        if let Some(cache) = &self.cache {
            match cache.load() {
                Ok(Some(container)) => {
                    debug!("Using cached schema container");
                    return Ok(container);
                }
                Ok(None) => debug!("Schema container cache miss"),
                Err(e) => warn!(error = %e, "Schema container cache read failed, rebuilding"),
            }
        }

        self.load_schema_container()
    }

    fn load_schema_container(&self) -> Result<SchemaContainer, SchemaError> {
        let mut container = SchemaContainer::new();
        self.loader.load(&mut container)?;

        if let Some(guesser) = &self.guesser {
            guesser.guess(&mut container);
        }
        self.normalizer.normalize(&mut container)?;

        define_interfaces_children(&mut container)?;

        if let Some(cache) = &self.cache
            && let Err(e) = cache.save(&container)
        {
            warn!(error = %e, "Failed to cache schema container");
        }

        Ok(container)
    }

    fn create_interface(
        &self,
        mut interface: InterfaceType,
        registry: &TypeRegistry,
    ) -> Result<MaterializedType, SchemaError> {
        trace!(interface = %interface.name, "Materializing interface");
        self.prepare_fields(&mut interface.fields, &interface.name, registry)?;

        if !interface.children_class_mapping().is_empty() {
            let dispatcher = InterfaceDispatcher::new(
                interface.name.clone(),
                interface.children_class_mapping(),
                registry,
            );
            interface.set_resolve_type(dispatcher);
        }

        let mut materialized = MaterializedType::new(interface.name.clone(), TypeKind::Interface);
        materialized.dispatcher = interface.take_resolve_type();
        materialized.description = interface.description;
        materialized.fields = interface.fields;
        Ok(materialized)
    }

    fn create_type(&self, mut ty: Type, registry: &TypeRegistry) -> Result<MaterializedType, SchemaError> {
        trace!(type_name = %ty.name, internal_type = %ty.internal_type, "Materializing type");
        self.prepare_fields(&mut ty.fields, &ty.name, registry)?;

        let interfaces = ty
            .interfaces
            .iter()
            .map(|name| match registry.get_type(name) {
                Ok(interface) if interface.kind() == TypeKind::Interface => Ok(interface),
                _ => Err(SchemaError::UnknownInterface {
                    type_name: ty.name.clone(),
                    interface: name.clone(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let kind = match &ty.internal_type {
            InternalType::ObjectType => TypeKind::Object,
            InternalType::EnumType => TypeKind::Enum,
            other => {
                return Err(SchemaError::UnknownInternalType {
                    name: ty.name,
                    internal_type: other.to_string(),
                });
            }
        };

        let mut materialized = MaterializedType::new(ty.name, kind);
        materialized.description = ty.description;
        materialized.fields = ty.fields;
        materialized.interfaces = interfaces;
        materialized.values = ty.values;
        Ok(materialized)
    }

    /// Roots stay out of the registry but may not shadow a registered name.
    fn create_root(&self, root: Type, registry: &TypeRegistry) -> Result<MaterializedType, SchemaError> {
        if registry.contains(&root.name) {
            return Err(SchemaError::AlreadyRegistered(root.name));
        }
        if root.internal_type != InternalType::ObjectType {
            return Err(SchemaError::InvalidRootType {
                name: root.name,
                internal_type: root.internal_type.to_string(),
            });
        }
        self.create_type(root, registry)
    }

    /// Attaches resolvers and deferred types, arguments first.
    fn prepare_fields(
        &self,
        fields: &mut [Field],
        parent: &str,
        registry: &TypeRegistry,
    ) -> Result<(), SchemaError> {
        for field in fields {
            if let Some(arguments) = field.arguments.as_mut() {
                self.prepare_fields(arguments, &field.name, registry)?;
            }

            self.resolvers.prepare_resolver(field)?;

            let type_name = field
                .declared_type()
                .ok_or_else(|| SchemaError::MissingFieldType {
                    field: field.name.clone(),
                    parent: parent.to_string(),
                })?;
            let deferred = registry.resolve_type(type_name)?;
            field.set_resolved_type(deferred);
        }
        Ok(())
    }

    fn assemble(
        &self,
        registry: TypeRegistry,
        query: Option<MaterializedType>,
        mutation: Option<MaterializedType>,
    ) -> Result<ExecutableSchema, SchemaError> {
        let query_name = query
            .as_ref()
            .map_or(DEFAULT_QUERY_ROOT, |root| root.name.as_str());
        let mutation_name = mutation.as_ref().map(|root| root.name.as_str());
        if query.is_none() {
            warn!("No query root declared, the runtime may reject the schema");
        }

        let mut builder = Schema::build(query_name, mutation_name, None);
        let mut dispatchers = HashMap::new();

        for ty in registry.types() {
            builder = match ty.kind {
                TypeKind::Scalar if ty.is_builtin() => builder,
                TypeKind::Scalar => builder.register(runtime_scalar(&ty)),
                TypeKind::Object => builder.register(runtime_object(&ty)?),
                TypeKind::Enum => builder.register(runtime_enum(&ty)),
                TypeKind::Interface => {
                    if let Some(dispatcher) = &ty.dispatcher {
                        dispatchers.insert(ty.name.clone(), dispatcher.clone());
                    }
                    builder.register(runtime_interface(&ty)?)
                }
            };
        }

        for root in query.iter().chain(mutation.iter()) {
            builder = builder.register(runtime_object(root)?);
        }

        let dispatchers = InterfaceDispatchers::new(dispatchers);
        let schema = self
            .configure(builder.data(dispatchers.clone()))
            .finish()
            .map_err(|e| SchemaError::Runtime(e.to_string()))?;

        debug!("GraphQL schema assembly complete");
        Ok(ExecutableSchema {
            schema,
            registry,
            dispatchers,
        })
    }

    fn configure(&self, builder: SchemaBuilder) -> SchemaBuilder {
        let builder = builder
            .limit_depth(self.config.max_depth)
            .limit_complexity(self.config.max_complexity);

        if self.config.introspection_enabled {
            builder
        } else {
            builder.disable_introspection()
        }
    }
}

/// Records each modeled type in the interfaces it declares.
fn define_interfaces_children(container: &mut SchemaContainer) -> Result<(), SchemaError> {
    let links: Vec<(String, String, String)> = container
        .types()
        .filter_map(|ty| ty.model.as_ref().map(|model| (ty, model)))
        .flat_map(|(ty, model)| {
            ty.interfaces
                .iter()
                .map(move |interface| (interface.clone(), ty.name.clone(), model.clone()))
        })
        .collect();

    for (interface_name, type_name, model) in links {
        let interface = container
            .get_interface_mut(&interface_name)
            .ok_or_else(|| SchemaError::UnknownInterface {
                type_name: type_name.clone(),
                interface: interface_name.clone(),
            })?;
        trace!(interface = %interface_name, type_name = %type_name, model = %model, "Linking implementer");
        interface.set_child_class(type_name, model);
    }
    Ok(())
}

fn field_type(field: &Field, parent: &str) -> Result<async_graphql::dynamic::TypeRef, SchemaError> {
    field
        .resolved_type()
        .ok_or_else(|| SchemaError::MissingFieldType {
            field: field.name.clone(),
            parent: parent.to_string(),
        })?
        .resolve()
}

fn input_value(argument: &Field, parent: &str) -> Result<InputValue, SchemaError> {
    let mut input = InputValue::new(argument.name.clone(), field_type(argument, parent)?);
    if let Some(description) = &argument.description {
        input = input.description(description.clone());
    }
    if let Some(default) = &argument.default_value {
        let value = Value::from_json(default.clone()).map_err(|e| SchemaError::InvalidDefaultValue {
            argument: argument.name.clone(),
            reason: e.to_string(),
        })?;
        input = input.default_value(value);
    }
    Ok(input)
}

fn runtime_object(ty: &MaterializedType) -> Result<Object, SchemaError> {
    let mut object = Object::new(ty.name.clone());
    if let Some(description) = &ty.description {
        object = object.description(description.clone());
    }
    for interface in &ty.interfaces {
        object = object.implement(interface.name.clone());
    }

    for field in &ty.fields {
        let mut resolver = field
            .resolver()
            .cloned()
            .unwrap_or_else(|| PropertyResolver::for_property(field.name.clone()));
        if let Some(dispatcher) = interface_dispatcher(field)? {
            resolver = dispatching(resolver, dispatcher);
        }
        let mut runtime = RuntimeField::new(field.name.clone(), field_type(field, &ty.name)?, move |ctx| {
            resolver.call(ctx)
        });
        if let Some(description) = &field.description {
            runtime = runtime.description(description.clone());
        }
        if field.deprecation_reason.is_some() {
            runtime = runtime.deprecation(field.deprecation_reason.as_deref());
        }
        for argument in field.arguments() {
            runtime = runtime.argument(input_value(argument, &field.name)?);
        }
        object = object.field(runtime);
    }
    Ok(object)
}

/// The dispatcher of the interface a field returns, if any.
fn interface_dispatcher(field: &Field) -> Result<Option<InterfaceDispatcher>, SchemaError> {
    let Some(deferred) = field.resolved_type() else {
        return Ok(None);
    };
    let target = deferred.target()?;
    if target.kind() != TypeKind::Interface {
        return Ok(None);
    }
    Ok(target.dispatcher().cloned())
}

/// Wraps `resolver` so model instances it yields are tagged with their
/// concrete type. Instances no mapped model matches resolve to null.
fn dispatching(resolver: Resolver, dispatcher: InterfaceDispatcher) -> Resolver {
    Resolver::new(move |ctx| {
        let dispatcher = dispatcher.clone();
        let inner = resolver.call(ctx);
        FieldFuture::new(async move {
            let value = match inner {
                FieldFuture::Value(value) => value,
                FieldFuture::Future(future) => future.await?,
            };
            Ok(value.and_then(|value| dispatch_models(&dispatcher, value)))
        })
    })
}

fn dispatch_models<'a>(dispatcher: &InterfaceDispatcher, value: FieldValue<'a>) -> Option<FieldValue<'a>> {
    if let Some(model) = value.downcast_ref::<ModelRef>() {
        return dispatcher.dispatch(Arc::clone(model));
    }
    let tagged = value
        .as_list()
        .filter(|items| items.iter().all(holds_models))
        .map(|items| FieldValue::list(items.iter().map(|item| dispatch_item(dispatcher, item))));
    Some(tagged.unwrap_or(value))
}

fn holds_models(value: &FieldValue<'_>) -> bool {
    value.downcast_ref::<ModelRef>().is_some()
        || value.as_list().is_some_and(|items| items.iter().all(holds_models))
}

fn dispatch_item<'a>(dispatcher: &InterfaceDispatcher, item: &FieldValue<'_>) -> FieldValue<'a> {
    if let Some(model) = item.downcast_ref::<ModelRef>() {
        return dispatcher.dispatch(Arc::clone(model)).unwrap_or(FieldValue::NULL);
    }
    match item.as_list() {
        Some(items) => FieldValue::list(items.iter().map(|item| dispatch_item(dispatcher, item))),
        None => FieldValue::NULL,
    }
}

fn runtime_interface(ty: &MaterializedType) -> Result<Interface, SchemaError> {
    let mut interface = Interface::new(ty.name.clone());
    if let Some(description) = &ty.description {
        interface = interface.description(description.clone());
    }

    for field in &ty.fields {
        let mut runtime = InterfaceField::new(field.name.clone(), field_type(field, &ty.name)?);
        if let Some(description) = &field.description {
            runtime = runtime.description(description.clone());
        }
        if field.deprecation_reason.is_some() {
            runtime = runtime.deprecation(field.deprecation_reason.as_deref());
        }
        for argument in field.arguments() {
            runtime = runtime.argument(input_value(argument, &field.name)?);
        }
        interface = interface.field(runtime);
    }
    Ok(interface)
}

fn runtime_enum(ty: &MaterializedType) -> Enum {
    let mut runtime = Enum::new(ty.name.clone());
    if let Some(description) = &ty.description {
        runtime = runtime.description(description.clone());
    }
    for value in &ty.values {
        let mut item = EnumItem::new(value.name.clone());
        if let Some(description) = &value.description {
            item = item.description(description.clone());
        }
        if value.deprecation_reason.is_some() {
            item = item.deprecation(value.deprecation_reason.as_deref());
        }
        runtime = runtime.item(item);
    }
    runtime
}

fn runtime_scalar(ty: &MaterializedType) -> Scalar {
    let scalar = Scalar::new(ty.name.clone());
    match &ty.description {
        Some(description) => scalar.description(description.clone()),
        None => scalar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::mapping::Field;

    fn factory_for(container: SchemaContainer) -> SchemaFactory {
        SchemaFactory::new(crate::StaticLoader::new(container), SchemaFactoryConfig::default())
    }

    #[test]
    fn test_default_config() {
        let config = SchemaFactoryConfig::default();
        assert_eq!(config.max_depth, 15);
        assert_eq!(config.max_complexity, 500);
        assert!(config.introspection_enabled);
    }

    #[test]
    fn test_links_modeled_implementers_only() {
        let mut container = SchemaContainer::new();
        container.add_interface(InterfaceType::new("Node")).unwrap();
        container
            .add_type(Type::object("Post").with_model("PostModel").implements("Node"))
            .unwrap();
        container.add_type(Type::object("Draft").implements("Node")).unwrap();

        define_interfaces_children(&mut container).unwrap();

        let mapping = container.get_interface("Node").unwrap().children_class_mapping();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping["Post"], "PostModel");
    }

    #[test]
    fn test_linking_unknown_interface_fails() {
        let mut container = SchemaContainer::new();
        container
            .add_type(Type::object("Post").with_model("PostModel").implements("Node"))
            .unwrap();

        assert!(matches!(
            define_interfaces_children(&mut container),
            Err(SchemaError::UnknownInterface { type_name, interface }) if type_name == "Post" && interface == "Node"
        ));
    }

    #[test]
    fn test_missing_argument_type_names_field() {
        let mut container = SchemaContainer::new();
        container.set_query_schema(
            Type::object("Query").field(
                Field::new("posts")
                    .with_type("String")
                    .argument(Field::new("first")),
            ),
        );

        let err = factory_for(container).create_schema().unwrap_err();
        assert!(matches!(
            err,
            SchemaError::MissingFieldType { field, parent } if field == "first" && parent == "posts"
        ));
    }

    #[test]
    fn test_unknown_internal_type_fails() {
        let mut container = SchemaContainer::new();
        container
            .add_type(
                Type::new("Search", InternalType::Other("UnionType".into()))
                    .field(Field::new("x").with_type("String")),
            )
            .unwrap();

        let err = factory_for(container).create_schema().unwrap_err();
        assert!(matches!(
            err,
            SchemaError::UnknownInternalType { name, internal_type } if name == "Search" && internal_type == "UnionType"
        ));
    }

    #[test]
    fn test_object_as_interface_rejected() {
        let mut container = SchemaContainer::new();
        container
            .add_type(Type::object("Node").field(Field::new("id").with_type("ID")))
            .unwrap();
        container
            .add_type(
                Type::object("Post")
                    .implements("Node")
                    .field(Field::new("id").with_type("ID")),
            )
            .unwrap();

        let err = factory_for(container).create_schema().unwrap_err();
        assert!(matches!(err, SchemaError::UnknownInterface { interface, .. } if interface == "Node"));
    }

    #[test]
    fn test_loader_error_propagates_unchanged() {
        let loader = |_: &mut SchemaContainer| -> Result<(), LoadError> {
            Err(LoadError::Malformed {
                source_name: "mapping.yaml".into(),
                reason: "unexpected token".into(),
            })
        };
        let err = SchemaFactory::new(loader, SchemaFactoryConfig::default())
            .create_schema()
            .unwrap_err();

        assert!(matches!(
            err,
            SchemaError::Load(LoadError::Malformed { source_name, .. }) if source_name == "mapping.yaml"
        ));
    }

    #[test]
    fn test_custom_scalar_is_resolvable() {
        let mut container = SchemaContainer::new();
        container.set_query_schema(
            Type::object("Query").field(Field::new("now").with_type("DateTime")),
        );

        let schema = factory_for(container)
            .with_scalar("DateTime", Some("RFC 3339 timestamp"))
            .create_schema()
            .unwrap();

        assert!(schema.registry().contains("DateTime"));
        assert!(schema.sdl().contains("scalar DateTime"));
    }
}
