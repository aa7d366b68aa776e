//! # graphql-mapper
//!
//! Builds executable GraphQL schemas from a declarative mapping of domain
//! models.
//!
//! A [`Loader`] fills a [`SchemaContainer`] with types, interfaces and root
//! operation types. The [`SchemaFactory`] then fills in missing field types
//! through a [`GuesserChain`], normalizes the mapping, links model-backed
//! implementers to their interfaces and materializes everything into an
//! async-graphql dynamic schema. Fields may reference types declared later
//! or each other cyclically; references are resolved only once every type
//! is registered.
//!
//! ## Example
//!
//! ```ignore
//! let mut mapping = SchemaContainer::new();
//! mapping.add_type(
//!     Type::object("Post")
//!         .field(Field::new("id").with_type("ID!"))
//!         .field(Field::new("author").with_type("User")),
//! )?;
//! mapping.add_type(
//!     Type::object("User").field(Field::new("posts").with_type("[Post]")),
//! )?;
//! mapping.set_query_schema(
//!     Type::object("Query").field(Field::new("post").with_type("Post")),
//! );
//!
//! let schema = SchemaFactory::new(StaticLoader::new(mapping), SchemaFactoryConfig::default())
//!     .with_cache(MemoryCache::default())
//!     .create_schema()?;
//! ```
//!
//! ## Configuration
//!
//! ```toml
//! [graphql]
//! enabled = true
//! introspection = true
//!
//! [graphql.limits]
//! max_depth = 15
//! max_complexity = 500
//! ```
//!
//! ## Modules
//!
//! - [`mapping`] - Declarative types, interfaces, fields and the container
//! - [`guesser`] - Field type inference
//! - [`resolvers`] - Named resolver strategies
//! - [`schema`] - Type registry, interface dispatch and the factory
//! - [`cache`] - Cache driver contract and an in-memory driver
//! - [`config`] - Configuration options
//! - [`error`] - Error types

pub mod cache;
pub mod config;
pub mod error;
pub mod guesser;
pub mod loader;
pub mod mapping;
pub mod normalizer;
pub mod resolvers;
pub mod schema;

pub use cache::{CacheDriver, DEFAULT_CACHE_KEY, MemoryCache};
pub use config::{MapperConfig, MappingCacheConfig, QueryLimits};
pub use error::{CacheError, LoadError, SchemaError};
pub use guesser::{FieldContext, FieldTypeGuesser, GuesserChain, TypeGuess};
pub use loader::{Loader, StaticLoader};
pub use mapping::{
    AbstractType, EnumValue, Field, FieldContainer, InterfaceType, InternalType, ResolveConfig,
    SchemaContainer, Type,
};
pub use normalizer::{MappingNormalizer, Normalizer};
pub use resolvers::{Resolver, ResolverFactory, ResolverRegistry};
pub use schema::{
    ExecutableSchema, InterfaceDispatcher, InterfaceDispatchers, LazySchema, ModelInstance,
    ModelRef, SchemaFactory, SchemaFactoryConfig, TypeRegistry,
};

/// Result type for schema construction.
pub type Result<T> = std::result::Result<T, SchemaError>;
