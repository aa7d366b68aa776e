//! Schema materialization.
//!
//! ## Components
//!
//! - [`TypeRegistry`] - Registered types with deferred, cycle-safe references
//! - [`InterfaceDispatcher`] - Maps model instances to interface implementers
//! - [`SchemaFactory`] - Builds an [`ExecutableSchema`] from a mapping loader
//! - [`LazySchema`] - Builds on first access and supports rebuilds
//!
//! ## Build steps
//!
//! 1. The cache driver is consulted; a hit skips steps 2 to 5
//! 2. The loader fills an empty container
//! 3. Guessers infer missing field types
//! 4. The normalizer canonicalizes the mapping
//! 5. Modeled types are linked into the interfaces they implement
//! 6. Interfaces, then types, then roots are materialized
//! 7. Deferred references are resolved and the runtime schema is assembled

mod dispatch;
mod factory;
mod lazy;
mod registry;
mod type_ref;

pub use dispatch::{InterfaceDispatcher, InterfaceDispatchers, ModelInstance, ModelRef};
pub use factory::{DEFAULT_QUERY_ROOT, ExecutableSchema, SchemaFactory, SchemaFactoryConfig};
pub use lazy::{LazySchema, SchemaState};
pub use registry::{BUILTIN_SCALARS, DeferredType, MaterializedType, TypeKind, TypeRegistry};
pub use type_ref::{TypeReference, is_valid_graphql_name};
