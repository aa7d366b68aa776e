//! Declarative mapping model.
//!
//! These types are what a loader produces and what guessers and normalizers
//! mutate. They are plain data until the factory prepares their fields and
//! materializes them into executable types.

mod container;
mod field;
mod types;

pub use container::SchemaContainer;
pub use field::{Field, ResolveConfig};
pub use types::{AbstractType, EnumValue, FieldContainer, InterfaceType, InternalType, Type};
