//! Field type inference from domain model metadata.
//!
//! Guessers are consulted in registration order for every field that has no
//! type reference yet. The highest-confidence guess wins; on equal
//! confidence the earliest guesser keeps its guess. Fields nobody can guess
//! stay empty and fail later at materialization.

mod metadata;

pub use metadata::{
    IdentifierGuesser, MetadataTypeGuesser, ModelCatalog, ModelMetadata, PropertyKind, ScalarKind,
};

use tracing::{debug, trace};

use crate::mapping::{Field, FieldContainer, SchemaContainer};

/// A guessed type reference with its confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeGuess {
    pub type_name: String,
    pub confidence: f64,
}

impl TypeGuess {
    pub const VERY_HIGH: f64 = 1.0;
    pub const HIGH: f64 = 0.9;
    pub const MEDIUM: f64 = 0.5;
    pub const LOW: f64 = 0.1;

    #[must_use]
    pub fn new(type_name: impl Into<String>, confidence: f64) -> Self {
        Self {
            type_name: type_name.into(),
            confidence,
        }
    }
}

/// What a guesser gets to look at for one field.
pub struct FieldContext<'a> {
    container: &'a SchemaContainer,
    parent: &'a dyn FieldContainer,
    field: &'a Field,
}

impl<'a> FieldContext<'a> {
    pub fn new(
        container: &'a SchemaContainer,
        parent: &'a dyn FieldContainer,
        field: &'a Field,
    ) -> Self {
        Self {
            container,
            parent,
            field,
        }
    }

    /// The whole container, e.g. to find the type mirroring a model.
    pub fn container(&self) -> &'a SchemaContainer {
        self.container
    }

    pub fn parent(&self) -> &'a dyn FieldContainer {
        self.parent
    }

    pub fn field(&self) -> &'a Field {
        self.field
    }

    /// Model of the enclosing type, if it has one.
    pub fn model(&self) -> Option<&'a str> {
        self.parent.model()
    }
}

/// A pluggable strategy guessing the GraphQL type of a field.
pub trait FieldTypeGuesser: Send + Sync {
    /// Returns a guess, or `None` when nothing can be inferred.
    fn guess_field_type(&self, context: &FieldContext<'_>) -> Option<TypeGuess>;
}

/// Ordered chain of guessers.
#[derive(Default)]
pub struct GuesserChain {
    guessers: Vec<Box<dyn FieldTypeGuesser>>,
}

impl std::fmt::Debug for GuesserChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuesserChain")
            .field("guessers", &self.guessers.len())
            .finish()
    }
}

impl GuesserChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_guesser(mut self, guesser: impl FieldTypeGuesser + 'static) -> Self {
        self.add_guesser(guesser);
        self
    }

    pub fn add_guesser(&mut self, guesser: impl FieldTypeGuesser + 'static) {
        self.guessers.push(Box::new(guesser));
    }

    pub fn len(&self) -> usize {
        self.guessers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guessers.is_empty()
    }

    /// Fills in missing field types across `container`.
    ///
    /// Explicitly configured types are never overwritten.
    pub fn guess(&self, container: &mut SchemaContainer) {
        let mut guesses = Vec::new();
        for (slot, parent) in container.field_containers().enumerate() {
            for (index, field) in parent.fields().iter().enumerate() {
                if !field.needs_type() {
                    continue;
                }
                let context = FieldContext::new(container, parent, field);
                match self.best_guess(&context) {
                    Some(guess) => {
                        trace!(
                            parent = %parent.name(),
                            field = %field.name,
                            type_name = %guess.type_name,
                            confidence = guess.confidence,
                            "Guessed field type"
                        );
                        guesses.push((slot, index, guess.type_name));
                    }
                    None => {
                        trace!(parent = %parent.name(), field = %field.name, "No type guess");
                    }
                }
            }
        }

        debug!(count = guesses.len(), "Applying field type guesses");

        let mut guesses = guesses.into_iter().peekable();
        for (slot, parent) in container.field_containers_mut().enumerate() {
            while let Some((_, index, type_name)) = guesses.next_if(|(s, _, _)| *s == slot) {
                if let Some(field) = parent.fields_mut().get_mut(index) {
                    field.type_name = Some(type_name);
                }
            }
        }
    }

    fn best_guess(&self, context: &FieldContext<'_>) -> Option<TypeGuess> {
        let mut best: Option<TypeGuess> = None;
        for guesser in &self.guessers {
            let Some(guess) = guesser.guess_field_type(context) else {
                continue;
            };
            match &best {
                Some(current) if guess.confidence <= current.confidence => {}
                _ => best = Some(guess),
            }
        }
        best
    }
}
