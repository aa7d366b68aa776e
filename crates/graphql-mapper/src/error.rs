//! Error types for schema construction.
//!
//! Every configuration defect is fatal and names the offending declaration
//! and its parent. Collaborator failures have their own types: loader errors
//! propagate unchanged, cache errors are downgraded to a miss by the factory.

use thiserror::Error;

/// Errors raised while building an executable schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A type, interface or field was declared with a blank name.
    #[error("{kind} name must not be blank")]
    BlankName {
        /// What kind of declaration carried the blank name.
        kind: &'static str,
    },

    /// Two object/enum types share a name.
    #[error("Type \"{0}\" is already declared")]
    DuplicateType(String),

    /// Two interfaces share a name.
    #[error("Interface \"{0}\" is already declared")]
    DuplicateInterface(String),

    /// A field reached materialization without a type reference.
    #[error("Missing type for field \"{field}\" in \"{parent}\"")]
    MissingFieldType {
        /// Field name.
        field: String,
        /// Enclosing type, interface or field (for arguments).
        parent: String,
    },

    /// A type reference string could not be parsed.
    #[error("Invalid type reference \"{reference}\": {reason}")]
    InvalidTypeReference {
        /// The raw reference.
        reference: String,
        /// Why the reference was rejected.
        reason: &'static str,
    },

    /// The `internalType` discriminator is not supported.
    #[error("Undefined internal type \"{internal_type}\" for \"{name}\"")]
    UnknownInternalType {
        /// Declaring type name.
        name: String,
        /// The unsupported discriminator.
        internal_type: String,
    },

    /// A resolve config names a handler nobody registered.
    #[error("Handler named \"{handler}\" does not exist (field \"{field}\")")]
    HandlerNotFound {
        /// The missing handler name.
        handler: String,
        /// Field whose resolve config referenced it.
        field: String,
    },

    /// A resolver factory rejected the resolve config it was given.
    #[error("Invalid resolve config for field \"{field}\" (handler \"{handler}\"): {reason}")]
    InvalidResolveConfig {
        /// Handler that rejected the config.
        handler: String,
        /// Field being prepared.
        field: String,
        /// Why the config was rejected.
        reason: String,
    },

    /// An argument default cannot be expressed as a GraphQL value.
    #[error("Invalid default value for argument \"{argument}\": {reason}")]
    InvalidDefaultValue {
        /// Argument name.
        argument: String,
        /// Conversion error.
        reason: String,
    },

    /// A type declares an interface that is not in the container.
    #[error("Type \"{type_name}\" implements undeclared interface \"{interface}\"")]
    UnknownInterface {
        /// Implementing type.
        type_name: String,
        /// Missing interface.
        interface: String,
    },

    /// A mapper setting is out of range.
    #[error("Invalid setting \"{key}\": {reason}")]
    InvalidConfig {
        /// Dotted setting path.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A schema root that does not materialize as an object type.
    #[error("Root \"{name}\" must be an object type, got \"{internal_type}\"")]
    InvalidRootType {
        /// Root type name.
        name: String,
        /// The declared discriminator.
        internal_type: String,
    },

    /// Double registration in the type registry.
    #[error("Type \"{0}\" is already registered")]
    AlreadyRegistered(String),

    /// Lookup of a name the registry has never seen.
    #[error("Type \"{0}\" is not registered")]
    TypeNotFound(String),

    /// A deferred reference outlived the registry it points into.
    #[error("Type registry was released before \"{0}\" was resolved")]
    RegistryReleased(String),

    /// The external loader failed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The GraphQL runtime rejected the assembled schema.
    #[error("GraphQL runtime rejected schema: {0}")]
    Runtime(String),

    /// Schema is still being built - caller should retry.
    #[error("GraphQL schema is initializing, please retry")]
    Initializing,

    /// An earlier build failed; the message is kept for diagnostics.
    #[error("Failed to build GraphQL schema: {0}")]
    BuildFailed(String),
}

/// Errors reported by a [`Loader`](crate::Loader).
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source could not be understood.
    #[error("Malformed mapping source \"{source_name}\": {reason}")]
    Malformed {
        /// Where the mapping came from (file, table, ...).
        source_name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The container rejected a declaration produced by the loader.
    #[error(transparent)]
    Declaration(Box<SchemaError>),

    /// Any other failure from the loader's backend.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl From<SchemaError> for LoadError {
    fn from(err: SchemaError) -> Self {
        Self::Declaration(Box::new(err))
    }
}

/// Errors reported by a [`CacheDriver`](crate::CacheDriver).
#[derive(Debug, Error)]
pub enum CacheError {
    /// Stored bytes could not be turned back into a container.
    #[error("Corrupt cache entry \"{key}\": {reason}")]
    Corrupt {
        /// Cache key.
        key: String,
        /// Decoder message.
        reason: String,
    },

    /// The backing store failed.
    #[error("Cache backend error: {0}")]
    Backend(String),
}

impl SchemaError {
    /// Returns a stable error code for diagnostics.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BlankName { .. }
            | Self::DuplicateType(_)
            | Self::DuplicateInterface(_)
            | Self::MissingFieldType { .. }
            | Self::InvalidTypeReference { .. }
            | Self::UnknownInternalType { .. }
            | Self::HandlerNotFound { .. }
            | Self::InvalidResolveConfig { .. }
            | Self::InvalidDefaultValue { .. }
            | Self::UnknownInterface { .. }
            | Self::InvalidRootType { .. }
            | Self::InvalidConfig { .. }
            | Self::AlreadyRegistered(_) => "CONFIGURATION_ERROR",
            Self::TypeNotFound(_) | Self::RegistryReleased(_) => "TYPE_NOT_FOUND",
            Self::Load(_) => "LOAD_ERROR",
            Self::Runtime(_) => "RUNTIME_ERROR",
            Self::Initializing => "SCHEMA_INITIALIZING",
            Self::BuildFailed(_) => "SCHEMA_BUILD_FAILED",
        }
    }

    /// Returns true for defects in the declared mapping itself.
    #[must_use]
    pub fn is_configuration_defect(&self) -> bool {
        self.error_code() == "CONFIGURATION_ERROR"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_type_message() {
        let err = SchemaError::MissingFieldType {
            field: "title".into(),
            parent: "Post".into(),
        };
        assert_eq!(err.to_string(), "Missing type for field \"title\" in \"Post\"");
        assert!(err.is_configuration_defect());
    }

    #[test]
    fn test_handler_not_found_message() {
        let err = SchemaError::HandlerNotFound {
            handler: "missing".into(),
            field: "posts".into(),
        };
        assert!(err.to_string().contains("\"missing\" does not exist"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaError::TypeNotFound("X".into()).error_code(), "TYPE_NOT_FOUND");
        assert_eq!(SchemaError::Initializing.error_code(), "SCHEMA_INITIALIZING");
        assert!(!SchemaError::Runtime("boom".into()).is_configuration_defect());
    }

    #[test]
    fn test_load_error_is_transparent() {
        let err: SchemaError = LoadError::Malformed {
            source_name: "schema.yaml".into(),
            reason: "bad indent".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Malformed mapping source \"schema.yaml\": bad indent"
        );
    }
}
