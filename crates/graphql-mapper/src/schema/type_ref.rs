//! Parsing of GraphQL type references (`User`, `[Post!]!`).

use std::fmt;
use std::str::FromStr;

use async_graphql::dynamic::TypeRef;

use crate::error::SchemaError;

/// A parsed type reference: a named type under list/non-null wrappers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeReference {
    Named(String),
    NonNull(Box<TypeReference>),
    List(Box<TypeReference>),
}

impl TypeReference {
    /// The innermost named type.
    pub fn named_type(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::NonNull(inner) | Self::List(inner) => inner.named_type(),
        }
    }

    /// Converts to the runtime representation.
    pub fn to_type_ref(&self) -> TypeRef {
        match self {
            Self::Named(name) => TypeRef::named(name.clone()),
            Self::NonNull(inner) => TypeRef::NonNull(Box::new(inner.to_type_ref())),
            Self::List(inner) => TypeRef::List(Box::new(inner.to_type_ref())),
        }
    }

    fn parse(raw: &str) -> Result<Self, &'static str> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err("empty type name");
        }

        if let Some(inner) = raw.strip_suffix('!') {
            let inner = Self::parse(inner)?;
            if matches!(inner, Self::NonNull(_)) {
                return Err("repeated non-null marker");
            }
            return Ok(Self::NonNull(Box::new(inner)));
        }

        if let Some(rest) = raw.strip_prefix('[') {
            let inner = rest.strip_suffix(']').ok_or("unbalanced list brackets")?;
            return Ok(Self::List(Box::new(Self::parse(inner)?)));
        }

        if !is_valid_graphql_name(raw) {
            return Err("not a valid GraphQL name");
        }
        Ok(Self::Named(raw.to_string()))
    }
}

impl FromStr for TypeReference {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).map_err(|reason| SchemaError::InvalidTypeReference {
            reference: s.to_string(),
            reason,
        })
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::NonNull(inner) => write!(f, "{inner}!"),
            Self::List(inner) => write!(f, "[{inner}]"),
        }
    }
}

/// Checks `/[_A-Za-z][_0-9A-Za-z]*/`.
pub fn is_valid_graphql_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wrapped_reference() {
        let reference: TypeReference = "[Post!]!".parse().unwrap();
        assert_eq!(reference.named_type(), "Post");
        assert_eq!(reference.to_string(), "[Post!]!");
        assert_eq!(reference.to_type_ref().to_string(), "[Post!]!");
    }

    #[test]
    fn test_parse_plain_name() {
        let reference: TypeReference = " User ".parse().unwrap();
        assert_eq!(reference, TypeReference::Named("User".into()));
    }

    #[test]
    fn test_rejects_malformed_references() {
        for raw in ["", "[User", "User]", "User!!", "9Lives", "Us er", "[]"] {
            let err = raw.parse::<TypeReference>().unwrap_err();
            assert!(
                matches!(err, SchemaError::InvalidTypeReference { .. }),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_valid_graphql_names() {
        assert!(is_valid_graphql_name("_private"));
        assert!(is_valid_graphql_name("Post2"));
        assert!(!is_valid_graphql_name("Post-Draft"));
    }
}
