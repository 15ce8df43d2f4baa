//! Schema error types
//!
//! Runtime validation codes map onto the SCIM `scimType` keywords:
//! - invalidSyntax (400): the payload shape cannot be reconciled with the schema
//! - invalidValue (400): a specific attribute value is missing, mistyped or not patchable
//!
//! Construction errors (bad attribute names, duplicate siblings) are schema
//! authoring bugs. They surface once, at startup, and are never retried.

use std::fmt;

use thiserror::Error;

/// Validation error codes as reported to SCIM clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorCode {
    /// Wrong top-level container, ambiguous key, or non-sequence for a multi-valued attribute
    InvalidSyntax,
    /// Missing required value, wrong type, empty required sequence, or forbidden mutation
    InvalidValue,
}

impl ValidationErrorCode {
    /// Returns the `scimType` keyword for this code
    pub fn scim_type(&self) -> &'static str {
        match self {
            ValidationErrorCode::InvalidSyntax => "invalidSyntax",
            ValidationErrorCode::InvalidValue => "invalidValue",
        }
    }

    /// Returns the HTTP status the transport layer should answer with
    pub fn status(&self) -> u16 {
        400
    }
}

impl fmt::Display for ValidationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scim_type())
    }
}

/// Where and why a value was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetails {
    /// Attribute path (e.g., "emails[0].value")
    pub path: String,
    /// Expected type or condition
    pub expected: String,
    /// Actual value or type found
    pub actual: String,
}

impl ValidationDetails {
    pub fn new(path: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn missing_required(path: impl Into<String>) -> Self {
        Self::new(path, "required attribute to be present", "missing")
    }

    pub fn type_mismatch(path: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::new(path, expected, actual)
    }

    pub fn ambiguous_key(path: impl Into<String>) -> Self {
        Self::new(path, "at most one case-insensitive key", "duplicate keys")
    }

    pub fn empty_sequence(path: impl Into<String>) -> Self {
        Self::new(path, "at least one value", "empty array")
    }

    pub fn undefined_attribute(path: impl Into<String>) -> Self {
        Self::new(path, "attribute defined by the schema", "undefined attribute")
    }

    pub fn not_patchable(path: impl Into<String>, mutability: impl fmt::Display, operation: impl fmt::Display) -> Self {
        Self::new(
            path,
            format!("attribute that permits '{}'", operation),
            format!("{} attribute", mutability),
        )
    }
}

impl fmt::Display for ValidationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attribute '{}': expected {}, got {}", self.path, self.expected, self.actual)
    }
}

/// A rejected resource or patch value.
///
/// Validation is fail-fast, so this always describes the first violation found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    code: ValidationErrorCode,
    message: String,
    details: ValidationDetails,
}

impl ValidationError {
    /// Create an invalidSyntax error
    pub fn invalid_syntax(details: ValidationDetails) -> Self {
        Self::new(ValidationErrorCode::InvalidSyntax, details)
    }

    /// Create an invalidValue error
    pub fn invalid_value(details: ValidationDetails) -> Self {
        Self::new(ValidationErrorCode::InvalidValue, details)
    }

    fn new(code: ValidationErrorCode, details: ValidationDetails) -> Self {
        Self {
            code,
            message: details.to_string(),
            details,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ValidationErrorCode {
        self.code
    }

    /// Returns the human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the rejection details
    pub fn details(&self) -> &ValidationDetails {
        &self.details
    }

    /// Returns the path of the offending attribute
    pub fn path(&self) -> &str {
        &self.details.path
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.scim_type(), self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Result type for validation and patch authorization
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Schema construction and registry errors
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid attribute name {0:?}")]
    InvalidName(String),

    #[error("duplicate attribute name {name:?} for siblings {first} and {second}")]
    DuplicateName {
        name: String,
        first: usize,
        second: usize,
    },

    #[error("attribute {attribute:?} declares sub-attributes but is of type {data_type}")]
    UnexpectedSubAttributes { attribute: String, data_type: String },

    #[error("schema {schema:?} nests {depth} levels deep (limit {limit})")]
    TooDeep {
        schema: String,
        depth: usize,
        limit: usize,
    },

    #[error("schema {0:?} is already registered")]
    AlreadyRegistered(String),

    #[error("schema {0:?} not found")]
    UnknownSchema(String),

    #[error("malformed schema file '{path}': {reason}")]
    Malformed { path: String, reason: String },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SchemaError {
    /// Construction errors are authoring bugs and must abort startup
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SchemaError::UnknownSchema(_))
    }
}

/// Result type for schema construction and registry operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Error returned by registry-backed validation: either the schema id was
/// never registered, or the payload was rejected.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ResourceError {
    /// Returns the validation error, if the payload itself was rejected
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            ResourceError::Validation(e) => Some(e),
            ResourceError::Schema(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scim_types() {
        assert_eq!(ValidationErrorCode::InvalidSyntax.scim_type(), "invalidSyntax");
        assert_eq!(ValidationErrorCode::InvalidValue.scim_type(), "invalidValue");
        assert_eq!(ValidationErrorCode::InvalidValue.status(), 400);
    }

    #[test]
    fn test_details_display() {
        let details = ValidationDetails::type_mismatch("emails[0].value", "string", "bool");
        let display = format!("{}", details);
        assert!(display.contains("emails[0].value"));
        assert!(display.contains("string"));
        assert!(display.contains("bool"));
    }

    #[test]
    fn test_error_display_includes_scim_type() {
        let err = ValidationError::invalid_value(ValidationDetails::missing_required("userName"));
        let display = format!("{}", err);
        assert!(display.starts_with("[invalidValue]"));
        assert!(display.contains("userName"));
        assert_eq!(err.path(), "userName");
    }

    #[test]
    fn test_unknown_schema_is_not_fatal() {
        assert!(!SchemaError::UnknownSchema("urn:x".into()).is_fatal());
        assert!(SchemaError::InvalidName("_bad".into()).is_fatal());
    }
}
