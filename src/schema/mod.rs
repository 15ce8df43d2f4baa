//! Attribute schemas, resource validation and patch authorization
//!
//! # Design Principles
//!
//! - Schemas are built once and read-only afterwards; any number of
//!   validations may share one schema without locking
//! - Attribute names are checked at construction, never per request
//! - Keys are matched case-insensitively; ambiguous keys are rejected
//! - No coercion, no defaults
//! - Validation is fail-fast and deterministic

mod attribute;
mod characteristics;
mod errors;
mod loader;
mod name;
mod patch;
mod types;
mod validator;
mod value;

pub use attribute::AttributeDefinition;
pub use characteristics::{DataType, Mutability, ReferenceType, Returned, Uniqueness};
pub use errors::{
    ResourceError, SchemaError, SchemaResult, ValidationDetails, ValidationError, ValidationErrorCode,
    ValidationResult,
};
pub use loader::{SchemaLoader, DEFAULT_MAX_ATTRIBUTE_DEPTH};
pub use name::check_name;
pub use patch::PatchOperation;
pub use types::Schema;
pub use validator::SchemaValidator;
pub use value::{AttributeValue, Resource};
