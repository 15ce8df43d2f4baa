//! Patch authorization
//!
//! A PATCH request carries one or more operations, each an `op` keyword and a
//! flat map of target attribute to value. Before the resource handler applies
//! an operation, every target must:
//! - be a top-level attribute of the schema (matched case-insensitively)
//! - permit the operation under its mutability
//! - carry a single value of the attribute's type (`add` and `replace` only)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::characteristics::Mutability;
use super::errors::{ValidationDetails, ValidationError, ValidationResult};
use super::types::Schema;

/// PATCH operation keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOperation {
    Add,
    Replace,
    Remove,
}

impl PatchOperation {
    pub fn keyword(&self) -> &'static str {
        match self {
            PatchOperation::Add => "add",
            PatchOperation::Replace => "replace",
            PatchOperation::Remove => "remove",
        }
    }
}

impl fmt::Display for PatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

impl FromStr for PatchOperation {
    type Err = ValidationError;

    /// Operation keywords are case-insensitive on the wire.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "add" => Ok(PatchOperation::Add),
            "replace" => Ok(PatchOperation::Replace),
            "remove" => Ok(PatchOperation::Remove),
            _ => Err(ValidationError::invalid_syntax(ValidationDetails::new(
                "op",
                "one of add, replace, remove",
                format!("{:?}", s),
            ))),
        }
    }
}

impl Mutability {
    /// Read-only attributes cannot be patched at all; immutable ones only accept `add`.
    pub fn permits(&self, operation: PatchOperation) -> bool {
        match self {
            Mutability::ReadOnly => false,
            Mutability::Immutable => operation == PatchOperation::Add,
            Mutability::ReadWrite | Mutability::WriteOnly => true,
        }
    }
}

impl Schema {
    /// Authorizes one patch operation against this schema.
    ///
    /// Targets are checked in key order and the first failure is returned.
    /// Only top-level attribute names are resolved; path expressions into
    /// complex attributes are the resource handler's concern.
    ///
    /// # Errors
    ///
    /// invalidValue if a target is undefined, not patchable under
    /// `operation`, or (for `add`/`replace`) carries a mistyped value.
    pub fn authorize_patch(
        &self,
        operation: PatchOperation,
        targets: &Map<String, Value>,
    ) -> ValidationResult<()> {
        for (name, value) in targets {
            let attribute = self.attribute(name).ok_or_else(|| {
                ValidationError::invalid_value(ValidationDetails::undefined_attribute(name))
            })?;

            if !attribute.mutability().permits(operation) {
                return Err(ValidationError::invalid_value(ValidationDetails::not_patchable(
                    attribute.name(),
                    attribute.mutability(),
                    operation,
                )));
            }

            // nothing to type-check on removal
            if operation == PatchOperation::Remove {
                continue;
            }

            // one element at a time: a multi-valued target takes a single value
            attribute.validate_singular(value)?;
        }
        Ok(())
    }
}
