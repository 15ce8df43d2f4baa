//! Attribute characteristics (RFC 7643 §2.2)
//!
//! Only `data_type` and `mutability` drive validation. `returned`,
//! `uniqueness`, `case_exact` and canonical values are carried for the
//! storage and response layers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Attribute data types. `Complex` is the only type that carries sub-attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    String,
    Decimal,
    Integer,
    Binary,
    Boolean,
    Complex,
    DateTime,
    Reference,
}

impl DataType {
    /// Returns the schema keyword for this type
    pub fn keyword(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Decimal => "decimal",
            DataType::Integer => "integer",
            DataType::Binary => "binary",
            DataType::Boolean => "boolean",
            DataType::Complex => "complex",
            DataType::DateTime => "dateTime",
            DataType::Reference => "reference",
        }
    }

    /// Binary and reference values are compared case-exactly by default
    pub fn default_case_exact(&self) -> bool {
        matches!(self, DataType::Binary | DataType::Reference)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// Whether and how an attribute may be changed by a client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mutability {
    #[default]
    ReadWrite,
    /// May be set once, never replaced or removed
    Immutable,
    ReadOnly,
    WriteOnly,
}

impl Mutability {
    pub fn keyword(&self) -> &'static str {
        match self {
            Mutability::ReadWrite => "readWrite",
            Mutability::Immutable => "immutable",
            Mutability::ReadOnly => "readOnly",
            Mutability::WriteOnly => "writeOnly",
        }
    }
}

impl fmt::Display for Mutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// When an attribute is included in responses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Returned {
    #[default]
    Default,
    Always,
    Never,
    Request,
}

/// Uniqueness scope for attribute values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Uniqueness {
    #[default]
    None,
    Server,
    Global,
}

/// Resource kind a `reference` attribute may point at
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReferenceType {
    /// A resource outside the service provider
    External,
    /// A service endpoint or identifier
    Uri,
    /// A named SCIM resource type, e.g. "User" or "Group"
    Resource(String),
}

impl From<String> for ReferenceType {
    fn from(keyword: String) -> Self {
        match keyword.as_str() {
            "external" => ReferenceType::External,
            "uri" => ReferenceType::Uri,
            _ => ReferenceType::Resource(keyword),
        }
    }
}

impl From<ReferenceType> for String {
    fn from(reference: ReferenceType) -> Self {
        match reference {
            ReferenceType::External => "external".to_string(),
            ReferenceType::Uri => "uri".to_string(),
            ReferenceType::Resource(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_keywords_round_trip_through_serde() {
        for data_type in [
            DataType::String,
            DataType::Decimal,
            DataType::Integer,
            DataType::Binary,
            DataType::Boolean,
            DataType::Complex,
            DataType::DateTime,
            DataType::Reference,
        ] {
            let json = serde_json::to_value(data_type).unwrap();
            assert_eq!(json, data_type.keyword());
        }
    }

    #[test]
    fn test_default_case_exact() {
        assert!(DataType::Binary.default_case_exact());
        assert!(DataType::Reference.default_case_exact());
        assert!(!DataType::String.default_case_exact());
        assert!(!DataType::DateTime.default_case_exact());
    }

    #[test]
    fn test_characteristic_keywords() {
        assert_eq!(serde_json::to_value(Mutability::ReadOnly).unwrap(), "readOnly");
        assert_eq!(serde_json::to_value(Mutability::default()).unwrap(), "readWrite");
        assert_eq!(serde_json::to_value(Returned::Request).unwrap(), "request");
        assert_eq!(serde_json::to_value(Uniqueness::Server).unwrap(), "server");
    }

    #[test]
    fn test_unknown_data_type_rejected() {
        let result: Result<DataType, _> = serde_json::from_str("\"money\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_reference_types() {
        let parsed: Vec<ReferenceType> =
            serde_json::from_str(r#"["external", "uri", "User"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                ReferenceType::External,
                ReferenceType::Uri,
                ReferenceType::Resource("User".into()),
            ]
        );
        assert_eq!(serde_json::to_value(&parsed[2]).unwrap(), "User");
    }
}
