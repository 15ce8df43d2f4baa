//! Resource validation
//!
//! Validation semantics:
//! - The payload must be a JSON object
//! - Keys are matched to attribute names case-insensitively; two keys that
//!   match the same attribute are ambiguous and rejected
//! - Absent (or null) optional attributes are omitted from the result
//! - Multi-valued attributes must be arrays; required ones must be non-empty
//! - Values are type-checked exactly, no coercion
//! - The first violation aborts validation
//!
//! Keys that match no attribute are ignored; they belong to other schemas
//! (extensions, `schemas`, `meta`) that the caller validates separately.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime};
use regex::Regex;
use serde_json::{Map, Value};

use super::attribute::AttributeDefinition;
use super::characteristics::DataType;
use super::errors::{ResourceError, ValidationDetails, ValidationError, ValidationResult};
use super::loader::SchemaLoader;
use super::name::names_match;
use super::patch::PatchOperation;
use super::types::Schema;
use super::value::{AttributeValue, Resource};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};

const BINARY_PATTERN: &str = r"^([A-Za-z0-9+/]{4})*([A-Za-z0-9+/]{3}=|[A-Za-z0-9+/]{2}==)?$";

fn binary_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(BINARY_PATTERN).expect("binary pattern compiles"))
}

impl Schema {
    /// Validates an untyped resource against this schema.
    ///
    /// Attributes are processed in declaration order, so the reported
    /// failure is stable across calls.
    ///
    /// # Errors
    ///
    /// - invalidSyntax if the resource is not an object or a key is ambiguous
    /// - invalidValue for any missing, empty or mistyped attribute value
    pub fn validate(&self, resource: &Value) -> ValidationResult<Resource> {
        let object = resource.as_object().ok_or_else(|| {
            ValidationError::invalid_syntax(ValidationDetails::type_mismatch(
                "$root",
                "object",
                json_type_name(resource),
            ))
        })?;

        let mut validated = Resource::default();
        for attribute in self.attributes() {
            let path = attribute.name();
            let hit = lookup(object, attribute.name(), path)?;
            if let Some(value) = attribute.validate_at(hit, path)? {
                validated.insert(attribute.name(), value);
            }
        }
        Ok(validated)
    }
}

impl AttributeDefinition {
    /// Validates a possibly absent value, applying required and
    /// multi-valued rules. `Ok(None)` means an absent optional attribute.
    pub fn validate(&self, value: Option<&Value>) -> ValidationResult<Option<AttributeValue>> {
        self.validate_at(value, self.name())
    }

    /// Validates one value against the data type, ignoring cardinality.
    pub fn validate_singular(&self, value: &Value) -> ValidationResult<AttributeValue> {
        self.validate_singular_at(value, self.name())
    }

    pub(crate) fn validate_at(
        &self,
        value: Option<&Value>,
        path: &str,
    ) -> ValidationResult<Option<AttributeValue>> {
        let value = match value.filter(|v| !v.is_null()) {
            Some(value) => value,
            None if self.is_required() => {
                return Err(ValidationError::invalid_value(ValidationDetails::missing_required(path)))
            }
            None => return Ok(None),
        };

        if !self.is_multi_valued() {
            return self.validate_singular_at(value, path).map(Some);
        }

        let elements = value.as_array().ok_or_else(|| {
            ValidationError::invalid_syntax(ValidationDetails::type_mismatch(
                path,
                "array",
                json_type_name(value),
            ))
        })?;

        if self.is_required() && elements.is_empty() {
            return Err(ValidationError::invalid_value(ValidationDetails::empty_sequence(path)));
        }

        let validated = elements
            .iter()
            .enumerate()
            .map(|(i, element)| self.validate_singular_at(element, &format!("{}[{}]", path, i)))
            .collect::<ValidationResult<Vec<_>>>()?;

        Ok(Some(AttributeValue::Multi(validated)))
    }

    pub(crate) fn validate_singular_at(
        &self,
        value: &Value,
        path: &str,
    ) -> ValidationResult<AttributeValue> {
        let mismatch = || type_error(path, self.data_type(), value);

        match self.data_type() {
            DataType::Binary => match value {
                Value::String(s) if binary_regex().is_match(s) => Ok(AttributeValue::Binary(s.clone())),
                _ => Err(mismatch()),
            },
            DataType::Boolean => value.as_bool().map(AttributeValue::Boolean).ok_or_else(mismatch),
            DataType::Complex => {
                let object = value.as_object().ok_or_else(mismatch)?;
                let mut fields = BTreeMap::new();
                for sub in self.sub_attributes() {
                    let sub_path = make_path(path, sub.name());
                    let hit = lookup(object, sub.name(), &sub_path)?;
                    if let Some(validated) = sub.validate_at(hit, &sub_path)? {
                        fields.insert(sub.name().to_string(), validated);
                    }
                }
                Ok(AttributeValue::Complex(fields))
            }
            DataType::DateTime => match value {
                Value::String(s) if is_date_time(s) => Ok(AttributeValue::DateTime(s.clone())),
                _ => Err(mismatch()),
            },
            DataType::Decimal => match value {
                Value::Number(n) if n.is_f64() => n.as_f64().map(AttributeValue::Decimal).ok_or_else(mismatch),
                _ => Err(mismatch()),
            },
            // whole numbers outside i64 are rejected, not truncated
            DataType::Integer => value.as_i64().map(AttributeValue::Integer).ok_or_else(mismatch),
            DataType::String => value
                .as_str()
                .map(|s| AttributeValue::String(s.to_string()))
                .ok_or_else(mismatch),
            DataType::Reference => value
                .as_str()
                .map(|s| AttributeValue::Reference(s.to_string()))
                .ok_or_else(mismatch),
        }
    }
}

/// Schema validator backed by a schema registry.
///
/// Looks schemas up by id, then delegates to [`Schema::validate`] and
/// [`Schema::authorize_patch`]. Outcomes are logged and counted.
pub struct SchemaValidator<'a> {
    loader: &'a SchemaLoader,
    metrics: Option<&'a MetricsRegistry>,
}

impl<'a> SchemaValidator<'a> {
    /// Creates a new validator backed by the given schema loader.
    pub fn new(loader: &'a SchemaLoader) -> Self {
        Self { loader, metrics: None }
    }

    /// Records accepted and rejected requests in `metrics`.
    pub fn with_metrics(mut self, metrics: &'a MetricsRegistry) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Validates a resource body for a create or replace request.
    ///
    /// # Errors
    ///
    /// - `ResourceError::Schema` if `schema_id` is not registered
    /// - `ResourceError::Validation` if the resource is rejected
    pub fn validate_resource(&self, schema_id: &str, resource: &Value) -> Result<Resource, ResourceError> {
        let schema = self.loader.require(schema_id)?;

        match schema.validate(resource) {
            Ok(validated) => {
                if let Some(metrics) = self.metrics {
                    metrics.increment_validations_accepted();
                }
                tracing::debug!(
                    event = %Event::ResourceValidated,
                    schema = schema_id,
                    attributes = validated.len(),
                );
                Ok(validated)
            }
            Err(err) => {
                if let Some(metrics) = self.metrics {
                    metrics.increment_validations_rejected();
                }
                log_event_with_fields(
                    Event::ResourceRejected,
                    &[("schema", schema_id), ("scim_type", err.code().scim_type()), ("path", err.path())],
                );
                Err(err.into())
            }
        }
    }

    /// Authorizes one patch operation's value map.
    ///
    /// # Errors
    ///
    /// - `ResourceError::Schema` if `schema_id` is not registered
    /// - `ResourceError::Validation` if any target may not be patched
    pub fn authorize_patch(
        &self,
        schema_id: &str,
        operation: PatchOperation,
        targets: &Map<String, Value>,
    ) -> Result<(), ResourceError> {
        let schema = self.loader.require(schema_id)?;

        match schema.authorize_patch(operation, targets) {
            Ok(()) => {
                if let Some(metrics) = self.metrics {
                    metrics.increment_patches_authorized();
                }
                tracing::debug!(
                    event = %Event::PatchAuthorized,
                    schema = schema_id,
                    op = %operation,
                    targets = targets.len(),
                );
                Ok(())
            }
            Err(err) => {
                if let Some(metrics) = self.metrics {
                    metrics.increment_patches_rejected();
                }
                log_event_with_fields(
                    Event::PatchRejected,
                    &[
                        ("schema", schema_id),
                        ("op", operation.keyword()),
                        ("scim_type", err.code().scim_type()),
                        ("path", err.path()),
                    ],
                );
                Err(err.into())
            }
        }
    }
}

/// Finds the single key matching `name` case-insensitively.
///
/// Every key is scanned so that a second match is reported as ambiguous
/// rather than shadowed. Null counts as absent.
fn lookup<'v>(
    object: &'v Map<String, Value>,
    name: &str,
    path: &str,
) -> ValidationResult<Option<&'v Value>> {
    let mut hit = None;
    for (key, value) in object {
        if names_match(key, name) {
            if hit.is_some() {
                return Err(ValidationError::invalid_syntax(ValidationDetails::ambiguous_key(path)));
            }
            hit = Some(value);
        }
    }
    Ok(hit.filter(|v| !v.is_null()))
}

/// Accepts RFC 3339 timestamps and xsd:dateTime values without an offset.
fn is_date_time(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}

/// Returns the JSON type name for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "integer"
            } else {
                "decimal"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Creates an attribute path from prefix and sub-attribute name.
fn make_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn type_error(path: &str, expected: DataType, actual: &Value) -> ValidationError {
    let actual = match (expected, actual) {
        (DataType::Binary, Value::String(_)) => "non-base64 string",
        (DataType::DateTime, Value::String(_)) => "unparseable string",
        (DataType::Integer, Value::Number(n)) if n.is_u64() => "integer outside i64 range",
        _ => json_type_name(actual),
    };
    ValidationError::invalid_value(ValidationDetails::type_mismatch(path, expected.keyword(), actual))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::errors::ValidationErrorCode;
    use serde_json::json;

    fn test_schema() -> Schema {
        Schema::new(
            "empty",
            "empty",
            vec![
                AttributeDefinition::string("required").required(),
                AttributeDefinition::boolean("booleans").multi_valued().required(),
                AttributeDefinition::complex("complex", vec![AttributeDefinition::string("sub")])
                    .multi_valued(),
                AttributeDefinition::binary("binary"),
                AttributeDefinition::date_time("dateTime"),
                AttributeDefinition::reference("reference", []),
                AttributeDefinition::integer("integer"),
                AttributeDefinition::decimal("decimal"),
            ],
        )
        .unwrap()
    }

    fn code_of(resource: Value) -> ValidationErrorCode {
        test_schema().validate(&resource).unwrap_err().code()
    }

    #[test]
    fn test_valid_resource_passes() {
        let resource = json!({
            "required": "present",
            "booleans": [true],
            "complex": [{ "sub": "present" }],
            "binary": "ZXhhbXBsZQ==",
            "dateTime": "2008-01-23T04:56:22Z",
            "reference": "https://example.com/Users/1",
            "integer": 11,
            "decimal": -2.1e5
        });

        let validated = test_schema().validate(&resource).unwrap();
        assert_eq!(validated.get("integer"), Some(&AttributeValue::Integer(11)));
        assert_eq!(validated.get("decimal"), Some(&AttributeValue::Decimal(-2.1e5)));
        assert_eq!(validated.to_json(), resource);
    }

    #[test]
    fn test_non_object_resource_is_syntax_error() {
        for resource in [Value::Null, json!("x"), json!([{ "required": "present" }]), json!(1)] {
            assert_eq!(code_of(resource), ValidationErrorCode::InvalidSyntax);
        }
    }

    #[test]
    fn test_missing_required_field() {
        let err = test_schema()
            .validate(&json!({ "field": "present", "booleans": [true] }))
            .unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::InvalidValue);
        assert_eq!(err.path(), "required");
    }

    #[test]
    fn test_null_treated_as_absent() {
        let err = test_schema()
            .validate(&json!({ "required": null, "booleans": [true] }))
            .unwrap_err();
        assert_eq!(err.details().actual, "missing");

        let validated = test_schema()
            .validate(&json!({ "required": "present", "booleans": [true], "integer": null }))
            .unwrap();
        assert!(!validated.contains("integer"));
    }

    #[test]
    fn test_empty_required_multi_valued() {
        assert_eq!(
            code_of(json!({ "required": "present", "booleans": [] })),
            ValidationErrorCode::InvalidValue
        );
    }

    #[test]
    fn test_optional_multi_valued_may_be_empty() {
        let validated = test_schema()
            .validate(&json!({ "required": "present", "booleans": [false], "complex": [] }))
            .unwrap();
        assert_eq!(validated.get("complex"), Some(&AttributeValue::Multi(vec![])));
    }

    #[test]
    fn test_multi_valued_requires_array() {
        let err = test_schema()
            .validate(&json!({ "required": "present", "booleans": true }))
            .unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::InvalidSyntax);
        assert_eq!(err.details().expected, "array");
    }

    #[test]
    fn test_wrong_element_type_reports_index() {
        let err = test_schema()
            .validate(&json!({ "required": "present", "booleans": [true, "present"] }))
            .unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::InvalidValue);
        assert_eq!(err.path(), "booleans[1]");
    }

    #[test]
    fn test_duplicate_top_level_keys() {
        assert_eq!(
            code_of(json!({ "required": "present", "Required": "present", "booleans": [true] })),
            ValidationErrorCode::InvalidSyntax
        );
    }

    #[test]
    fn test_keys_matched_case_insensitively_and_canonicalised() {
        let validated = test_schema()
            .validate(&json!({ "REQUIRED": "present", "Booleans": [true] }))
            .unwrap();
        assert_eq!(validated.get("required"), Some(&AttributeValue::String("present".into())));
        assert!(validated.get("REQUIRED").is_none());
    }

    #[test]
    fn test_complex_errors() {
        let base = |complex: Value| json!({ "required": "present", "booleans": [true], "complex": complex });

        // not a list
        assert_eq!(code_of(base(json!("present"))), ValidationErrorCode::InvalidSyntax);
        // wrong element type
        assert_eq!(code_of(base(json!(["present"]))), ValidationErrorCode::InvalidValue);
        // duplicate sub-attribute keys
        assert_eq!(
            code_of(base(json!([{ "sub": "present", "Sub": "present" }]))),
            ValidationErrorCode::InvalidSyntax
        );
        // wrong sub-attribute type
        let err = test_schema().validate(&base(json!([{ "sub": true }]))).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::InvalidValue);
        assert_eq!(err.path(), "complex[0].sub");
    }

    #[test]
    fn test_scalar_type_errors() {
        let base = |key: &str, value: Value| {
            let mut resource = json!({ "required": "present", "booleans": [true] });
            resource[key] = value;
            resource
        };

        for (key, value) in [
            ("required", json!(true)),
            ("binary", json!(true)),
            ("binary", json!("not base64!")),
            ("dateTime", json!("04:56:22Z2008-01-23T")),
            ("integer", json!(1.1)),
            ("decimal", json!("1.1")),
            ("decimal", json!(11)),
            ("reference", json!(42)),
        ] {
            assert_eq!(
                code_of(base(key, value.clone())),
                ValidationErrorCode::InvalidValue,
                "{} = {} should be rejected",
                key,
                value
            );
        }
    }

    #[test]
    fn test_integer_range_is_i64() {
        let attribute = AttributeDefinition::integer("count");
        assert_eq!(
            attribute.validate_singular(&json!(i64::MAX)).unwrap(),
            AttributeValue::Integer(i64::MAX)
        );
        assert_eq!(
            attribute.validate_singular(&json!(i64::MIN)).unwrap(),
            AttributeValue::Integer(i64::MIN)
        );

        let err = attribute.validate_singular(&json!(u64::MAX)).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::InvalidValue);
        assert_eq!(err.details().actual, "integer outside i64 range");
    }

    #[test]
    fn test_date_time_without_offset_accepted() {
        let attribute = AttributeDefinition::date_time("lastModified");
        assert!(attribute.validate_singular(&json!("2008-01-23T04:56:22")).is_ok());
        assert!(attribute.validate_singular(&json!("2008-01-23T04:56:22.123+02:00")).is_ok());
        assert!(attribute.validate_singular(&json!("2008-01-23")).is_err());
    }

    #[test]
    fn test_binary_grammar() {
        let attribute = AttributeDefinition::binary("photo");
        for ok in ["", "ZXhhbXBsZQ==", "YWJj", "YWI="] {
            assert!(attribute.validate_singular(&json!(ok)).is_ok(), "{:?}", ok);
        }
        for bad in ["ZXhhbXBsZQ", "YW=", "Y", "YWJj=", "YW Jj"] {
            assert!(attribute.validate_singular(&json!(bad)).is_err(), "{:?}", bad);
        }
    }

    #[test]
    fn test_attribute_validate_absent() {
        let optional = AttributeDefinition::string("nickName");
        assert_eq!(optional.validate(None).unwrap(), None);

        let required = AttributeDefinition::string("userName").required();
        let err = required.validate(None).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::InvalidValue);
    }

    #[test]
    fn test_required_sub_attribute_inside_complex() {
        let schema = Schema::new(
            "urn:test",
            "test",
            vec![AttributeDefinition::complex(
                "name",
                vec![AttributeDefinition::string("familyName").required()],
            )],
        )
        .unwrap();

        assert!(schema.validate(&json!({})).is_ok());
        let err = schema.validate(&json!({ "name": {} })).unwrap_err();
        assert_eq!(err.path(), "name.familyName");
    }

    #[test]
    fn test_json_type_names() {
        assert_eq!(json_type_name(&json!(1)), "integer");
        assert_eq!(json_type_name(&json!(1.5)), "decimal");
        assert_eq!(json_type_name(&json!({})), "object");
    }
}
