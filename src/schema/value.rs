//! Typed values produced by validation

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use serde_json::{Map, Number, Value};

/// A validated attribute value.
///
/// Serializes back to plain JSON, so a validated resource can be fed to
/// the validator again and yields the same result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Reference(String),
    DateTime(String),
    /// Base64 text, kept encoded
    Binary(String),
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    /// Sub-attribute values keyed by canonical sub-attribute name
    Complex(BTreeMap<String, AttributeValue>),
    /// Elements of a multi-valued attribute, in input order
    Multi(Vec<AttributeValue>),
}

impl AttributeValue {
    /// Returns the text of a string, reference, dateTime or binary value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s)
            | AttributeValue::Reference(s)
            | AttributeValue::DateTime(s)
            | AttributeValue::Binary(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Decimal(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<&BTreeMap<String, AttributeValue>> {
        match self {
            AttributeValue::Complex(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_multi(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::Multi(values) => Some(values),
            _ => None,
        }
    }

    /// Decodes a binary value. Returns `None` for other types or if the
    /// text carries non-canonical trailing bits.
    pub fn binary_bytes(&self) -> Option<Vec<u8>> {
        match self {
            AttributeValue::Binary(encoded) => STANDARD.decode(encoded).ok(),
            _ => None,
        }
    }

    /// Converts back to an untyped JSON value
    pub fn to_json(&self) -> Value {
        match self {
            AttributeValue::String(s)
            | AttributeValue::Reference(s)
            | AttributeValue::DateTime(s)
            | AttributeValue::Binary(s) => Value::String(s.clone()),
            AttributeValue::Boolean(b) => Value::Bool(*b),
            AttributeValue::Integer(i) => Value::Number(Number::from(*i)),
            AttributeValue::Decimal(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            AttributeValue::Complex(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
            AttributeValue::Multi(values) => {
                Value::Array(values.iter().map(AttributeValue::to_json).collect())
            }
        }
    }
}

/// The result of validating a resource: canonical attribute name to value.
///
/// Optional attributes that were absent are omitted, never present as null.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Resource {
    attributes: BTreeMap<String, AttributeValue>,
}

impl Resource {
    pub(crate) fn insert(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(name.into(), value);
    }

    /// Gets a value by its canonical (schema-declared) name
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn into_inner(self) -> BTreeMap<String, AttributeValue> {
        self.attributes
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.attributes
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl From<Resource> for Value {
    fn from(resource: Resource) -> Self {
        resource.to_json()
    }
}
