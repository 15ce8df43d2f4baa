//! Attribute definitions
//!
//! An attribute definition is one node of a schema tree. Definitions are
//! built once with the typed constructors below (or deserialized from the
//! RFC 7643 representation) and never mutated while validation runs.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::characteristics::{DataType, Mutability, ReferenceType, Returned, Uniqueness};
use super::errors::{SchemaError, SchemaResult};
use super::name::{check_name, fold, names_match};

/// Definition of a single named attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "AttributeDocument")]
pub struct AttributeDefinition {
    name: String,
    #[serde(rename = "type")]
    data_type: DataType,
    multi_valued: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    required: bool,
    case_exact: bool,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    canonical_values: BTreeSet<String>,
    mutability: Mutability,
    returned: Returned,
    uniqueness: Uniqueness,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    reference_types: BTreeSet<ReferenceType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sub_attributes: Vec<AttributeDefinition>,
}

impl AttributeDefinition {
    fn simple(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            multi_valued: false,
            description: None,
            required: false,
            case_exact: data_type.default_case_exact(),
            canonical_values: BTreeSet::new(),
            mutability: Mutability::default(),
            returned: Returned::default(),
            uniqueness: Uniqueness::default(),
            reference_types: BTreeSet::new(),
            sub_attributes: Vec::new(),
        }
    }

    /// A sequence of zero or more Unicode characters
    pub fn string(name: impl Into<String>) -> Self {
        Self::simple(name, DataType::String)
    }

    /// The literal `true` or `false`
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::simple(name, DataType::Boolean)
    }

    /// A real number with at least one digit after the decimal point
    pub fn decimal(name: impl Into<String>) -> Self {
        Self::simple(name, DataType::Decimal)
    }

    /// A whole number with no fractional part
    pub fn integer(name: impl Into<String>) -> Self {
        Self::simple(name, DataType::Integer)
    }

    /// Base64-encoded bytes. Case exact, no uniqueness.
    pub fn binary(name: impl Into<String>) -> Self {
        Self::simple(name, DataType::Binary)
    }

    /// An xsd:dateTime value, e.g. `2008-01-23T04:56:22Z`
    pub fn date_time(name: impl Into<String>) -> Self {
        Self::simple(name, DataType::DateTime)
    }

    /// A URI reference to one of the given resource kinds. Case exact.
    pub fn reference(
        name: impl Into<String>,
        reference_types: impl IntoIterator<Item = ReferenceType>,
    ) -> Self {
        let mut attribute = Self::simple(name, DataType::Reference);
        attribute.reference_types = reference_types.into_iter().collect();
        attribute
    }

    /// An attribute whose value is an object of sub-attributes
    pub fn complex(name: impl Into<String>, sub_attributes: Vec<AttributeDefinition>) -> Self {
        let mut attribute = Self::simple(name, DataType::Complex);
        attribute.sub_attributes = sub_attributes;
        attribute
    }

    pub fn multi_valued(mut self) -> Self {
        self.multi_valued = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn case_exact(mut self, case_exact: bool) -> Self {
        self.case_exact = case_exact;
        self
    }

    pub fn with_canonical_values<S: Into<String>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        self.canonical_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_mutability(mut self, mutability: Mutability) -> Self {
        self.mutability = mutability;
        self
    }

    pub fn with_returned(mut self, returned: Returned) -> Self {
        self.returned = returned;
        self
    }

    pub fn with_uniqueness(mut self, uniqueness: Uniqueness) -> Self {
        self.uniqueness = uniqueness;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn is_multi_valued(&self) -> bool {
        self.multi_valued
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_case_exact(&self) -> bool {
        self.case_exact
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn canonical_values(&self) -> &BTreeSet<String> {
        &self.canonical_values
    }

    pub fn mutability(&self) -> Mutability {
        self.mutability
    }

    pub fn returned(&self) -> Returned {
        self.returned
    }

    pub fn uniqueness(&self) -> Uniqueness {
        self.uniqueness
    }

    pub fn reference_types(&self) -> &BTreeSet<ReferenceType> {
        &self.reference_types
    }

    pub fn sub_attributes(&self) -> &[AttributeDefinition] {
        &self.sub_attributes
    }

    /// Finds a sub-attribute by case-insensitive name
    pub fn sub_attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.sub_attributes.iter().find(|sub| names_match(&sub.name, name))
    }

    /// Nesting depth of this attribute; a simple attribute has depth 1
    pub fn depth(&self) -> usize {
        1 + self
            .sub_attributes
            .iter()
            .map(AttributeDefinition::depth)
            .max()
            .unwrap_or(0)
    }
}

/// Checks the names of a sibling list and recurses into complex attributes.
///
/// Sibling names must satisfy the identifier grammar and be unique under
/// case folding.
pub(crate) fn check_attributes(attributes: &[AttributeDefinition]) -> SchemaResult<()> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (i, attribute) in attributes.iter().enumerate() {
        check_name(&attribute.name)?;

        if let Some(&first) = seen.get(&fold(&attribute.name)) {
            return Err(SchemaError::DuplicateName {
                name: attribute.name.clone(),
                first,
                second: i,
            });
        }
        seen.insert(fold(&attribute.name), i);

        check_attributes(&attribute.sub_attributes)?;
    }
    Ok(())
}

/// Wire form of an attribute definition. `caseExact` falls back to the
/// default of the declared type when omitted.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttributeDocument {
    name: String,
    #[serde(rename = "type")]
    data_type: DataType,
    #[serde(default)]
    multi_valued: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    case_exact: Option<bool>,
    #[serde(default)]
    canonical_values: BTreeSet<String>,
    #[serde(default)]
    mutability: Mutability,
    #[serde(default)]
    returned: Returned,
    #[serde(default)]
    uniqueness: Uniqueness,
    #[serde(default)]
    reference_types: BTreeSet<ReferenceType>,
    #[serde(default)]
    sub_attributes: Vec<AttributeDefinition>,
}

impl TryFrom<AttributeDocument> for AttributeDefinition {
    type Error = SchemaError;

    fn try_from(doc: AttributeDocument) -> Result<Self, Self::Error> {
        if doc.data_type != DataType::Complex && !doc.sub_attributes.is_empty() {
            return Err(SchemaError::UnexpectedSubAttributes {
                attribute: doc.name,
                data_type: doc.data_type.to_string(),
            });
        }

        Ok(Self {
            case_exact: doc.case_exact.unwrap_or_else(|| doc.data_type.default_case_exact()),
            name: doc.name,
            data_type: doc.data_type,
            multi_valued: doc.multi_valued,
            description: doc.description,
            required: doc.required,
            canonical_values: doc.canonical_values,
            mutability: doc.mutability,
            returned: doc.returned,
            uniqueness: doc.uniqueness,
            reference_types: doc.reference_types,
            sub_attributes: doc.sub_attributes,
        })
    }
}
