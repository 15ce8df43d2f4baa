//! Schema definition
//!
//! A schema is an ordered list of attribute definitions under a globally
//! unique id (usually a URN). Construction checks every attribute name
//! once; after that a schema is read-only and may be shared across threads.

use serde::{Deserialize, Serialize};

use super::attribute::{check_attributes, AttributeDefinition};
use super::errors::{SchemaError, SchemaResult};
use super::name::names_match;

/// Complete schema definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SchemaDocument")]
pub struct Schema {
    id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    attributes: Vec<AttributeDefinition>,
}

impl Schema {
    /// Creates a schema, checking attribute names and sibling uniqueness.
    ///
    /// # Errors
    ///
    /// - `SchemaError::InvalidName` if any attribute name breaks the grammar
    /// - `SchemaError::DuplicateName` if two siblings differ only by case
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        attributes: Vec<AttributeDefinition>,
    ) -> SchemaResult<Self> {
        check_attributes(&attributes)?;
        Ok(Self {
            id: id.into(),
            name: name.into(),
            description: None,
            attributes,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn attributes(&self) -> &[AttributeDefinition] {
        &self.attributes
    }

    /// Finds a top-level attribute by case-insensitive name
    pub fn attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|a| names_match(a.name(), name))
    }

    /// Deepest attribute nesting in this schema
    pub fn depth(&self) -> usize {
        self.attributes
            .iter()
            .map(AttributeDefinition::depth)
            .max()
            .unwrap_or(0)
    }
}

#[derive(Deserialize)]
struct SchemaDocument {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    attributes: Vec<AttributeDefinition>,
}

impl TryFrom<SchemaDocument> for Schema {
    type Error = SchemaError;

    fn try_from(doc: SchemaDocument) -> Result<Self, Self::Error> {
        let schema = Schema::new(doc.id, doc.name, doc.attributes)?;
        Ok(match doc.description {
            Some(description) => schema.with_description(description),
            None => schema,
        })
    }
}
