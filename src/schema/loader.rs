//! Schema loader for loading schemas from disk at startup
//!
//! - Schemas are stored as `<schema_dir>/<id>.json`, one file per schema
//! - Files use the RFC 7643 schema representation
//! - Malformed or duplicate schema files cause startup failure

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{SchemaError, SchemaResult};
use super::types::Schema;
use crate::observability::{log_event_with_fields, Event};

/// Default limit on attribute nesting (complex inside complex inside schema)
pub const DEFAULT_MAX_ATTRIBUTE_DEPTH: usize = 3;

/// Schema loader that reads schema files from disk and maintains an in-memory registry.
pub struct SchemaLoader {
    /// Directory containing schema files
    schema_dir: PathBuf,
    /// Deepest attribute nesting a registered schema may have
    max_attribute_depth: usize,
    /// Loaded schemas indexed by id
    schemas: BTreeMap<String, Schema>,
}

impl SchemaLoader {
    /// Creates a new schema loader reading from `schema_dir`.
    pub fn new(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_dir: schema_dir.into(),
            max_attribute_depth: DEFAULT_MAX_ATTRIBUTE_DEPTH,
            schemas: BTreeMap::new(),
        }
    }

    pub fn with_max_attribute_depth(mut self, max_attribute_depth: usize) -> Self {
        self.max_attribute_depth = max_attribute_depth;
        self
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads all schema files from the schema directory.
    ///
    /// Files are read in path order. A missing directory is created and
    /// yields zero schemas. Returns the number of schemas loaded.
    pub fn load_all(&mut self) -> SchemaResult<usize> {
        if !self.schema_dir.exists() {
            fs::create_dir_all(&self.schema_dir).map_err(|e| self.io_error(&self.schema_dir, e))?;
            return Ok(0);
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| self.io_error(&self.schema_dir, e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| self.io_error(&self.schema_dir, e))?.path();
            // Skip non-JSON files
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in &paths {
            self.load_schema_file(path)?;
        }

        let dir = self.schema_dir.display().to_string();
        let count = paths.len().to_string();
        log_event_with_fields(Event::SchemasLoaded, &[("dir", dir.as_str()), ("count", count.as_str())]);

        Ok(paths.len())
    }

    /// Loads a single schema file.
    fn load_schema_file(&mut self, path: &Path) -> SchemaResult<()> {
        let content = fs::read_to_string(path).map_err(|e| self.io_error(path, e))?;

        let schema: Schema = serde_json::from_str(&content).map_err(|e| SchemaError::Malformed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        self.register(schema)
    }

    /// Registers a schema directly (for programmatic schemas and tests).
    ///
    /// # Errors
    ///
    /// - `SchemaError::TooDeep` if attributes nest beyond the configured limit
    /// - `SchemaError::AlreadyRegistered` if the id is taken; schemas are immutable
    pub fn register(&mut self, schema: Schema) -> SchemaResult<()> {
        let depth = schema.depth();
        if depth > self.max_attribute_depth {
            return Err(SchemaError::TooDeep {
                schema: schema.id().to_string(),
                depth,
                limit: self.max_attribute_depth,
            });
        }

        if self.schemas.contains_key(schema.id()) {
            return Err(SchemaError::AlreadyRegistered(schema.id().to_string()));
        }

        tracing::debug!(
            event = %Event::SchemaRegistered,
            schema = schema.id(),
            attributes = schema.attributes().len(),
        );
        self.schemas.insert(schema.id().to_string(), schema);
        Ok(())
    }

    /// Gets a schema by id.
    pub fn get(&self, schema_id: &str) -> Option<&Schema> {
        self.schemas.get(schema_id)
    }

    /// Gets a schema by id, failing with `SchemaError::UnknownSchema`.
    pub fn require(&self, schema_id: &str) -> SchemaResult<&Schema> {
        self.get(schema_id)
            .ok_or_else(|| SchemaError::UnknownSchema(schema_id.to_string()))
    }

    /// Checks if a schema exists.
    pub fn exists(&self, schema_id: &str) -> bool {
        self.schemas.contains_key(schema_id)
    }

    /// Returns all loaded schemas, ordered by id.
    pub fn all_schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    /// Returns the number of loaded schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Saves a schema to disk at the standard location.
    pub fn save_schema(&self, schema: &Schema) -> SchemaResult<PathBuf> {
        let path = self.schema_dir.join(schema_file_name(schema.id()));

        // Check if file already exists (immutability)
        if path.exists() {
            return Err(SchemaError::AlreadyRegistered(schema.id().to_string()));
        }

        if !self.schema_dir.exists() {
            fs::create_dir_all(&self.schema_dir).map_err(|e| self.io_error(&self.schema_dir, e))?;
        }

        let content = serde_json::to_string_pretty(schema).map_err(|e| SchemaError::Malformed {
            path: path.display().to_string(),
            reason: format!("Failed to serialize schema: {}", e),
        })?;

        fs::write(&path, content).map_err(|e| self.io_error(&path, e))?;

        Ok(path)
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> SchemaError {
        SchemaError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// File name for a schema id; URN separators and other unsafe characters become `_`.
fn schema_file_name(schema_id: &str) -> String {
    let stem: String = schema_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    format!("{}.json", stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AttributeDefinition;
    use tempfile::TempDir;

    fn sample_schema() -> Schema {
        Schema::new(
            "urn:ietf:params:scim:schemas:core:2.0:Group",
            "Group",
            vec![
                AttributeDefinition::string("displayName").required(),
                AttributeDefinition::complex(
                    "members",
                    vec![
                        AttributeDefinition::string("value"),
                        AttributeDefinition::string("display"),
                    ],
                )
                .multi_valued(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_register_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(temp_dir.path());

        loader.register(sample_schema()).unwrap();

        let schema = loader.get("urn:ietf:params:scim:schemas:core:2.0:Group");
        assert!(schema.is_some());
        assert_eq!(schema.unwrap().name(), "Group");
        assert!(loader.require("urn:missing").is_err());
    }

    #[test]
    fn test_schema_immutability() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(temp_dir.path());

        loader.register(sample_schema()).unwrap();

        let result = loader.register(sample_schema());
        assert!(matches!(result, Err(SchemaError::AlreadyRegistered(_))));
    }

    #[test]
    fn test_depth_limit() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(temp_dir.path()).with_max_attribute_depth(1);

        let result = loader.register(sample_schema());
        assert!(matches!(result, Err(SchemaError::TooDeep { depth: 2, limit: 1, .. })));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let loader = SchemaLoader::new(temp_dir.path().join("schemas"));

        let path = loader.save_schema(&sample_schema()).unwrap();
        assert!(path.ends_with("urn_ietf_params_scim_schemas_core_2.0_Group.json"));
        assert!(loader.save_schema(&sample_schema()).is_err());

        let mut loader2 = SchemaLoader::new(temp_dir.path().join("schemas"));
        assert_eq!(loader2.load_all().unwrap(), 1);
        assert_eq!(loader2.get(sample_schema().id()), Some(&sample_schema()));
    }

    #[test]
    fn test_malformed_file_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("broken.json"), "{ not json").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let mut loader = SchemaLoader::new(temp_dir.path());
        let err = loader.load_all().unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_load_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(temp_dir.path().join("absent"));

        assert_eq!(loader.load_all().unwrap(), 0);
        assert_eq!(loader.schema_count(), 0);
        assert!(loader.schema_dir().exists());
    }
}
