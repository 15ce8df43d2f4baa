//! CLI command implementations
//!
//! Every command loads the configuration, installs logging, loads the schema
//! directory, then runs once and exits. Results go to stdout as JSON; a
//! rejected resource or patch also produces a SCIM error body on stdout and a
//! non-zero exit code.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use crate::observability::{log_event, Event, MetricsRegistry};
use crate::schema::{
    PatchOperation, ResourceError, SchemaLoader, SchemaValidator, DEFAULT_MAX_ATTRIBUTE_DEPTH,
};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{error_body, read_input, write_json};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding one JSON file per schema (required)
    pub schema_dir: PathBuf,

    /// Deepest attribute nesting accepted in schema files (optional, default 3)
    #[serde(default = "default_max_attribute_depth")]
    pub max_attribute_depth: usize,

    /// tracing filter directive (optional, default "info"); RUST_LOG overrides it
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_max_attribute_depth() -> usize {
    DEFAULT_MAX_ATTRIBUTE_DEPTH
}
fn default_log_filter() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.max_attribute_depth == 0 {
            return Err(CliError::config_error("max_attribute_depth must be > 0"));
        }

        EnvFilter::try_new(&self.log_filter).map_err(|e| {
            CliError::config_error(format!("Invalid log_filter '{}': {}", self.log_filter, e))
        })?;

        Ok(())
    }

    /// Build a loader for the configured directory and load every schema in it
    pub fn load_schemas(&self) -> CliResult<SchemaLoader> {
        let mut loader =
            SchemaLoader::new(&self.schema_dir).with_max_attribute_depth(self.max_attribute_depth);
        loader.load_all()?;
        Ok(loader)
    }
}

/// Install the stderr log subscriber. A second call is a no-op.
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn boot(config_path: &Path) -> CliResult<(Config, SchemaLoader)> {
    let config = Config::load(config_path)?;
    init_logging(&config);
    log_event(Event::ConfigLoaded);

    let loader = config.load_schemas()?;
    Ok((config, loader))
}

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let mut stdout = io::stdout();
    match cmd {
        Command::Schemas { config } => {
            let (_, loader) = boot(&config)?;
            schemas(&loader, &mut stdout)
        }
        Command::Validate { config, schema, input } => {
            let (_, loader) = boot(&config)?;
            let resource = read_input(input.as_deref())?;
            validate(&loader, &schema, &resource, &mut stdout)
        }
        Command::Patch {
            config,
            schema,
            op,
            input,
        } => {
            let (_, loader) = boot(&config)?;
            let targets = read_input(input.as_deref())?;
            patch(&loader, &schema, &op, &targets, &mut stdout)
        }
    }
}

/// Write every registered schema in its JSON representation
pub fn schemas<W: Write>(loader: &SchemaLoader, out: &mut W) -> CliResult<()> {
    let schemas = loader.all_schemas().collect::<Vec<_>>();
    write_json(out, &serde_json::to_value(schemas)?)
}

/// Validate one resource and write the typed result, or the SCIM error body
pub fn validate<W: Write>(
    loader: &SchemaLoader,
    schema_id: &str,
    resource: &Value,
    out: &mut W,
) -> CliResult<()> {
    let metrics = MetricsRegistry::new();
    let validator = SchemaValidator::new(loader).with_metrics(&metrics);

    let result = validator.validate_resource(schema_id, resource);
    tracing::debug!(metrics = ?metrics.snapshot());

    match result {
        Ok(validated) => write_json(out, &validated.to_json()),
        Err(err) => reject(err, out),
    }
}

/// Authorize one patch operation and write `{"authorized": true}`, or the SCIM error body
pub fn patch<W: Write>(
    loader: &SchemaLoader,
    schema_id: &str,
    op: &str,
    targets: &Value,
    out: &mut W,
) -> CliResult<()> {
    let operation: PatchOperation = match op.parse() {
        Ok(operation) => operation,
        Err(err) => return reject(ResourceError::Validation(err), out),
    };
    let targets = targets
        .as_object()
        .ok_or_else(|| CliError::io_error("Patch input must be a JSON object of attribute to value"))?;

    let metrics = MetricsRegistry::new();
    let validator = SchemaValidator::new(loader).with_metrics(&metrics);

    let result = validator.authorize_patch(schema_id, operation, targets);
    tracing::debug!(metrics = ?metrics.snapshot());

    match result {
        Ok(()) => write_json(out, &json!({ "authorized": true, "op": operation })),
        Err(err) => reject(err, out),
    }
}

fn reject<W: Write>(err: ResourceError, out: &mut W) -> CliResult<()> {
    if let Some(validation) = err.as_validation() {
        write_json(out, &error_body(validation))?;
    }
    Err(err.into())
}
