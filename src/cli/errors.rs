//! CLI-specific error types
//!
//! Any CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::schema::{ResourceError, SchemaError, ValidationError};

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (files, stdin/stdout)
    IoError,
    /// Schema directory could not be loaded, or unknown schema id
    SchemaError,
    /// The input was rejected by the validator
    Rejected,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "SCIM_CLI_CONFIG_ERROR",
            Self::IoError => "SCIM_CLI_IO_ERROR",
            Self::SchemaError => "SCIM_CLI_SCHEMA_ERROR",
            Self::Rejected => "SCIM_CLI_REJECTED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Input rejected
    pub fn rejected(err: &ValidationError) -> Self {
        Self::new(CliErrorCode::Rejected, err.to_string())
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::new(CliErrorCode::SchemaError, e.to_string())
    }
}

impl From<ResourceError> for CliError {
    fn from(e: ResourceError) -> Self {
        match e {
            ResourceError::Schema(e) => e.into(),
            ResourceError::Validation(e) => Self::rejected(&e),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
