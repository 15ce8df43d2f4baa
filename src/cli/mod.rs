//! CLI module
//!
//! Provides command-line access to:
//! - schemas: list the registered schemas
//! - validate: validate one resource against a schema
//! - patch: authorize one patch operation

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{patch, run, run_command, schemas, validate, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{error_body, read_input, write_json, ERROR_SCHEMA};
