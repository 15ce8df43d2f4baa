//! JSON I/O handling for CLI
//!
//! - Input: one JSON document from a file or stdin
//! - Output: one JSON document per line on stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};
use crate::schema::ValidationError;

/// SCIM error message schema (RFC 7644 §3.12)
pub const ERROR_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:Error";

/// Read a JSON document from `path`, or from stdin when no path is given
pub fn read_input(path: Option<&Path>) -> CliResult<Value> {
    let content = match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", path.display(), e)))?,
        None => {
            let mut buffer = String::new();
            io::stdin().lock().read_to_string(&mut buffer)?;
            buffer
        }
    };

    if content.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    Ok(serde_json::from_str(&content)?)
}

/// Write one JSON document followed by a newline
pub fn write_json<W: Write>(out: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Build the SCIM error body for a rejected request
pub fn error_body(err: &ValidationError) -> Value {
    json!({
        "schemas": [ERROR_SCHEMA],
        "status": err.code().status().to_string(),
        "scimType": err.code().scim_type(),
        "detail": err.message(),
    })
}
