//! CLI argument definitions using clap
//!
//! Commands:
//! - scim-schema schemas --config <path>
//! - scim-schema validate --config <path> --schema <id> [--input <file>]
//! - scim-schema patch --config <path> --schema <id> --op <op> [--input <file>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// scim-schema - validate SCIM resources and patch operations against attribute schemas
#[derive(Parser, Debug)]
#[command(name = "scim-schema")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the registered schemas as JSON
    Schemas {
        /// Path to configuration file
        #[arg(long, default_value = "./scim-schema.json")]
        config: PathBuf,
    },

    /// Validate one resource (read from --input or stdin)
    Validate {
        /// Path to configuration file
        #[arg(long, default_value = "./scim-schema.json")]
        config: PathBuf,

        /// Schema id, e.g. urn:ietf:params:scim:schemas:core:2.0:User
        #[arg(long)]
        schema: String,

        /// JSON file holding the resource; stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Authorize one patch operation's attribute/value map
    Patch {
        /// Path to configuration file
        #[arg(long, default_value = "./scim-schema.json")]
        config: PathBuf,

        /// Schema id the targets belong to
        #[arg(long)]
        schema: String,

        /// Operation keyword: add, replace or remove
        #[arg(long)]
        op: String,

        /// JSON file holding the attribute/value map; stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
