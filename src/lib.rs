//! scim-schema - strict validation of SCIM resources against attribute schemas
//!
//! - `schema`: attribute definitions, resource validation, patch authorization
//! - `observability`: tracing events and outcome counters
//! - `cli`: the `scim-schema` command-line tool

pub mod cli;
pub mod observability;
pub mod schema;
