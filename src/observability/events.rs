//! Observable events
//!
//! Events are explicit and typed. Each is emitted as the `event` field of a
//! `tracing` record.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Startup
    /// Configuration file loaded and checked
    ConfigLoaded,
    /// Schema directory scanned
    SchemasLoaded,
    /// One schema added to the registry
    SchemaRegistered,

    // Requests
    /// Resource accepted by the validator
    ResourceValidated,
    /// Resource rejected by the validator
    ResourceRejected,
    /// Patch operation authorized
    PatchAuthorized,
    /// Patch operation rejected
    PatchRejected,
}

impl Event {
    /// Returns the stable event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::SchemaRegistered => "SCHEMA_REGISTERED",
            Event::ResourceValidated => "RESOURCE_VALIDATED",
            Event::ResourceRejected => "RESOURCE_REJECTED",
            Event::PatchAuthorized => "PATCH_AUTHORIZED",
            Event::PatchRejected => "PATCH_REJECTED",
        }
    }

    /// Whether the event records a rejected request
    pub fn is_rejection(&self) -> bool {
        matches!(self, Event::ResourceRejected | Event::PatchRejected)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
