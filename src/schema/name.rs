//! Attribute name grammar and case-insensitive name matching
//!
//! ATTRNAME = ALPHA *(nameChar), nameChar = "$" / "-" / "_" / DIGIT / ALPHA

use std::sync::OnceLock;

use regex::Regex;

use super::errors::{SchemaError, SchemaResult};

const ATTRIBUTE_NAME_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9$_-]*$";

fn attribute_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ATTRIBUTE_NAME_PATTERN).expect("attribute name pattern compiles"))
}

/// Checks an attribute name against the identifier grammar.
///
/// Runs at schema construction time only, never per validation call.
pub fn check_name(name: &str) -> SchemaResult<()> {
    if attribute_name_regex().is_match(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidName(name.to_string()))
    }
}

/// Compares two names under simple Unicode case folding.
pub(crate) fn names_match(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Folded form used as a key when detecting duplicate siblings.
pub(crate) fn fold(name: &str) -> String {
    name.to_lowercase()
}
