//! Resource identifier parsing.
//!
//! Profiles, homes, rooms and devices are all addressed by UUIDs. Clients send
//! them as strings (path segments or JSON fields), so every entry point parses
//! them through here to get one consistent notion of "malformed".

use thiserror::Error;
use uuid::Uuid;

/// Error returned when a client-supplied identifier cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("wrong format of {field}")]
pub struct MalformedId {
    pub field: String,
}

/// Parses a client-supplied resource identifier.
///
/// Only the canonical hyphenated form is accepted; surrounding whitespace is rejected.
pub fn parse_resource_id(raw: &str, field: &str) -> Result<Uuid, MalformedId> {
    let malformed = || MalformedId {
        field: field.to_string(),
    };

    if raw.len() != 36 {
        return Err(malformed());
    }
    Uuid::try_parse(raw).map_err(|_| malformed())
}

/// Generates a fresh identifier for a new document.
pub fn new_resource_id() -> Uuid {
    Uuid::new_v4()
}
