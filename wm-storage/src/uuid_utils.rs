//! UUID utilities
//!
//! Documents store identifiers without braces; older files wrap them in
//! `{}`. Both forms parse.

use crate::copy_mode::CopyMode;
use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Parse UUID from string, accepting an optional surrounding `{}`
pub fn parse(s: &str) -> Result<Uuid, uuid::Error> {
    let trimmed = s.trim();
    let inner = trimmed
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .unwrap_or(trimmed);
    Uuid::parse_str(inner)
}

/// Parse UUID from string, falling back to the nil UUID
pub fn parse_or_nil(s: &str) -> Uuid {
    parse(s).unwrap_or_else(|_| Uuid::nil())
}

/// Format without braces
pub fn to_string(id: &Uuid) -> String {
    id.hyphenated().to_string()
}

/// Identifier for the duplicate of an entity
///
/// Keeps `id` for [`CopyMode::Identical`], generates a fresh one otherwise.
pub fn duplicate_uuid(mode: CopyMode, id: Uuid) -> Uuid {
    match mode {
        CopyMode::Identical => id,
        CopyMode::WithDifferentIds => generate(),
    }
}
