//! Database ID type definition and form helpers for IDs.

use serde::{Deserialize, Deserializer};

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;

/// Deserialize an optional ID from a form field where an empty string
/// (e.g., the placeholder option of a `<select>`) means no selection.
pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<DatabaseId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;

    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<DatabaseId>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
