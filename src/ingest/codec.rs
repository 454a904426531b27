//! RecordCodec - text encoding for the three per-record maps
//!
//! Detection maps are stored as JSON text. Encoding never fails outward and
//! decoding never aborts an aggregation: an unreadable column is simply
//! treated as absent.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Canonical encoding of an empty (or absent) map
pub const EMPTY_ENCODING: &str = "{}";

/// Literal text some writers store for a missing map
const NULL_LITERAL: &str = "null";

#[derive(Debug)]
pub struct DecodeError(serde_json::Error);

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Decode error: {}", self.0)
    }
}

impl std::error::Error for DecodeError {}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError(err)
    }
}

/// Encode a map as JSON text
///
/// Absent maps and serialization failures both yield `EMPTY_ENCODING`.
pub fn encode<T: Serialize>(value: Option<&T>) -> String {
    let Some(value) = value else {
        return EMPTY_ENCODING.to_string();
    };

    match serde_json::to_string(value) {
        Ok(text) => text,
        Err(e) => {
            log::debug!("⚠️  Encoding failed, storing empty map: {}", e);
            EMPTY_ENCODING.to_string()
        }
    }
}

/// True when a stored column actually carries a map
///
/// Blank text, `"null"` and `"{}"` are all "absent".
pub fn is_present(text: Option<&str>) -> bool {
    match text {
        Some(t) => {
            let trimmed = t.trim();
            !trimmed.is_empty() && trimmed != NULL_LITERAL && trimmed != EMPTY_ENCODING
        }
        None => false,
    }
}

/// Decode a stored column, keeping the failure visible
///
/// `Ok(None)` for absent columns, `Err` for text that is present but not a
/// valid encoding of `T`.
pub fn try_decode<T: DeserializeOwned>(text: Option<&str>) -> Result<Option<T>, DecodeError> {
    match text {
        Some(t) if is_present(Some(t)) => Ok(Some(serde_json::from_str(t)?)),
        _ => Ok(None),
    }
}

/// Decode a stored column, treating any failure as absent
pub fn decode<T: DeserializeOwned>(text: Option<&str>) -> Option<T> {
    try_decode(text).unwrap_or_else(|e| {
        log::debug!("⚠️  Ignoring undecodable column: {}", e);
        None
    })
}
