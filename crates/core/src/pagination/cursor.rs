//! Cursor codecs.
//!
//! A cursor is the sort-key value of an edge, serialised so clients can hand
//! it back verbatim. Cursors only make sense against the collection and sort
//! order that produced them.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::DateTime;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Converts between sort-key values and opaque cursor strings.
pub trait CursorCodec: Send + Sync {
    type Key;

    fn encode(&self, key: &Self::Key) -> String;

    /// Decode a client-supplied cursor. Garbage is a validation error.
    fn decode(&self, cursor: &str) -> Result<Self::Key, CoreError>;
}

fn invalid_cursor(cursor: &str) -> CoreError {
    CoreError::Validation(format!("Invalid cursor '{cursor}'"))
}

/// Decode base64 into the ASCII decimal it wraps.
fn decode_decimal(cursor: &str) -> Result<i64, CoreError> {
    let bytes = STANDARD
        .decode(cursor)
        .map_err(|_| invalid_cursor(cursor))?;
    std::str::from_utf8(&bytes)
        .ok()
        .and_then(|text| text.parse::<i64>().ok())
        .ok_or_else(|| invalid_cursor(cursor))
}

/// Timestamps as base64-wrapped epoch milliseconds.
///
/// Sub-millisecond precision is dropped; stored timestamps are truncated to
/// milliseconds so a round-trip through a cursor is exact.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampCursor;

impl CursorCodec for TimestampCursor {
    type Key = Timestamp;

    fn encode(&self, key: &Timestamp) -> String {
        STANDARD.encode(key.timestamp_millis().to_string())
    }

    fn decode(&self, cursor: &str) -> Result<Timestamp, CoreError> {
        let millis = decode_decimal(cursor)?;
        DateTime::from_timestamp_millis(millis).ok_or_else(|| invalid_cursor(cursor))
    }
}

/// Integers as base64-wrapped decimal text.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericCursor;

impl CursorCodec for NumericCursor {
    type Key = i64;

    fn encode(&self, key: &i64) -> String {
        STANDARD.encode(key.to_string())
    }

    fn decode(&self, cursor: &str) -> Result<i64, CoreError> {
        decode_decimal(cursor)
    }
}

/// Pass-through for sort keys that are already string-safe.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCursor;

impl CursorCodec for PlainCursor {
    type Key = String;

    fn encode(&self, key: &String) -> String {
        key.clone()
    }

    fn decode(&self, cursor: &str) -> Result<String, CoreError> {
        Ok(cursor.to_string())
    }
}
