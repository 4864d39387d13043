//! Snapshot shape validation.
//!
//! The status API is third-party: an empty record list, a missing key, or a
//! wrong type must never crash the long-running loop. Validation is strict
//! and ordered — root shape first, then the records key, then its type.

use serde_json::Value;

use reviewbot_common::error::ShapeError;

/// Key holding the ordered homework record sequence.
const RECORDS_KEY: &str = "homeworks";

/// Key holding the server-side timestamp used as the next poll cursor.
const CURSOR_KEY: &str = "current_date";

/// Validate a snapshot and extract its most recent homework record.
///
/// Returns `Ok(None)` for a well-formed snapshot with no records (a quiet
/// period, not an error). The record itself is returned unchanged.
pub fn extract_latest(snapshot: &Value) -> Result<Option<Value>, ShapeError> {
    let root = snapshot.as_object().ok_or(ShapeError::NotAnObject)?;
    let records = root.get(RECORDS_KEY).ok_or(ShapeError::MissingRecordsKey)?;
    let records = records.as_array().ok_or(ShapeError::RecordsNotAnArray)?;
    Ok(records.first().cloned())
}

/// Read the cursor for the next poll from a snapshot, if the server sent one.
pub fn next_cursor(snapshot: &Value) -> Option<i64> {
    snapshot.get(CURSOR_KEY).and_then(Value::as_i64)
}
