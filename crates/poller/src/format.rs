//! Turns a homework record into the human-readable notification text.

use serde_json::Value;

use reviewbot_common::error::FormatError;
use reviewbot_common::types::ReviewStatus;

/// Render the notification message for one homework record.
///
/// Field presence is checked before the status lookup, so a record missing
/// `name` or `status` reports the missing field rather than a bogus status.
pub fn status_message(record: &Value) -> Result<String, FormatError> {
    let name = record
        .get("name")
        .and_then(Value::as_str)
        .ok_or(FormatError::MissingField("name"))?;
    let status = record
        .get("status")
        .and_then(Value::as_str)
        .ok_or(FormatError::MissingField("status"))?;

    let verdict = status
        .parse::<ReviewStatus>()
        .map_err(|_| FormatError::UnknownStatus(status.to_string()))?
        .verdict();

    Ok(format!("Changed review status for \"{name}\". {verdict}"))
}
