use thiserror::Error;

/// Failures while fetching a status snapshot from the homework API.
///
/// Every variant is retryable: the poll loop logs it, optionally notifies
/// once, and tries again on the next interval with an unchanged cursor.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("connection to {endpoint} failed: {detail}")]
    Connection { endpoint: String, detail: String },

    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },

    #[error("too many redirects while requesting {endpoint}")]
    TooManyRedirects { endpoint: String },

    #[error("{endpoint} is unavailable, API responded with HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("API response body is not valid JSON: {detail}")]
    Decode { detail: String },
}

/// Structural problems in an otherwise successfully fetched snapshot.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("API response is not a JSON object")]
    NotAnObject,

    #[error("API response is missing the \"homeworks\" key")]
    MissingRecordsKey,

    #[error("\"homeworks\" value is not an array")]
    RecordsNotAnArray,
}

/// Failures turning a homework record into a notification message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("homework record field \"{0}\" is absent or not a string")]
    MissingField(&'static str),

    #[error("unknown review status \"{0}\"")]
    UnknownStatus(String),
}

/// Failures delivering a message through the bot API.
///
/// Only `Unauthorized` is fatal: a bad or revoked bot credential cannot
/// succeed on retry, so the process must stop and wait for an operator.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("bot credential rejected by messaging API: {detail}")]
    Unauthorized { detail: String },

    #[error("messaging API rate limit hit, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    #[error("message delivery timed out")]
    Timeout,

    #[error("messaging API rejected the request: {detail}")]
    BadRequest { detail: String },

    #[error("network failure while delivering message: {detail}")]
    Network { detail: String },
}

impl DeliveryError {
    /// Whether this failure should terminate the process instead of being
    /// retried on the next interval.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DeliveryError::Unauthorized { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unauthorized_is_fatal() {
        assert!(
            DeliveryError::Unauthorized {
                detail: "401".into()
            }
            .is_fatal()
        );
        assert!(!DeliveryError::RateLimited { retry_after: 30 }.is_fatal());
        assert!(!DeliveryError::Timeout.is_fatal());
        assert!(
            !DeliveryError::BadRequest {
                detail: "chat not found".into()
            }
            .is_fatal()
        );
        assert!(
            !DeliveryError::Network {
                detail: "connection reset".into()
            }
            .is_fatal()
        );
    }
}
