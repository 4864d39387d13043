use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;

use reviewbot_common::error::ApiError;

/// Abstract "fetch status snapshot since timestamp" capability.
///
/// The poll loop is generic over this trait so tests can script
/// responses without a network.
#[async_trait]
pub trait StatusSource {
    /// Fetch the raw snapshot of homework records updated after `from_date`.
    async fn fetch(&self, from_date: i64) -> Result<Value, ApiError>;
}

/// HTTP client for the homework review status API.
pub struct StatusClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl StatusClient {
    pub fn new(endpoint: String, token: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint,
            token,
        })
    }

    fn classify(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout {
                endpoint: self.endpoint.clone(),
            }
        } else if err.is_redirect() {
            ApiError::TooManyRedirects {
                endpoint: self.endpoint.clone(),
            }
        } else {
            ApiError::Connection {
                endpoint: self.endpoint.clone(),
                detail: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl StatusSource for StatusClient {
    async fn fetch(&self, from_date: i64) -> Result<Value, ApiError> {
        let response = self
            .http
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        // Anything other than 200 is an error, regardless of payload
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ApiError::Status {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        tracing::debug!(from_date, "status snapshot fetched");

        response.json().await.map_err(|e| ApiError::Decode {
            detail: e.to_string(),
        })
    }
}
