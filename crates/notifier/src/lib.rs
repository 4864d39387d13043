//! Write side of ReviewBot: message delivery through the Telegram Bot API.
//!
//! Delivery failures are classified, not collapsed — a revoked credential is
//! fatal and must stop the process, while rate limits, timeouts, and rejected
//! requests are retryable on the next iteration.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};

use reviewbot_common::error::DeliveryError;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Wait Telegram suggests when a 429 response carries no `retry_after`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 30;

/// Abstract "send text to the fixed destination" capability.
#[async_trait]
pub trait MessageSink {
    async fn send(&self, text: &str) -> Result<(), DeliveryError>;
}

/// Telegram Bot API notifier bound to one bot token and one chat.
pub struct TelegramNotifier {
    http: reqwest::Client,
    api_base: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(token: String, chat_id: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_base: TELEGRAM_API_BASE.to_string(),
            token,
            chat_id,
        })
    }

    /// Override the Telegram API base URL (used by tests against a local server).
    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base;
        self
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

/// Map a Telegram error response onto the delivery taxonomy.
fn classify_response(status: StatusCode, body: &Value) -> DeliveryError {
    let description = body
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("no description")
        .to_string();

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DeliveryError::Unauthorized {
            detail: description,
        },
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = body
                .get("parameters")
                .and_then(|p| p.get("retry_after"))
                .and_then(Value::as_u64)
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            DeliveryError::RateLimited { retry_after }
        }
        StatusCode::BAD_REQUEST => DeliveryError::BadRequest {
            detail: description,
        },
        _ => DeliveryError::Network {
            detail: format!("HTTP {status}: {description}"),
        },
    }
}

#[async_trait]
impl MessageSink for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        let response = self
            .http
            .post(self.send_message_url())
            .json(&json!({ "chat_id": self.chat_id, "text": text }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::Timeout
                } else {
                    DeliveryError::Network {
                        detail: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(chat_id = %self.chat_id, "notification delivered");
            return Ok(());
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);
        Err(classify_response(status, &body))
    }
}
