use serde::Deserialize;

/// Default endpoint of the homework review status API.
pub const DEFAULT_REVIEW_API_ENDPOINT: &str =
    "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// OAuth token for the homework review status API
    pub practicum_token: String,

    /// Telegram bot token used for message delivery
    pub telegram_token: String,

    /// Telegram chat that receives all notifications
    pub telegram_chat_id: String,

    /// Homework status API endpoint (default: production Practicum URL)
    pub review_api_endpoint: String,

    /// Seconds to sleep between poll iterations (default: 600)
    pub poll_interval_secs: u64,

    /// Timeout for both HTTP clients in seconds (default: 10)
    pub http_timeout_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// The three secrets are required; absence of any is a startup error
    /// and the caller must exit before entering the poll loop.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            practicum_token: std::env::var("PRACTICUM_TOKEN")
                .map_err(|_| anyhow::anyhow!("PRACTICUM_TOKEN environment variable is required"))?,
            telegram_token: std::env::var("TELEGRAM_TOKEN")
                .map_err(|_| anyhow::anyhow!("TELEGRAM_TOKEN environment variable is required"))?,
            telegram_chat_id: std::env::var("TELEGRAM_CHAT_ID").map_err(|_| {
                anyhow::anyhow!("TELEGRAM_CHAT_ID environment variable is required")
            })?,
            review_api_endpoint: std::env::var("REVIEW_API_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_REVIEW_API_ENDPOINT.to_string()),
            poll_interval_secs: std::env::var("POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "600".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("POLL_INTERVAL_SECS must be a valid u64"))?,
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("HTTP_TIMEOUT_SECS must be a valid u64"))?,
        })
    }
}
