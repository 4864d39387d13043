use std::time::Duration;

use reviewbot_client::StatusClient;
use reviewbot_common::config::AppConfig;
use reviewbot_notifier::TelegramNotifier;
use reviewbot_poller::watcher::Watcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reviewbot_poller=info,reviewbot_client=debug".into()),
        )
        .json()
        .init();

    tracing::info!("ReviewBot starting...");

    // Load configuration; missing secrets abort before the loop starts
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "configuration incomplete, refusing to start");
            return Err(e);
        }
    };

    let timeout = Duration::from_secs(config.http_timeout_secs);

    let client = StatusClient::new(
        config.review_api_endpoint.clone(),
        config.practicum_token.clone(),
        timeout,
    )?;
    let notifier = TelegramNotifier::new(
        config.telegram_token.clone(),
        config.telegram_chat_id.clone(),
        timeout,
    )?;

    let mut watcher = Watcher::new(
        client,
        notifier,
        Duration::from_secs(config.poll_interval_secs),
    );

    // Run with graceful shutdown on Ctrl+C
    tokio::select! {
        result = watcher.run() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "review watcher exited with error");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping gracefully...");
        }
    }

    tracing::info!("ReviewBot stopped.");
    Ok(())
}
