use std::time::Duration;

use homework_checker::client::PracticumClient;
use homework_checker::poller::HomeworkPoller;
use homework_common::config::{AppConfig, LogConfig};
use homework_common::logging;
use homework_notifier::TelegramNotifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    logging::init(&LogConfig::from_env())?;

    tracing::info!("Homework status bot starting...");

    // Load configuration
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Configuration is incomplete, shutting down");
            return Err(e.into());
        }
    };

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;

    let client = PracticumClient::new(
        http.clone(),
        config.practicum_endpoint.clone(),
        config.credentials.practicum_token.clone(),
    );

    if config.startup_probe
        && let Err(e) = client.probe().await
    {
        tracing::error!(error = %e, "Startup probe failed, shutting down");
        return Err(e.into());
    }

    let notifier = TelegramNotifier::new(
        http,
        config.telegram_api_url.clone(),
        config.credentials.telegram_token.clone(),
    );

    let mut poller = HomeworkPoller::new(
        client,
        notifier,
        config.credentials.chat_id.clone(),
        Duration::from_secs(config.retry_interval_secs),
    );

    tracing::info!(endpoint = %config.practicum_endpoint, "Starting homework poller");

    // Run with graceful shutdown on Ctrl+C
    tokio::select! {
        _ = poller.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping gracefully...");
        }
    }

    tracing::info!("Homework status bot stopped.");
    Ok(())
}
