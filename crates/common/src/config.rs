use std::path::PathBuf;

use crate::error::{AppError, Result};

pub const DEFAULT_PRACTICUM_ENDPOINT: &str =
    "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Secrets required to talk to the status API and the chat.
#[derive(Clone)]
pub struct Credentials {
    /// OAuth token for the homework status API
    pub practicum_token: String,

    /// Telegram bot token
    pub telegram_token: String,

    /// Chat that receives notifications
    pub chat_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"***")
            .field("telegram_token", &"***")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: Credentials,

    /// Homework status endpoint
    pub practicum_endpoint: String,

    /// Telegram Bot API base url
    pub telegram_api_url: String,

    /// Delay between poll iterations in seconds (default: 600)
    pub retry_interval_secs: u64,

    /// Per-request HTTP timeout in seconds (default: 30)
    pub request_timeout_secs: u64,

    /// Probe the status endpoint once before entering the poll loop
    pub startup_probe: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials {
            practicum_token: required(&lookup, "PRACTICUM_TOKEN")?,
            telegram_token: required(&lookup, "TELEGRAM_TOKEN")?,
            chat_id: required(&lookup, "CHAT_ID")?,
        };

        Ok(Self {
            credentials,
            practicum_endpoint: lookup("PRACTICUM_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_PRACTICUM_ENDPOINT.to_string()),
            telegram_api_url: lookup("TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            retry_interval_secs: parsed(&lookup, "RETRY_INTERVAL_SECS", 600)?,
            request_timeout_secs: parsed(&lookup, "REQUEST_TIMEOUT_SECS", 30)?,
            startup_probe: parsed(&lookup, "STARTUP_PROBE", false)?,
        })
    }
}

/// Output format of the stdout log layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Logging settings, read before anything else so failures can be logged.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_file: PathBuf,
    pub format: LogFormat,
    /// Value of `RUST_LOG`, if set
    pub filter: Option<String>,
}

impl LogConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = match lookup("LOG_FORMAT").map(|v| v.to_lowercase()) {
            Some(v) if v == "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Self {
            log_file: lookup("LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("homework_bot.log")),
            format,
            filter: lookup("RUST_LOG"),
        }
    }
}

fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::MissingConfig(name.to_string())),
    }
}

fn parsed<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|_| AppError::InvalidConfig {
            name: name.to_string(),
            value,
        }),
        None => Ok(default),
    }
}
