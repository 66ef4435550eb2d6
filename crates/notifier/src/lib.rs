//! Chat delivery for status notifications.
//!
//! The poll loop only ever hands a notifier a fully formatted text message;
//! delivery failures come back as `AppError::Delivery` and are the caller's
//! to log and swallow.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use homework_common::error::{AppError, Result};

/// Something that can deliver a text message to a chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, chat_id: &str, text: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageReply {
    ok: bool,
    description: Option<String>,
}

/// Notifier backed by the Telegram Bot API `sendMessage` method.
pub struct TelegramNotifier {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl TelegramNotifier {
    pub fn new(http: reqwest::Client, api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url, self.token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, chat_id: &str, text: &str) -> Result<()> {
        let response = self
            .http
            .post(self.send_message_url())
            .json(&SendMessageRequest { chat_id, text })
            .send()
            .await
            // reqwest errors embed the url, which carries the bot token
            .map_err(|e| AppError::Delivery(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Delivery(e.without_url().to_string()))?;
        let reply: Option<SendMessageReply> = serde_json::from_str(&body).ok();

        match reply {
            Some(SendMessageReply { ok: true, .. }) if status.is_success() => {
                tracing::info!(chat_id, text, "Message sent");
                Ok(())
            }
            Some(SendMessageReply { description, .. }) => Err(AppError::Delivery(format!(
                "Telegram rejected the message (status {}): {}",
                status.as_u16(),
                description.unwrap_or_else(|| "no description".to_string())
            ))),
            None => Err(AppError::Delivery(format!(
                "Unexpected Telegram reply (status {})",
                status.as_u16()
            ))),
        }
    }
}
