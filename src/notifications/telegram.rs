//! Telegram Bot API channel
//!
//! Messages go out through `POST {api_base}/bot{token}/sendMessage`. A
//! delivery counts as successful only when the HTTP status is a success and
//! the reply carries `"ok": true`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChannelError, ChannelResult, DeliveryStatus, Notifier};
use crate::config::TelegramConfig;

/// Body of a `sendMessage` call
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Envelope every Bot API method replies with
#[derive(Debug, Deserialize)]
struct BotReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    result: Option<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// Telegram notification channel
pub struct TelegramChannel {
    client: Client,
    send_url: String,
    chat_id: String,
}

impl TelegramChannel {
    /// Create a channel from configuration
    pub fn new(config: &TelegramConfig) -> ChannelResult<Self> {
        if config.token.trim().is_empty() {
            return Err(ChannelError::InvalidConfig(
                "bot token cannot be empty".to_string(),
            ));
        }
        if config.chat_id.trim().is_empty() {
            return Err(ChannelError::InvalidConfig(
                "chat id cannot be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ChannelError::InvalidConfig(format!("Failed to create HTTP client: {e}"))
            })?;

        let send_url = format!(
            "{}/bot{}/sendMessage",
            config.api_base.trim_end_matches('/'),
            config.token
        );

        Ok(Self {
            client,
            send_url,
            chat_id: config.chat_id.clone(),
        })
    }

    /// Chat the channel delivers to
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }
}

#[async_trait]
impl Notifier for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, text: &str) -> ChannelResult<DeliveryStatus> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
        };

        let response = self
            .client
            .post(&self.send_url)
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // The Bot API explains client errors in the JSON description.
            let detail = serde_json::from_str::<BotReply>(&body)
                .ok()
                .and_then(|reply| reply.description)
                .unwrap_or(body);
            return Err(ChannelError::Status {
                status: status.as_u16(),
                body: detail,
            });
        }

        let reply: BotReply = serde_json::from_str(&body)?;
        if !reply.ok {
            return Err(ChannelError::Rejected(
                reply
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            ));
        }

        tracing::debug!(chat_id = %self.chat_id, "Telegram message delivered");

        Ok(match reply.result {
            Some(sent) => DeliveryStatus::success_with_message(
                "telegram",
                format!("message_id {}", sent.message_id),
            ),
            None => DeliveryStatus::success("telegram"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TelegramConfig {
        TelegramConfig {
            token: "123:abc".to_string(),
            chat_id: "42".to_string(),
            api_base: "https://api.telegram.org/".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_send_url_built_from_base_and_token() {
        let channel = TelegramChannel::new(&config()).unwrap();
        assert_eq!(
            channel.send_url,
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
        assert_eq!(channel.chat_id(), "42");
        assert_eq!(channel.name(), "telegram");
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let mut cfg = config();
        cfg.token = String::new();
        assert!(matches!(
            TelegramChannel::new(&cfg),
            Err(ChannelError::InvalidConfig(_))
        ));

        let mut cfg = config();
        cfg.chat_id = " ".to_string();
        assert!(matches!(
            TelegramChannel::new(&cfg),
            Err(ChannelError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_payload_shape() {
        let payload = SendMessage {
            chat_id: "42",
            text: "hi",
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"chat_id": "42", "text": "hi"}));
    }

    #[test]
    fn test_reply_parsing() {
        let body = r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#;
        let reply: BotReply = serde_json::from_str(body).unwrap();
        assert!(!reply.ok);
        assert_eq!(reply.description.as_deref(), Some("Bad Request: chat not found"));
    }
}
