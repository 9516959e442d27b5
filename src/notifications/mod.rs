//! Operator notifications
//!
//! The poller only needs a `send(text)` capability. [`Notifier`] is that seam;
//! [`TelegramChannel`] is the production implementation and [`LogNotifier`]
//! stands in for it on dry runs.
//!
//! Delivery failures are reported back to the caller and logged. They are
//! never turned into another notification.

pub mod telegram;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use telegram::TelegramChannel;

/// Result type for channel operations
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Errors that can occur during channel operations
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// Channel answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Channel accepted the request but refused the message
    #[error("message rejected: {0}")]
    Rejected(String),

    /// Invalid channel configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ChannelError {
    fn from(err: reqwest::Error) -> Self {
        // Bot API URLs embed the token.
        Self::Http(err.without_url())
    }
}

/// Outcome of one delivery attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryStatus {
    /// Whether the notification was delivered
    pub success: bool,
    /// Channel that handled the attempt
    pub channel: String,
    /// Optional detail about the attempt
    pub message: Option<String>,
    /// Timestamp of the attempt
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl DeliveryStatus {
    /// Create a successful delivery status
    pub fn success(channel: impl Into<String>) -> Self {
        Self {
            success: true,
            channel: channel.into(),
            message: None,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create a successful delivery status with a message
    pub fn success_with_message(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            channel: channel.into(),
            message: Some(message.into()),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create a failed delivery status
    pub fn failure(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            channel: channel.into(),
            message: Some(message.into()),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "SUCCESS" } else { "FAILED" };
        write!(f, "[{status}] {}", self.channel)?;
        if let Some(msg) = &self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

/// Capability to deliver a text message to the operator
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name used in logs and metrics
    fn name(&self) -> &str;

    /// Deliver `text`
    ///
    /// Either an `Err` or an `Ok` status with `success == false` counts as a
    /// failed delivery.
    async fn send(&self, text: &str) -> ChannelResult<DeliveryStatus>;
}

#[async_trait]
impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn send(&self, text: &str) -> ChannelResult<DeliveryStatus> {
        (**self).send(text).await
    }
}

/// Notifier that only writes messages to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, text: &str) -> ChannelResult<DeliveryStatus> {
        tracing::info!(channel = "log", %text, "Notification (dry run)");
        Ok(DeliveryStatus::success("log"))
    }
}
