//! HTTP client for the Practicum homework status endpoint
//!
//! One GET per poll, `from_date` as the only query parameter and a static
//! `Authorization: OAuth <token>` header. There is no retry here; the poll
//! loop re-invokes the client on its fixed interval.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use std::time::Duration;

use super::error::ApiError;
use crate::config::{ApiConfig, ConfigError};

/// Raw answer from the status endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply {
    /// HTTP status code
    pub status: u16,

    /// Undecoded body
    pub body: Bytes,
}

impl ApiReply {
    /// Create a reply from a status code and body
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the server answered 200
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Source of poll responses
///
/// Implementations return `Ok` for any HTTP answer, whatever its status
/// code, and `Err` only when no answer was received.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Fetch homework statuses changed since `from_date`
    async fn fetch(&self, from_date: i64) -> Result<ApiReply, ApiError>;
}

/// reqwest-backed client for the real endpoint
pub struct PracticumClient {
    /// HTTP client with the auth header preinstalled
    client: Client,

    /// Full endpoint URL
    endpoint: String,
}

impl PracticumClient {
    /// Create a client from API configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the token cannot be sent as a
    /// header value or the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ConfigError> {
        Self::with_timeout(
            &config.endpoint,
            &config.token,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Create a client for an explicit endpoint and token
    pub fn with_timeout(
        endpoint: &str,
        token: &str,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let mut auth = HeaderValue::from_str(&format!("OAuth {token}")).map_err(|_| {
            ConfigError::invalid("api.token", "contains characters not allowed in a header")
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .user_agent(concat!("review-watcher/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::invalid("api", format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    /// Endpoint this client polls
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ApiClient for PracticumClient {
    async fn fetch(&self, from_date: i64) -> Result<ApiReply, ApiError> {
        tracing::debug!(endpoint = %self.endpoint, from_date, "Requesting homework statuses");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("from_date", from_date)])
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;

        tracing::debug!(status, bytes = body.len(), "Received API response");

        Ok(ApiReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_status() {
        assert!(ApiReply::new(200, "{}").is_ok());
        assert!(!ApiReply::new(204, "").is_ok());
        assert!(!ApiReply::new(500, "oops").is_ok());
    }

    #[test]
    fn test_client_creation() {
        let client = PracticumClient::with_timeout(
            "https://example.com/api/",
            "token",
            Duration::from_secs(5),
        );
        assert!(client.is_ok());
        assert_eq!(client.unwrap().endpoint(), "https://example.com/api/");
    }

    #[test]
    fn test_token_with_newline_is_rejected() {
        let client = PracticumClient::with_timeout(
            "https://example.com/",
            "bad\ntoken",
            Duration::from_secs(5),
        );
        assert!(matches!(client, Err(ConfigError::Invalid { .. })));
    }
}
