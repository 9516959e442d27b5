//! Configuration management for review-watcher
//!
//! Values come from an optional TOML file and from environment variables,
//! with the environment taking precedence. Credentials have no defaults; a
//! missing one is a fatal startup error reported before the poll loop runs.
//!
//! | Variable | Field |
//! |---|---|
//! | `PRACTICUM_TOKEN` | `api.token` |
//! | `PRACTICUM_ENDPOINT` | `api.endpoint` |
//! | `REVIEW_REQUEST_TIMEOUT` | `api.request_timeout_secs` |
//! | `TELEGRAM_TOKEN` | `telegram.token` |
//! | `TELEGRAM_CHAT_ID` | `telegram.chat_id` |
//! | `TELEGRAM_API_BASE` | `telegram.api_base` |
//! | `RETRY_PERIOD` | `poller.interval_secs` |
//! | `REVIEW_LOG_LEVEL` / `REVIEW_LOG_FORMAT` / `REVIEW_LOG_FILE` | `logging.*` |
//! | `REVIEW_METRICS_ADDR` | `metrics.bind_address` |

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default Practicum endpoint
pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Default Telegram Bot API base URL
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

/// Default poll interval in seconds
pub const DEFAULT_INTERVAL_SECS: u64 = 600;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// One or more required values are absent or empty
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingVariables(Vec<&'static str>),

    /// A value is present but unusable
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: String, reason: String },

    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`Config`]
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    /// Create an invalid-value error
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Homework status API
    pub api: ApiConfig,

    /// Telegram delivery
    pub telegram: TelegramConfig,

    /// Poll loop timing
    pub poller: PollerConfig,

    /// Logging output
    pub logging: LoggingConfig,

    /// Optional metrics endpoint
    pub metrics: MetricsConfig,
}

/// Homework status API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// OAuth token sent in the `Authorization` header
    pub token: String,

    /// Status endpoint URL
    pub endpoint: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Telegram channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token
    pub token: String,

    /// Target chat identifier
    pub chat_id: String,

    /// Bot API base URL
    pub api_base: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            chat_id: String::new(),
            api_base: DEFAULT_TELEGRAM_API.to_string(),
            timeout_secs: 10,
        }
    }
}

/// Poll loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Seconds to sleep between cycles
    pub interval_secs: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,

    /// Optional file receiving a copy of the log
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
            file: None,
        }
    }
}

/// Metrics endpoint configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Address for `/metrics` and `/health`; disabled when unset
    pub bind_address: Option<SocketAddr>,
}

impl Config {
    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from an optional file, apply the environment, and validate
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Overwrite fields with any non-empty environment variables
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(token) = env_string("PRACTICUM_TOKEN") {
            self.api.token = token;
        }
        if let Some(endpoint) = env_string("PRACTICUM_ENDPOINT") {
            self.api.endpoint = endpoint;
        }
        if let Some(timeout) = env_parse("REVIEW_REQUEST_TIMEOUT")? {
            self.api.request_timeout_secs = timeout;
        }

        if let Some(token) = env_string("TELEGRAM_TOKEN") {
            self.telegram.token = token;
        }
        if let Some(chat_id) = env_string("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = chat_id;
        }
        if let Some(api_base) = env_string("TELEGRAM_API_BASE") {
            self.telegram.api_base = api_base;
        }

        if let Some(interval) = env_parse("RETRY_PERIOD")? {
            self.poller.interval_secs = interval;
        }

        if let Some(level) = env_string("REVIEW_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = env_string("REVIEW_LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Some(file) = env_string("REVIEW_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(file));
        }

        if let Some(addr) = env_parse("REVIEW_METRICS_ADDR")? {
            self.metrics.bind_address = Some(addr);
        }

        Ok(())
    }

    /// Names of required values that are still empty
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let required = [
            ("PRACTICUM_TOKEN", &self.api.token),
            ("TELEGRAM_TOKEN", &self.telegram.token),
            ("TELEGRAM_CHAT_ID", &self.telegram.chat_id),
        ];

        required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing = self.missing_credentials();
        if !missing.is_empty() {
            return Err(ConfigError::MissingVariables(missing));
        }

        validate_http_url("api.endpoint", &self.api.endpoint)?;
        validate_http_url("telegram.api_base", &self.telegram.api_base)?;

        if self.api.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "api.request_timeout_secs",
                "must be greater than 0",
            ));
        }

        if self.telegram.timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "telegram.timeout_secs",
                "must be greater than 0",
            ));
        }

        if self.poller.interval_secs == 0 {
            return Err(ConfigError::invalid(
                "poller.interval_secs",
                "must be greater than 0",
            ));
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(ConfigError::invalid(
                "logging.format",
                format!("expected `text` or `json`, got `{}`", self.logging.format),
            ));
        }

        Ok(())
    }

    /// Poll interval as Duration
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poller.interval_secs)
    }

    /// Human-readable summary with secrets masked
    pub fn redacted_summary(&self) -> String {
        format!(
            "endpoint: {}\n\
             practicum token: {}\n\
             telegram api: {}\n\
             telegram token: {}\n\
             telegram chat: {}\n\
             poll interval: {}s\n\
             request timeout: {}s\n\
             log: {} ({}){}\n\
             metrics: {}",
            self.api.endpoint,
            mask(&self.api.token),
            self.telegram.api_base,
            mask(&self.telegram.token),
            self.telegram.chat_id,
            self.poller.interval_secs,
            self.api.request_timeout_secs,
            self.logging.level,
            self.logging.format,
            self.logging
                .file
                .as_ref()
                .map(|p| format!(" -> {}", p.display()))
                .unwrap_or_default(),
            self.metrics
                .bind_address
                .map(|a| a.to_string())
                .unwrap_or_else(|| "disabled".to_string()),
        )
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    env_string(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::invalid(name, format!("`{raw}`: {e}")))
        })
        .transpose()
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value).map_err(|e| ConfigError::invalid(field, e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(
            field,
            "URL must start with http:// or https://",
        ));
    }
    Ok(())
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}
