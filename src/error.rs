//! Unified error handling for review-watcher
//!
//! Domain errors live next to the code that raises them; this module wraps
//! them in a single [`Error`] and classifies every failure into one
//! [`ErrorKind`]. The kind decides how the poll loop reacts and, together
//! with the message, forms the signature used to suppress repeated reports.
//!
//! # Usage
//!
//! ```rust
//! use review_watcher::error::{Error, ErrorKind, WatcherErrorTrait};
//! use review_watcher::api::ApiError;
//!
//! let err: Error = ApiError::WrongStatus { status: 500 }.into();
//! assert_eq!(err.kind(), ErrorKind::WrongStatus);
//! assert!(err.is_recoverable());
//! assert_eq!(err.signature(), "WrongStatusError: API returned HTTP 500 instead of 200");
//! ```

use std::fmt;
use thiserror::Error;

pub use crate::api::{ApiError, SchemaError};
pub use crate::config::ConfigError;
pub use crate::notifications::ChannelError;
pub use crate::review::InterpretError;

/// Common trait for review-watcher error types
pub trait WatcherErrorTrait: std::error::Error {
    /// Whether the poll loop can carry on after this error
    fn is_recoverable(&self) -> bool {
        self.kind().is_recoverable()
    }

    /// Taxonomy entry for this error
    fn kind(&self) -> ErrorKind;

    /// Deduplication key reported to the operator
    fn signature(&self) -> String {
        format!("{}: {self}", self.kind().as_str())
    }
}

/// Error taxonomy of the poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Network, DNS, or timeout failure
    Transport,
    /// API answered with a status other than 200
    WrongStatus,
    /// Response or record failed structural checks
    Schema,
    /// Record carried a status outside the verdict set
    UnknownStatus,
    /// Outbound notification could not be delivered
    NotificationDelivery,
    /// Required startup configuration missing or invalid
    Configuration,
}

impl ErrorKind {
    /// Stable name used in signatures and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "TransportError",
            Self::WrongStatus => "WrongStatusError",
            Self::Schema => "SchemaError",
            Self::UnknownStatus => "UnknownStatusError",
            Self::NotificationDelivery => "NotificationDeliveryError",
            Self::Configuration => "ConfigurationError",
        }
    }

    /// Only configuration problems stop the process
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Configuration)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for review-watcher
#[derive(Error, Debug)]
pub enum Error {
    /// Polling the status API failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The latest homework entry could not be interpreted
    #[error(transparent)]
    Interpret(#[from] InterpretError),

    /// Sending a notification failed
    #[error("notification delivery failed: {0}")]
    Delivery(#[from] ChannelError),

    /// Startup configuration is unusable
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Self::Api(ApiError::Schema(err))
    }
}

impl WatcherErrorTrait for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Api(ApiError::Transport { .. }) => ErrorKind::Transport,
            Self::Api(ApiError::WrongStatus { .. }) => ErrorKind::WrongStatus,
            Self::Api(ApiError::Schema(_)) => ErrorKind::Schema,
            Self::Interpret(InterpretError::UnknownStatus(_)) => ErrorKind::UnknownStatus,
            Self::Interpret(_) => ErrorKind::Schema,
            Self::Delivery(_) => ErrorKind::NotificationDelivery,
            Self::Config(_) => ErrorKind::Configuration,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
