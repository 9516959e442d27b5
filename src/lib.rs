//! review-watcher - homework review status notifier
//!
//! Polls the Practicum homework status API on a fixed interval, detects when
//! the review status of the latest homework changes, and reports it to a
//! Telegram chat. Repeated statuses and repeated errors are reported once.
//!
//! # Architecture
//!
//! - [`api`] - status endpoint client, wire models, and response validation
//! - [`review`] - status interpretation and duplicate suppression
//! - [`poller`] - the poll/validate/diff/notify cycle and its cursor
//! - [`notifications`] - notifier seam and the Telegram channel
//! - [`config`] - environment and TOML configuration
//! - [`error`] - unified error type and error taxonomy
//! - [`metrics`] - Prometheus counters and the metrics endpoint
//!
//! # Example
//!
//! ```no_run
//! use review_watcher::api::PracticumClient;
//! use review_watcher::config::Config;
//! use review_watcher::notifications::TelegramChannel;
//! use review_watcher::poller::{Cursor, Poller};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     let client = PracticumClient::new(&config.api)?;
//!     let notifier = TelegramChannel::new(&config.telegram)?;
//!     let mut poller = Poller::new(client, notifier, Cursor::now(), config.poll_interval());
//!     poller.run(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod notifications;
pub mod poller;
pub mod review;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{ApiClient, ApiReply, PracticumClient, PollResponse, ReviewStatus};
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorKind, Result, WatcherErrorTrait};
    pub use crate::notifications::{DeliveryStatus, Notifier, TelegramChannel};
    pub use crate::poller::{CycleOutcome, Cursor, LoopAction, Poller};
    pub use crate::review::StatusTracker;
}
