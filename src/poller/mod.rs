//! Poll loop orchestration
//!
//! One cycle runs to completion before the next begins:
//!
//! ```text
//! fetch(cursor) ──► status == 200? ──► validate ──► interpret latest ──► dedup ──► notify
//!      │                 │                 │              │
//!      └─ transport ─────┴─ wrong status ──┴─ schema ─────┴─ unknown status
//!                            │                                   │
//!                     error dedup/report               error dedup/report
//!                     cursor unchanged                 cursor advances
//! ```
//!
//! Every cycle ends in a [`CycleOutcome`], which maps to exactly one
//! [`LoopAction`]. The only blocking calls are the API request and the
//! notification; the fixed interval sleep is the only scheduling.

pub mod cursor;

use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::api::{validate, ApiClient, ApiError, PollResponse};
use crate::error::{Error, WatcherErrorTrait};
use crate::metrics;
use crate::notifications::{ChannelError, Notifier};
use crate::review::{interpret_latest, Interpretation, StatusTracker};

pub use cursor::Cursor;

/// Operator message for a reported error
pub fn error_message(signature: &str) -> String {
    format!("Program malfunction: {signature}")
}

/// What the loop does after a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    /// Sleep and poll again
    Continue,
    /// An error was handled; sleep and poll again
    ContinueAfterError,
    /// Stop the process
    Abort,
}

/// Result of a single poll cycle
#[derive(Debug)]
pub enum CycleOutcome {
    /// A new status message was sent to the notifier
    Notified { message: String, delivered: bool },
    /// The latest status equals the last notified one
    Unchanged,
    /// The poll window contained no homeworks
    NoHomeworks,
    /// A new error was sent to the notifier
    ErrorReported { signature: String, delivered: bool },
    /// The error repeats the last reported one
    ErrorSuppressed { signature: String },
    /// Unrecoverable error
    Fatal(Error),
}

impl CycleOutcome {
    /// Loop action for this outcome
    pub fn action(&self) -> LoopAction {
        match self {
            Self::Notified { .. } | Self::Unchanged | Self::NoHomeworks => LoopAction::Continue,
            Self::ErrorReported { .. } | Self::ErrorSuppressed { .. } => {
                LoopAction::ContinueAfterError
            }
            Self::Fatal(_) => LoopAction::Abort,
        }
    }

    /// Short label for metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::Notified { .. } => "notified",
            Self::Unchanged => "unchanged",
            Self::NoHomeworks => "no_homeworks",
            Self::ErrorReported { .. } => "error_reported",
            Self::ErrorSuppressed { .. } => "error_suppressed",
            Self::Fatal(_) => "fatal",
        }
    }
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let delivery = |delivered: &bool| if *delivered { "delivered" } else { "delivery failed" };
        match self {
            Self::Notified { message, delivered } => {
                write!(f, "notified ({}): {message}", delivery(delivered))
            }
            Self::Unchanged => write!(f, "status unchanged"),
            Self::NoHomeworks => write!(f, "no homeworks in window"),
            Self::ErrorReported {
                signature,
                delivered,
            } => write!(f, "error reported ({}): {signature}", delivery(delivered)),
            Self::ErrorSuppressed { signature } => {
                write!(f, "repeated error suppressed: {signature}")
            }
            Self::Fatal(err) => write!(f, "fatal: {err}"),
        }
    }
}

/// Poll loop state: collaborators, cursor, and dedup tracker
pub struct Poller<C, N> {
    client: C,
    notifier: N,
    tracker: StatusTracker,
    cursor: Cursor,
    interval: Duration,
}

impl<C: ApiClient, N: Notifier> Poller<C, N> {
    /// Create a poller starting at `cursor`
    pub fn new(client: C, notifier: N, cursor: Cursor, interval: Duration) -> Self {
        Self {
            client,
            notifier,
            tracker: StatusTracker::new(),
            cursor,
            interval,
        }
    }

    /// Current cursor
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Dedup state
    pub fn tracker(&self) -> &StatusTracker {
        &self.tracker
    }

    /// Notifier in use
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Sleep between cycles
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run cycles until `shutdown` resolves or an unrecoverable error occurs
    pub async fn run<F>(&mut self, shutdown: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        tracing::info!(
            cursor = %self.cursor,
            interval_secs = self.interval.as_secs(),
            notifier = self.notifier.name(),
            "Poller started"
        );

        loop {
            let outcome = self.poll_once().await;
            match outcome {
                CycleOutcome::Fatal(err) => {
                    tracing::error!(error = %err, "Unrecoverable error, stopping poller");
                    return Err(err);
                }
                ref outcome => {
                    tracing::debug!(action = ?outcome.action(), %outcome, "Poll cycle finished");
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = &mut shutdown => {
                    tracing::info!(cursor = %self.cursor, "Shutdown requested, poller stopped");
                    return Ok(());
                }
            }
        }
    }

    /// Run a single poll cycle
    #[tracing::instrument(name = "poll_cycle", skip_all, fields(from_date = %self.cursor))]
    pub async fn poll_once(&mut self) -> CycleOutcome {
        let outcome = match self.fetch_validated().await {
            Err(err) => self.handle_error(err).await,
            Ok(response) => {
                let outcome = match interpret_latest(&response) {
                    Ok(Interpretation::Verdict(message)) => self.handle_verdict(message).await,
                    Ok(Interpretation::NoHomeworks) => {
                        tracing::debug!("No new homework statuses");
                        CycleOutcome::NoHomeworks
                    }
                    Err(err) => self.handle_error(err.into()).await,
                };
                // Semantic failures still move the window forward.
                self.advance_cursor(response.current_date);
                outcome
            }
        };

        metrics::record_poll(outcome.label());
        outcome
    }

    async fn fetch_validated(&self) -> Result<PollResponse, Error> {
        let reply = self.client.fetch(self.cursor.value()).await?;
        if !reply.is_ok() {
            return Err(ApiError::WrongStatus {
                status: reply.status,
            }
            .into());
        }
        Ok(validate(&reply.body)?)
    }

    async fn handle_verdict(&mut self, message: String) -> CycleOutcome {
        if !self.tracker.should_notify(&message) {
            tracing::debug!("Status unchanged since last notification");
            return CycleOutcome::Unchanged;
        }

        let delivered = self.deliver(&message).await;
        self.tracker.record_notified(message.clone());
        CycleOutcome::Notified { message, delivered }
    }

    async fn handle_error(&mut self, err: Error) -> CycleOutcome {
        metrics::record_error(err.kind());

        if !err.is_recoverable() {
            return CycleOutcome::Fatal(err);
        }

        let signature = err.signature();
        tracing::error!(kind = %err.kind(), error = %err, "Poll cycle failed");

        if !self.tracker.should_report_error(&signature) {
            tracing::debug!(%signature, "Error already reported, not notifying again");
            return CycleOutcome::ErrorSuppressed { signature };
        }

        let delivered = self.deliver(&error_message(&signature)).await;
        self.tracker.record_error_reported(signature.clone());
        CycleOutcome::ErrorReported {
            signature,
            delivered,
        }
    }

    /// Send `text`; failures are logged and never re-notified
    async fn deliver(&self, text: &str) -> bool {
        let result = match self.notifier.send(text).await {
            Ok(status) if status.success => Ok(status),
            Ok(status) => Err(ChannelError::Rejected(status.to_string())),
            Err(err) => Err(err),
        };

        match result {
            Ok(status) => {
                tracing::info!(%status, %text, "Notification sent");
                metrics::record_notification(true);
                true
            }
            Err(err) => {
                let err = Error::from(err);
                metrics::record_error(err.kind());
                metrics::record_notification(false);
                tracing::error!(
                    kind = %err.kind(),
                    error = %err,
                    channel = self.notifier.name(),
                    "Failed to send notification"
                );
                false
            }
        }
    }

    fn advance_cursor(&mut self, current_date: i64) {
        if self.cursor.advance_to(current_date) {
            tracing::debug!(cursor = current_date, "Cursor advanced");
            metrics::set_cursor(current_date);
        } else if current_date < self.cursor.value() {
            tracing::warn!(
                current_date,
                cursor = %self.cursor,
                "Server date is behind the cursor, keeping cursor"
            );
        }
    }
}
