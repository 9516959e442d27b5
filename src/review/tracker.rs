//! Duplicate suppression for status messages and error reports
//!
//! The tracker separates the decision from the commit: `should_*` is a
//! read-only check and `record_*` updates the state once the caller has seen
//! the notifier's result. A failed delivery therefore cannot leave the
//! tracker half-updated.
//!
//! State lives for the process lifetime; nothing resets it.

/// Last acted-upon status message and error signature
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTracker {
    last_message: String,
    last_error_signature: String,
}

impl StatusTracker {
    /// Create a tracker with empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `message` differs from the last notified message
    pub fn should_notify(&self, message: &str) -> bool {
        message != self.last_message
    }

    /// Commit `message` as the last notified message
    pub fn record_notified(&mut self, message: impl Into<String>) {
        self.last_message = message.into();
    }

    /// Whether `signature` differs from the last reported error
    pub fn should_report_error(&self, signature: &str) -> bool {
        signature != self.last_error_signature
    }

    /// Commit `signature` as the last reported error
    pub fn record_error_reported(&mut self, signature: impl Into<String>) {
        self.last_error_signature = signature.into();
    }

    /// Last notified message, empty if none yet
    pub fn last_message(&self) -> &str {
        &self.last_message
    }

    /// Last reported error signature, empty if none yet
    pub fn last_error_signature(&self) -> &str {
        &self.last_error_signature
    }
}
