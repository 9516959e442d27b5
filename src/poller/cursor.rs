//! Poll window cursor

use std::fmt;

/// Start of the next poll window, sent as `from_date`
///
/// Only moves forward, and only to a `current_date` taken from a validated
/// response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor(i64);

impl Cursor {
    /// Cursor at an explicit timestamp
    pub fn new(timestamp: i64) -> Self {
        Self(timestamp)
    }

    /// Cursor at the current Unix time
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp())
    }

    /// Timestamp value
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Move forward to `timestamp`
    ///
    /// Returns `true` if the cursor moved. Earlier timestamps leave it
    /// untouched.
    pub fn advance_to(&mut self, timestamp: i64) -> bool {
        if timestamp > self.0 {
            self.0 = timestamp;
            true
        } else {
            false
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
