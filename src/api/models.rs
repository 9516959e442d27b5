//! Wire and domain types for the homework status API
//!
//! The validator only checks the envelope of a poll response, so individual
//! homework entries stay as raw JSON until [`HomeworkRecord::from_value`]
//! lifts the one the poller actually looks at.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::review::InterpretError;

/// JSON key holding the homework name in API records
pub const NAME_FIELD: &str = "homework_name";

/// JSON key holding the review status in API records
pub const STATUS_FIELD: &str = "status";

/// A structurally validated poll response
#[derive(Debug, Clone, PartialEq)]
pub struct PollResponse {
    /// Homework entries in server order, most recent first
    pub homeworks: Vec<Value>,

    /// Server timestamp to use as the next `from_date`
    pub current_date: i64,
}

impl PollResponse {
    /// The most recent homework entry, if the window contained any
    pub fn latest(&self) -> Option<&Value> {
        self.homeworks.first()
    }
}

/// Review status reported by the API
///
/// This is a closed set: anything else coming from the server is rejected
/// with [`InterpretError::UnknownStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    /// Reviewer accepted the work
    Approved,
    /// Work is being reviewed
    Reviewing,
    /// Reviewer returned the work with remarks
    Rejected,
}

impl ReviewStatus {
    /// All statuses known to the API
    pub const ALL: [ReviewStatus; 3] = [Self::Approved, Self::Reviewing, Self::Rejected];

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Reviewing => "reviewing",
            Self::Rejected => "rejected",
        }
    }

    /// Human-readable verdict sent to the operator
    pub fn verdict(&self) -> &'static str {
        match self {
            Self::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Self::Reviewing => "Работа взята на проверку ревьюером.",
            Self::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = InterpretError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Self::Approved),
            "reviewing" => Ok(Self::Reviewing),
            "rejected" => Ok(Self::Rejected),
            other => Err(InterpretError::UnknownStatus(other.to_string())),
        }
    }
}

/// A single homework entry with its required fields checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeworkRecord {
    /// Homework identifier as shown to the student
    pub name: String,

    /// Current review status
    pub status: ReviewStatus,
}

impl HomeworkRecord {
    /// Extract a record from a raw API entry
    ///
    /// Checks run in a fixed order: name presence, name type, status
    /// presence, status type, then membership in the known status set.
    /// Extra keys are ignored.
    pub fn from_value(value: &Value) -> Result<Self, InterpretError> {
        let name = match value.get(NAME_FIELD) {
            None => return Err(InterpretError::MissingField(NAME_FIELD)),
            Some(Value::String(name)) => name.clone(),
            Some(_) => return Err(InterpretError::WrongFieldType(NAME_FIELD)),
        };

        let status = match value.get(STATUS_FIELD) {
            None => return Err(InterpretError::MissingField(STATUS_FIELD)),
            Some(Value::String(status)) => status.parse()?,
            Some(_) => return Err(InterpretError::WrongFieldType(STATUS_FIELD)),
        };

        Ok(Self { name, status })
    }
}
