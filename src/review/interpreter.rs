//! Turns the most recent homework entry into an operator message

use serde_json::Value;
use thiserror::Error;

use crate::api::models::{HomeworkRecord, PollResponse};

/// Errors raised while interpreting a homework entry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpretError {
    /// Required key absent from the entry
    #[error("homework entry has no `{0}` field")]
    MissingField(&'static str),

    /// Required key present with a non-string value
    #[error("homework entry field `{0}` is not a string")]
    WrongFieldType(&'static str),

    /// Status outside the known verdict set
    #[error("unknown review status \"{0}\"")]
    UnknownStatus(String),
}

/// Result of interpreting one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpretation {
    /// The latest entry produced a message
    Verdict(String),

    /// The poll window held no entries
    NoHomeworks,
}

/// Build the operator message for a checked record
pub fn verdict_message(record: &HomeworkRecord) -> String {
    format!(
        "Changed status of review \"{}\". {}",
        record.name,
        record.status.verdict()
    )
}

/// Interpret a raw homework entry
pub fn interpret(entry: &Value) -> Result<String, InterpretError> {
    let record = HomeworkRecord::from_value(entry)?;
    Ok(verdict_message(&record))
}

/// Interpret only the most recent entry of a validated response
pub fn interpret_latest(response: &PollResponse) -> Result<Interpretation, InterpretError> {
    match response.latest() {
        Some(entry) => interpret(entry).map(Interpretation::Verdict),
        None => Ok(Interpretation::NoHomeworks),
    }
}
