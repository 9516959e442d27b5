//! Structural validation of poll responses
//!
//! Rules are applied in order and the first failure wins:
//!
//! 1. the body is a JSON object
//! 2. `homeworks` is present and is an array
//! 3. `current_date` is present and is an integer
//!
//! Nothing else is checked here; unknown keys are ignored and homework
//! entries are left for the interpreter.

use serde_json::{Map, Value};

use super::error::SchemaError;
use super::models::PollResponse;

/// Key of the homework list in a poll response
pub const HOMEWORKS_FIELD: &str = "homeworks";

/// Key of the server timestamp in a poll response
pub const CURRENT_DATE_FIELD: &str = "current_date";

/// Validate a raw response body
pub fn validate(body: &[u8]) -> Result<PollResponse, SchemaError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| SchemaError::InvalidJson(e.to_string()))?;
    validate_value(value)
}

/// Validate an already decoded payload
pub fn validate_value(value: Value) -> Result<PollResponse, SchemaError> {
    let Value::Object(mut object) = value else {
        return Err(SchemaError::NotAnObject);
    };

    let homeworks = match object.remove(HOMEWORKS_FIELD) {
        Some(Value::Array(items)) => items,
        _ => return Err(SchemaError::MissingOrWrongTypeField(HOMEWORKS_FIELD)),
    };

    let current_date = integer_field(&object, CURRENT_DATE_FIELD)?;

    Ok(PollResponse {
        homeworks,
        current_date,
    })
}

fn integer_field(object: &Map<String, Value>, key: &'static str) -> Result<i64, SchemaError> {
    object
        .get(key)
        .and_then(Value::as_i64)
        .ok_or(SchemaError::MissingOrWrongTypeField(key))
}
