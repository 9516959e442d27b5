//! Error types for the homework status API

use thiserror::Error;

/// Reasons a response body fails structural validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Body could not be decoded as JSON at all
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),

    /// Body decoded to a scalar or an array instead of an object
    #[error("response is not a JSON object")]
    NotAnObject,

    /// Required key absent or holding the wrong JSON type
    #[error("response field `{0}` is missing or has the wrong type")]
    MissingOrWrongTypeField(&'static str),
}

/// Errors that can occur while polling the API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Network, DNS, or timeout failure before a status code was received
    #[error("transport failure: {message}")]
    Transport { message: String, timeout: bool },

    /// Server answered with something other than 200
    #[error("API returned HTTP {status} instead of 200")]
    WrongStatus { status: u16 },

    /// Server answered 200 but the body is malformed
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ApiError {
    /// Build a transport error from a reqwest failure
    ///
    /// The request URL carries the cursor and is stripped so that the same
    /// outage produces the same message on every cycle.
    pub fn transport(err: reqwest::Error) -> Self {
        let timeout = err.is_timeout();
        let err = err.without_url();
        let message = match std::error::Error::source(&err) {
            Some(source) => format!("{err}: {source}"),
            None => err.to_string(),
        };
        Self::Transport { message, timeout }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_status_message() {
        let err = ApiError::WrongStatus { status: 500 };
        assert_eq!(err.to_string(), "API returned HTTP 500 instead of 200");
    }

    #[test]
    fn test_schema_error_is_transparent() {
        let err: ApiError = SchemaError::MissingOrWrongTypeField("homeworks").into();
        assert_eq!(
            err.to_string(),
            "response field `homeworks` is missing or has the wrong type"
        );
    }
}
