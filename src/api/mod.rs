//! Homework status API: client, wire models, and response validation

pub mod client;
pub mod error;
pub mod models;
pub mod validator;

pub use client::{ApiClient, ApiReply, PracticumClient};
pub use error::{ApiError, SchemaError};
pub use models::{HomeworkRecord, PollResponse, ReviewStatus};
pub use validator::validate;
