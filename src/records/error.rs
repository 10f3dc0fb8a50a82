//! Record error types
//!
//! Errors raised while turning raw JSON objects into typed records.

use thiserror::Error;

/// Errors that can occur while normalizing or decoding records
#[derive(Error, Debug)]
pub enum RecordError {
    /// A `*_timestamp` field held something other than epoch milliseconds
    #[error("Invalid timestamp in field '{field}': {value}")]
    InvalidTimestamp { field: String, value: String },

    /// The raw value was not a JSON object
    #[error("Expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    /// JSON decoding into a typed record failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for record operations
pub type RecordResult<T> = Result<T, RecordError>;
