//! Payload error types.

use thiserror::Error;

/// Error produced while encoding or decoding an event payload.
#[derive(Error, Debug)]
pub enum PayloadError {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A number attribute is NaN or infinite and has no JSON form
    #[error("Attribute {0} is not a finite number")]
    NonFiniteNumber(String),
}

/// Result type alias using PayloadError.
pub type PayloadResult<T> = Result<T, PayloadError>;
