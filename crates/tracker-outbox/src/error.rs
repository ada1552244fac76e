//! Outbox error types.

use thiserror::Error;

/// Outbox error type.
#[derive(Error, Debug)]
pub enum OutboxError {
    /// The event could not be serialized. It is dropped, never queued.
    #[error("Encoding failed: {0}")]
    Encoding(#[source] tracker_events::PayloadError),

    /// A queued entry could not be parsed back into an event.
    #[error("Decoding failed: {0}")]
    Decoding(#[source] tracker_events::PayloadError),

    /// Network-level failure reported by a transport
    #[error("Transport error: {0}")]
    Transport(String),

    /// HTTP client error (connection, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The collector answered with a 5xx status
    #[error("Collector returned HTTP {0}")]
    Server(u16),

    /// A queued event outlived the retry window
    #[error("Event {event_id} is stale ({age_ms} ms old)")]
    StaleEvent { event_id: String, age_ms: i64 },

    /// Durable store error
    #[error("Storage error: {0}")]
    Storage(#[from] tracker_storage::StorageError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] tracker_config_and_utils::ConfigError),

    /// The tracker was started outside a Tokio runtime
    #[error("No Tokio runtime available to run the tracker")]
    NoRuntime,
}

impl OutboxError {
    /// Whether the failure warrants putting the event back in the retry queue.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OutboxError::Transport(_) | OutboxError::Http(_) | OutboxError::Server(_)
        )
    }
}

/// Result type alias using OutboxError.
pub type OutboxResult<T> = Result<T, OutboxError>;
