//! Worker error types
//!
//! One error enum covers every failure the worker can hit: broker,
//! database, sandbox, and agent-protocol errors all funnel into
//! [`WorkerError`] so the work loop and executor can apply the
//! failure policy in one place.

/// Worker-wide error type
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Broker error: {0}")]
    Broker(#[from] lapin::Error),

    #[error("Docker error: {0}")]
    Docker(#[from] bollard::errors::Error),

    // Agent protocol errors
    #[error("Agent protocol error: {0}")]
    Protocol(String),

    #[error("Agent frame encode error: {0}")]
    FrameEncode(#[from] rmp_serde::encode::Error),

    #[error("Agent frame decode error: {0}")]
    FrameDecode(#[from] rmp_serde::decode::Error),

    #[error("Agent stream closed")]
    AgentClosed,

    #[error("Malformed queue message: {0}")]
    Message(#[from] serde_json::Error),

    // Covers decompression and raw stream I/O
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<crate::config::ConfigError> for WorkerError {
    fn from(err: crate::config::ConfigError) -> Self {
        WorkerError::Configuration(err.to_string())
    }
}

/// Result type alias using WorkerError
pub type WorkerResult<T> = Result<T, WorkerError>;
