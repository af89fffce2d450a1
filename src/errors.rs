//! Error types for engram.

use thiserror::Error;

/// Main error type for engram operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid caller input, rejected before any I/O.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Embedding service could not be reached within the configured timeout.
    #[error("Embedding service unavailable at {url}: {reason}")]
    UpstreamUnavailable { url: String, reason: String },

    /// Embedding service answered with an error status or a malformed body.
    #[error("Embedding service protocol error: {0}")]
    UpstreamProtocol(String),

    /// Embedding length does not match the configured vector dimension.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Durable storage failure.
    #[error("Storage error: {0}")]
    Storage(#[from] crate::sqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Registry lookup miss.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}
