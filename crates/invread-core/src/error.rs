//! Error types for the invread-core library.

use thiserror::Error;

/// Main error type for the invread library.
#[derive(Error, Debug)]
pub enum InvreadError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for the invread library.
pub type Result<T> = std::result::Result<T, InvreadError>;
