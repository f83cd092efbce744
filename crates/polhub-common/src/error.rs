//! Error types shared across the polhub workspace

use thiserror::Error;

/// Result type alias for polhub operations
pub type Result<T> = std::result::Result<T, PolhubError>;

/// Main error type for polhub
#[derive(Error, Debug)]
pub enum PolhubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
