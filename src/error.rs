//! Error types for the spending tracker

use thiserror::Error;

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Error, Debug)]
pub enum TrackerError {
    // =============================
    // Pipeline Errors
    // =============================

    #[error("Banking API returned {status} for {url}: {body}")]
    FetchError {
        status: reqwest::StatusCode,
        url: String,
        body: String,
    },

    #[error("Invalid transaction record: {0}")]
    InvalidRecord(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
