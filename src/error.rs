//! Error types for the harvester crate

use thiserror::Error;

/// Result type for harvester operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for harvester operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document fetch error
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Selector compilation or extraction error
    #[error("Extract error: {0}")]
    Extract(String),

    /// Harvest pipeline error
    #[error("Harvest error: {0}")]
    Harvest(String),

    /// Export error
    #[error("Export error: {0}")]
    Export(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
