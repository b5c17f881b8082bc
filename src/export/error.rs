//! Error types for the export module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for export operations
#[derive(Debug, Error)]
pub enum ExportError {
    /// Output file could not be created or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unknown export format name
    #[error("Unknown export format: {0}")]
    UnknownFormat(String),
}

impl From<ExportError> for CrateError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Io(e) => CrateError::Io(e),
            ExportError::Json(e) => CrateError::Json(e),
            other => CrateError::Export(other.to_string()),
        }
    }
}
