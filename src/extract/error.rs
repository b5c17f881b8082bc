//! Error types for the extract module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for selector compilation and field extraction
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A configured CSS selector does not parse
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector {
        /// The selector text as configured
        selector: String,
        /// Parser message
        message: String,
    },

    /// The price chain has no strategies
    #[error("Price strategy chain is empty")]
    EmptyPriceChain,

    /// Selector file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Selector file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ExtractError> for CrateError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Io(e) => CrateError::Io(e),
            ExtractError::Json(e) => CrateError::Json(e),
            _ => CrateError::Extract(err.to_string()),
        }
    }
}
