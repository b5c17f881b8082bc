//! Error types for the harvest module

use crate::error::Error as CrateError;
use crate::extract::ExtractError;
use crate::source::FetchError;
use thiserror::Error;

/// Error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The catalog listing could not be fetched; the run cannot continue
    #[error("Failed to load catalog listing {url}: {source}")]
    CatalogListing {
        /// Listing URL
        url: String,
        /// Underlying fetch failure
        #[source]
        source: FetchError,
    },

    /// A single page failed to load; the unit it belongs to is skipped
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Selector compilation error
    #[error("Extract error: {0}")]
    Extract(#[from] ExtractError),

    /// The aggregator stopped listening before a producer finished
    #[error("Aggregator channel closed")]
    ChannelClosed,

    /// A spawned task could not be joined
    #[error("Task join error: {0}")]
    TaskJoin(String),

    /// Invalid harvest configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl HarvestError {
    /// Whether this error aborts the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::CatalogListing { .. } | Self::Extract(_) | Self::InvalidConfig(_)
        )
    }
}

impl From<HarvestError> for CrateError {
    fn from(err: HarvestError) -> Self {
        match err {
            HarvestError::Fetch(e) => e.into(),
            HarvestError::Extract(e) => e.into(),
            HarvestError::InvalidConfig(msg) => CrateError::Config(msg),
            _ => CrateError::Harvest(err.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for HarvestError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskJoin(format!("Failed to join task: {}", err))
    }
}
