//! # Document Source Configuration
//!
//! Request settings for [`HttpSource`](super::HttpSource): user agent and the
//! per-request timeout. The timeout also bounds how long a single fetch can keep
//! a harvest stage silent, which the harvest configuration relies on when it
//! validates its inactivity windows.

use std::time::Duration;

/// Default timeout for a single page request in seconds
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;

/// Configuration for the HTTP document source
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// User agent sent with every request
    pub user_agent: String,

    /// Timeout for a single request, including the body read
    pub request_timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("catalog-harvest/{}", env!("CARGO_PKG_VERSION")),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Builder for SourceConfig
#[derive(Debug, Default)]
pub struct SourceConfigBuilder {
    config: SourceConfig,
}

impl SourceConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: SourceConfig::default(),
        }
    }

    /// Set the user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout
    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.config.request_timeout = request_timeout;
        self
    }

    /// Build the configuration
    pub fn build(self) -> SourceConfig {
        self.config
    }
}

impl SourceConfig {
    /// Create a new builder
    pub fn builder() -> SourceConfigBuilder {
        SourceConfigBuilder::new()
    }
}
