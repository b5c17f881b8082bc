//! # Harvest Configuration Module
//!
//! Configuration for the harvest pipeline: where the catalog listing lives, how
//! many workers each stage runs, and the inactivity windows the aggregators use
//! as a last-resort completion signal.
//!
//! ## Key Components
//!
//! - `HarvestConfig`: the pipeline parameters
//! - `HarvestConfigBuilder`: builder pattern implementation for easier configuration
//!
//! The inactivity windows are a safety net only. Stages normally finish when
//! every producer has reported, so the windows must be longer than any single
//! fetch; `validate` enforces that against the source request timeout.

use std::time::Duration;
use url::Url;

use super::HarvestError;

/// Configuration for the harvest pipeline
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Scheme and host every relative link is resolved against
    pub site_origin: String,

    /// Path of the top-level catalog listing
    pub catalog_listing_path: String,

    /// Number of concurrent product discovery workers
    pub product_workers: usize,

    /// Number of concurrent price discovery workers
    pub price_workers: usize,

    /// Capacity of each fan-in channel
    pub channel_capacity: usize,

    /// Inactivity window of the catalog aggregator
    pub catalog_idle_timeout: Duration,

    /// Inactivity window of the price aggregator
    pub price_idle_timeout: Duration,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            site_origin: "https://vodaplus.ru".to_string(),
            catalog_listing_path: "/catalog".to_string(),
            product_workers: 8,
            price_workers: 32,
            channel_capacity: 256,
            catalog_idle_timeout: Duration::from_secs(30),
            price_idle_timeout: Duration::from_secs(120),
        }
    }
}

/// Builder for HarvestConfig
#[derive(Debug, Default)]
pub struct HarvestConfigBuilder {
    config: HarvestConfig,
}

impl HarvestConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: HarvestConfig::default(),
        }
    }

    /// Set the site origin
    pub fn site_origin(mut self, site_origin: impl Into<String>) -> Self {
        self.config.site_origin = site_origin.into();
        self
    }

    /// Set the catalog listing path
    pub fn catalog_listing_path(mut self, path: impl Into<String>) -> Self {
        self.config.catalog_listing_path = path.into();
        self
    }

    /// Set the number of product discovery workers
    pub fn product_workers(mut self, workers: usize) -> Self {
        self.config.product_workers = workers;
        self
    }

    /// Set the number of price discovery workers
    pub fn price_workers(mut self, workers: usize) -> Self {
        self.config.price_workers = workers;
        self
    }

    /// Set the fan-in channel capacity
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// Set the catalog aggregator inactivity window
    pub fn catalog_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.catalog_idle_timeout = timeout;
        self
    }

    /// Set the price aggregator inactivity window
    pub fn price_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.price_idle_timeout = timeout;
        self
    }

    /// Build the configuration
    pub fn build(self) -> HarvestConfig {
        self.config
    }
}

impl HarvestConfig {
    /// Create a new builder
    pub fn builder() -> HarvestConfigBuilder {
        HarvestConfigBuilder::new()
    }

    /// Parsed site origin
    pub fn origin(&self) -> Result<Url, HarvestError> {
        Url::parse(&self.site_origin).map_err(|e| {
            HarvestError::InvalidConfig(format!("site origin '{}': {}", self.site_origin, e))
        })
    }

    /// Absolute URL of the catalog listing page
    pub fn catalog_listing_url(&self) -> Result<String, HarvestError> {
        let url = self.origin()?.join(&self.catalog_listing_path).map_err(|e| {
            HarvestError::InvalidConfig(format!(
                "catalog listing path '{}': {}",
                self.catalog_listing_path, e
            ))
        })?;
        Ok(url.to_string())
    }

    /// Host name used to label exported rows, without a leading `www.`
    pub fn site_label(&self) -> Result<String, HarvestError> {
        let origin = self.origin()?;
        let host = origin.host_str().ok_or_else(|| {
            HarvestError::InvalidConfig(format!("site origin '{}' has no host", self.site_origin))
        })?;
        Ok(host.trim_start_matches("www.").to_string())
    }

    /// Check the configuration against the source's request timeout
    pub fn validate(&self, request_timeout: Duration) -> Result<(), HarvestError> {
        self.catalog_listing_url()?;

        if self.product_workers == 0 || self.price_workers == 0 {
            return Err(HarvestError::InvalidConfig(
                "worker counts must be at least 1".to_string(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(HarvestError::InvalidConfig(
                "channel capacity must be at least 1".to_string(),
            ));
        }
        for (name, window) in [
            ("catalog", self.catalog_idle_timeout),
            ("price", self.price_idle_timeout),
        ] {
            if window <= request_timeout {
                return Err(HarvestError::InvalidConfig(format!(
                    "{} idle timeout ({:?}) must exceed the request timeout ({:?})",
                    name, window, request_timeout
                )));
            }
        }
        if self.price_idle_timeout <= self.catalog_idle_timeout {
            return Err(HarvestError::InvalidConfig(format!(
                "price idle timeout ({:?}) must exceed the catalog idle timeout ({:?})",
                self.price_idle_timeout, self.catalog_idle_timeout
            )));
        }

        Ok(())
    }
}
