//! # Catalog Harvest - Concurrent Storefront Catalog Harvester
//!
//! This crate crawls a paginated storefront in two passes and collects the
//! results into a single in-memory table: first the catalogs and the products
//! listed on every catalog page, then the price shown on every product page.
//!
//! ## Features
//!
//! - Catalog discovery from a top-level listing page
//! - Paginated product discovery, one bounded worker per catalog
//! - Price discovery through an ordered, configurable selector fallback chain
//! - Single-owner fan-in aggregation with explicit completion tracking
//! - Progress event stream for CLIs and other front ends
//! - CSV and JSON export of the populated table
//! - Async API with Tokio
//!
//! ## Example
//!
//! ```rust,no_run
//! use catalog_harvest::extract::SelectorSet;
//! use catalog_harvest::harvest::{HarvestConfig, Harvester};
//! use catalog_harvest::source::HttpSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let harvester = Harvester::new(
//!         HttpSource::new()?,
//!         HarvestConfig::default(),
//!         &SelectorSet::default(),
//!     )?;
//!
//!     let report = harvester.run().await?;
//!     println!(
//!         "{} products, {} without price",
//!         report.table.product_count(),
//!         report.missing_prices.len()
//!     );
//!     Ok(())
//! }
//! ```

mod error;

pub mod catalog;
pub mod export;
pub mod extract;
pub mod harvest;
pub mod source;

pub use error::Error;

/// Re-export of types module for public use
pub mod prelude {
    pub use crate::catalog::{Catalog, CatalogTable, Product, ProductKey};
    pub use crate::error::Error;
    pub use crate::error::Result;
    pub use crate::harvest::{HarvestConfig, HarvestEvent, HarvestReport, Harvester};
}
