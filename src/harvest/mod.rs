//! # Harvest Module
//!
//! The concurrent pipeline that fills a [`CatalogTable`](crate::catalog::CatalogTable):
//! catalog discovery, per-catalog paginated product discovery, then
//! per-product price discovery.
//!
//! ## Key Components
//!
//! - `Harvester`: runs the stages in order and returns a `HarvestReport`
//! - `aggregate`: single-owner fan-in that applies messages to the table
//! - `run_pool`: bounded worker pool running one discovery unit per item
//! - `HarvestEvent`: progress stream for callers that want to show status
//! - `HarvestConfig`: worker counts, channel capacity and inactivity windows
//!
//! ## Completion
//!
//! Producers never touch the table. Each discovery unit gets its own
//! `Producer`, sends a heartbeat before every fetch and its results after,
//! then sends `Finished`. The aggregator stops as soon as every expected
//! producer has finished or the channel closes. The inactivity window only
//! matters for a unit that hangs; when it fires first the stage is reported
//! as stalled, the hung units are aborted and the run carries on with what
//! arrived.

pub mod aggregator;
pub mod catalogs;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod pool;
pub mod prices;
pub mod products;
pub mod status;

pub use aggregator::{Aggregated, Apply, Completion, Envelope, Producer, aggregate};
pub use config::{HarvestConfig, HarvestConfigBuilder};
pub use error::HarvestError;
pub use pipeline::{HarvestReport, Harvester, StageReport};
pub use pool::{PoolReport, run_pool};
pub use prices::PriceUpdate;
pub use products::ProductBatch;
pub use status::{HarvestEvent, Stage, StatusSender};
