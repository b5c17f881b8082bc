//! Progress events emitted by the harvester during a run.

use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

/// Harvest stage names used in events and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Product discovery across catalogs
    Products,
    /// Price discovery across products
    Prices,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Products => write!(f, "products"),
            Self::Prices => write!(f, "prices"),
        }
    }
}

/// Represents the progress of a harvest run.
///
/// Callers listen on the status stream and print or render each event; the
/// stream always ends with `Finished`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestEvent {
    /// The run has started
    Started,

    /// Fetching the catalog listing
    Connecting { url: String },

    /// Catalog discovery finished
    CatalogsLoaded { count: usize },

    /// Product discovery started
    ProductsLoading { catalogs: usize },

    /// Product discovery finished
    ProductsLoaded { count: usize },

    /// Price discovery started
    PricesLoading { products: usize },

    /// One more product's price page has been processed
    PriceProgress { done: usize, total: usize },

    /// Price discovery finished
    PricesLoaded { missing: usize },

    /// A stage's safety-net timeout fired before every producer reported
    Stalled {
        stage: Stage,
        finished: usize,
        expected: usize,
    },

    /// Export started
    Exporting,

    /// The table has been written
    Exported { path: String },

    /// The run failed
    Failed { error: String },

    /// Terminal marker: nothing follows
    Finished,
}

impl fmt::Display for HarvestEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "Starting harvest..."),
            Self::Connecting { url } => write!(f, "Connecting to {} ...", url),
            Self::CatalogsLoaded { count } => {
                write!(f, "Catalogs loaded, number of catalogs: {}", count)
            }
            Self::ProductsLoading { catalogs } => {
                write!(f, "Loading products from {} catalogs...", catalogs)
            }
            Self::ProductsLoaded { count } => {
                write!(f, "Products loaded, number of products: {}", count)
            }
            Self::PricesLoading { products } => {
                write!(f, "Loading prices for {} products...", products)
            }
            Self::PriceProgress { done, total } => write!(f, "Prices: {}/{}", done, total),
            Self::PricesLoaded { missing } => {
                write!(f, "Prices loaded, products without price: {}", missing)
            }
            Self::Stalled {
                stage,
                finished,
                expected,
            } => write!(
                f,
                "Stage '{}' stopped on inactivity with {}/{} producers finished",
                stage, finished, expected
            ),
            Self::Exporting => write!(f, "Generating table..."),
            Self::Exported { path } => write!(f, "Table written to {}", path),
            Self::Failed { error } => write!(f, "Harvest failed: {}", error),
            Self::Finished => write!(f, "Done"),
        }
    }
}

/// Optional sender for status events
#[derive(Debug, Clone, Default)]
pub struct StatusSender {
    tx: Option<UnboundedSender<HarvestEvent>>,
}

impl StatusSender {
    /// Forward events to `tx`
    pub fn new(tx: UnboundedSender<HarvestEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A sender that drops every event
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Send an event; a closed or missing receiver is ignored
    pub fn send(&self, event: HarvestEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_event_lines() {
        assert_eq!(
            HarvestEvent::CatalogsLoaded { count: 12 }.to_string(),
            "Catalogs loaded, number of catalogs: 12"
        );
        assert_eq!(
            HarvestEvent::Stalled {
                stage: Stage::Prices,
                finished: 3,
                expected: 5
            }
            .to_string(),
            "Stage 'prices' stopped on inactivity with 3/5 producers finished"
        );
    }

    #[test]
    fn test_sender_forwards_and_tolerates_closed_receiver() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let status = StatusSender::new(tx);
        status.send(HarvestEvent::Started);
        assert_eq!(rx.try_recv().unwrap(), HarvestEvent::Started);

        drop(rx);
        status.send(HarvestEvent::Finished);
        StatusSender::disabled().send(HarvestEvent::Finished);
    }
}
