//! Pipeline driver
//!
//! Runs catalog discovery, the product stage and the price stage in sequence.
//! Each stage is the same shape: one aggregator task owning the table, a
//! bounded worker pool running one discovery unit per work item, and one
//! [`Producer`] per unit that reports `Finished` whether the unit succeeded or
//! not. A stage whose aggregator gives up on inactivity abandons the units
//! still running.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};
use url::Url;

use crate::catalog::{CatalogTable, ProductKey};
use crate::error::Result as CrateResult;
use crate::export::{ExportFormat, export_table};
use crate::extract::{Extractors, SelectorSet};
use crate::source::DocumentSource;

use super::aggregator::{Apply, Completion, Producer, aggregate};
use super::catalogs::discover_catalogs;
use super::pool::run_pool;
use super::prices::{PriceUpdate, discover_price};
use super::products::{ProductBatch, discover_products};
use super::status::{HarvestEvent, Stage, StatusSender};
use super::{HarvestConfig, HarvestError};

/// Summary of one fan-in stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    /// Which stage this is
    pub stage: Stage,

    /// Discovery units started, one producer each
    pub producers: usize,

    /// Producers whose `Finished` marker reached the aggregator
    pub finished: usize,

    /// Units that ended with an error
    pub failed: usize,

    /// Units cut off when the stage stalled
    pub abandoned: usize,

    /// Messages applied to the table
    pub applied: usize,

    /// Messages the table rejected
    pub rejected: usize,

    /// How the aggregator stopped
    pub completion: Completion,

    /// Whether the inactivity window fired before every producer reported
    pub stalled: bool,
}

/// Outcome of a complete run
#[derive(Debug, Clone)]
pub struct HarvestReport {
    /// The populated table
    pub table: CatalogTable,

    /// URLs of products that ended without a price
    pub missing_prices: Vec<String>,

    /// Product stage summary
    pub product_stage: StageReport,

    /// Price stage summary
    pub price_stage: StageReport,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the price stage finished
    pub finished_at: DateTime<Utc>,
}

impl HarvestReport {
    /// Wall-clock duration of the run
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Drives a harvest run against a document source
#[derive(Debug)]
pub struct Harvester<S: DocumentSource> {
    source: Arc<S>,
    config: HarvestConfig,
    extractors: Arc<Extractors>,
    origin: Url,
    status: StatusSender,
}

impl<S: DocumentSource> Harvester<S> {
    /// Create a harvester; fails on an invalid origin or selector
    pub fn new(
        source: S,
        config: HarvestConfig,
        selectors: &SelectorSet,
    ) -> Result<Self, HarvestError> {
        let origin = config.origin()?;
        let extractors = Extractors::compile(selectors)?;

        Ok(Self {
            source: Arc::new(source),
            config,
            extractors: Arc::new(extractors),
            origin,
            status: StatusSender::disabled(),
        })
    }

    /// Send progress events to `status`
    pub fn with_status(mut self, status: StatusSender) -> Self {
        self.status = status;
        self
    }

    /// The configuration this harvester runs with
    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Run every stage and return the populated table.
    ///
    /// Only a failed catalog listing (or a broken configuration) is an error;
    /// failed pages and missing prices are reported, not raised.
    #[instrument(skip(self), fields(origin = %self.origin))]
    pub async fn run(&self) -> Result<HarvestReport, HarvestError> {
        let started_at = Utc::now();
        self.status.send(HarvestEvent::Started);

        let result = self.run_stages(started_at).await;
        if let Err(e) = &result {
            self.status.send(HarvestEvent::Failed {
                error: e.to_string(),
            });
        }
        result
    }

    /// Run every stage, then write the table to `output`
    pub async fn run_to_file(
        &self,
        output: &Path,
        format: ExportFormat,
    ) -> CrateResult<HarvestReport> {
        let site_label = self.config.site_label()?;
        // A failed run has already been reported on the status stream.
        let report = self.run().await?;

        self.status.send(HarvestEvent::Exporting);
        if let Err(e) = export_table(&report.table, output, format, &site_label) {
            self.status.send(HarvestEvent::Failed {
                error: e.to_string(),
            });
            return Err(e.into());
        }

        let path = std::fs::canonicalize(output).unwrap_or_else(|_| output.to_path_buf());
        info!("Wrote {} products to {}", report.table.product_count(), path.display());
        self.status.send(HarvestEvent::Exported {
            path: path.display().to_string(),
        });
        Ok(report)
    }

    async fn run_stages(&self, started_at: DateTime<Utc>) -> Result<HarvestReport, HarvestError> {
        let table = self.harvest_catalogs().await?;
        let (table, product_stage) = self.harvest_products(table).await?;
        let (table, price_stage) = self.harvest_prices(table).await?;

        let missing_prices = table.missing_prices();
        self.report_missing(&missing_prices);

        Ok(HarvestReport {
            table,
            missing_prices,
            product_stage,
            price_stage,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Fetch the listing and build a table of empty catalogs
    pub async fn harvest_catalogs(&self) -> Result<CatalogTable, HarvestError> {
        let listing_url = self.config.catalog_listing_url()?;
        self.status.send(HarvestEvent::Connecting {
            url: listing_url.clone(),
        });

        let catalogs = discover_catalogs(
            self.source.as_ref(),
            &self.extractors,
            &self.origin,
            &listing_url,
        )
        .await?;

        self.status.send(HarvestEvent::CatalogsLoaded {
            count: catalogs.len(),
        });
        Ok(CatalogTable::new(catalogs))
    }

    /// Discover the products of every catalog in `table`
    pub async fn harvest_products(
        &self,
        table: CatalogTable,
    ) -> Result<(CatalogTable, StageReport), HarvestError> {
        let units: Vec<(usize, String)> = table
            .catalogs()
            .iter()
            .enumerate()
            .map(|(index, catalog)| (index, catalog.url.clone()))
            .collect();
        self.status.send(HarvestEvent::ProductsLoading {
            catalogs: units.len(),
        });

        let source = self.source.clone();
        let extractors = self.extractors.clone();
        let origin = self.origin.clone();

        let (table, report) = self
            .run_stage(
                Stage::Products,
                table,
                units,
                self.config.product_workers,
                self.config.catalog_idle_timeout,
                move |(index, url): (usize, String), producer: Producer<ProductBatch>| {
                    let source = source.clone();
                    let extractors = extractors.clone();
                    let origin = origin.clone();
                    async move {
                        discover_products(
                            source.as_ref(),
                            &extractors,
                            &origin,
                            index,
                            &url,
                            &producer,
                        )
                        .await
                        .map(|_| ())
                    }
                },
            )
            .await?;

        self.status.send(HarvestEvent::ProductsLoaded {
            count: table.product_count(),
        });
        Ok((table, report))
    }

    /// Discover the price of every product in `table`
    pub async fn harvest_prices(
        &self,
        table: CatalogTable,
    ) -> Result<(CatalogTable, StageReport), HarvestError> {
        let units: Vec<(ProductKey, String)> = table
            .products()
            .map(|(key, product)| (key, product.url.clone()))
            .collect();
        let total = units.len();
        self.status.send(HarvestEvent::PricesLoading { products: total });

        let source = self.source.clone();
        let extractors = self.extractors.clone();
        let status = self.status.clone();
        let done = Arc::new(AtomicUsize::new(0));

        let (table, report) = self
            .run_stage(
                Stage::Prices,
                table,
                units,
                self.config.price_workers,
                self.config.price_idle_timeout,
                move |(key, url): (ProductKey, String), producer: Producer<PriceUpdate>| {
                    let source = source.clone();
                    let extractors = extractors.clone();
                    let status = status.clone();
                    let done = done.clone();
                    async move {
                        let result =
                            discover_price(source.as_ref(), &extractors, key, &url, &producer)
                                .await
                                .map(|_| ());
                        status.send(HarvestEvent::PriceProgress {
                            done: done.fetch_add(1, Ordering::Relaxed) + 1,
                            total,
                        });
                        result
                    }
                },
            )
            .await?;

        self.status.send(HarvestEvent::PricesLoaded {
            missing: table.missing_prices().len(),
        });
        Ok((table, report))
    }

    /// Fan `units` out over a worker pool and fan their messages into `table`
    async fn run_stage<U, M, F, Fut>(
        &self,
        stage: Stage,
        table: CatalogTable,
        units: Vec<U>,
        workers: usize,
        idle_timeout: Duration,
        task: F,
    ) -> Result<(CatalogTable, StageReport), HarvestError>
    where
        U: Clone + Send + Sync + 'static,
        M: Send + 'static,
        CatalogTable: Apply<M>,
        F: Fn(U, Producer<M>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HarvestError>> + Send + 'static,
    {
        let expected = units.len();
        info!("Stage '{}' starting with {} units", stage, expected);

        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        let mut aggregator = tokio::spawn(aggregate(table, rx, expected, idle_timeout));

        let task = Arc::new(task);
        let pool = run_pool(units, workers, move |unit| {
            let producer = Producer::new(tx.clone());
            let task = task.clone();
            async move {
                let result = (*task)(unit, producer.clone()).await;
                producer.finish(result.is_err()).await;
                result
            }
        });

        // The stage ends with the aggregator. If it gives up on inactivity,
        // dropping the pool aborts the workers that are still running.
        let (aggregated, pool) = tokio::select! {
            pool = pool => {
                // Every sender lived in the pool closure, so the channel is closed.
                (aggregator.await?, Some(pool))
            }
            aggregated = &mut aggregator => (aggregated?, None),
        };

        let panicked = pool.map_or(0, |pool| pool.panicked);
        let report = StageReport {
            stage,
            producers: expected,
            finished: aggregated.finished,
            failed: aggregated.failed + panicked,
            abandoned: expected.saturating_sub(aggregated.finished + panicked),
            applied: aggregated.applied,
            rejected: aggregated.rejected,
            completion: aggregated.completion,
            stalled: aggregated.stalled(),
        };

        if report.stalled {
            warn!(
                "Stage '{}' stalled: {}/{} producers finished, abandoning {}",
                stage, report.finished, report.producers, report.abandoned
            );
            self.status.send(HarvestEvent::Stalled {
                stage,
                finished: report.finished,
                expected: report.producers,
            });
        }
        info!(
            "Stage '{}' done ({}): {} applied, {} failed units",
            stage, report.completion, report.applied, report.failed
        );

        Ok((aggregated.table, report))
    }

    fn report_missing(&self, missing: &[String]) {
        if missing.is_empty() {
            info!("Every product has a price");
            return;
        }

        match serde_json::to_string_pretty(missing) {
            Ok(json) => warn!("{} products without price: {}", missing.len(), json),
            Err(e) => warn!("{} products without price ({})", missing.len(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Product};
    use crate::source::MockSource;

    const ORIGIN: &str = "https://shop.example.com";
    const LISTING: &str = "https://shop.example.com/catalog";

    fn listing(catalogs: &[(&str, &str)]) -> String {
        let links: String = catalogs
            .iter()
            .map(|(name, path)| format!(r#"<li><a class="dark_link" href="{path}">{name}</a></li>"#))
            .collect();
        format!("<html><body><ul>{links}</ul></body></html>")
    }

    fn catalog_page(products: &[(&str, &str)]) -> String {
        let links: String = products
            .iter()
            .map(|(name, path)| {
                format!(
                    r#"<div><a class="dark_link js-notice-block__title option-font-bold font_sm" href="{path}">{name}</a></div>"#
                )
            })
            .collect();
        format!("<html><body>{links}</body></html>")
    }

    fn price_page(price: &str) -> String {
        format!(
            r#"<html><body><div class="price_value_block values_wrapper">{price}</div></body></html>"#
        )
    }

    fn config() -> HarvestConfig {
        HarvestConfig::builder()
            .site_origin(ORIGIN)
            .catalog_listing_path("/catalog")
            .product_workers(2)
            .price_workers(4)
            .build()
    }

    fn harvester(source: MockSource) -> Harvester<MockSource> {
        Harvester::new(source, config(), &SelectorSet::default()).unwrap()
    }

    fn product_names(table: &CatalogTable, catalog: usize) -> Vec<String> {
        let mut names: Vec<String> = table.catalogs()[catalog]
            .products
            .iter()
            .map(|p| p.name.clone())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_tiered_scenario_last_write_wins() {
        let source = MockSource::new()
            .page(LISTING, listing(&[("A", "/a")]))
            .page("https://shop.example.com/a", catalog_page(&[("P", "/a/p1")]))
            .page(
                "https://shop.example.com/a/p1",
                r#"<div class="price_matrix_block">100 ₽</div><div class="price_matrix_block">120 ₽</div>"#,
            );

        let report = harvester(source).run().await.unwrap();

        let catalogs = report.table.catalogs();
        assert_eq!(catalogs.len(), 1);
        assert_eq!(catalogs[0].name, "A");
        assert_eq!(
            catalogs[0].products,
            vec![Product {
                name: "P".to_string(),
                url: "https://shop.example.com/a/p1".to_string(),
                price: Some("120 ₽".to_string()),
            }]
        );
        assert!(report.missing_prices.is_empty());
        assert_eq!(report.price_stage.applied, 2);
        assert_eq!(report.product_stage.completion, Completion::AllProducersFinished);
        assert!(report.finished_at >= report.started_at);
    }

    #[tokio::test]
    async fn test_products_land_in_their_own_catalog_regardless_of_timing() {
        let source = MockSource::new()
            .page(LISTING, listing(&[("Slow", "/slow"), ("Fast", "/fast")]))
            .page(
                "https://shop.example.com/slow",
                catalog_page(&[("s1", "/p/s1"), ("s2", "/p/s2")]),
            )
            .delayed("https://shop.example.com/slow", Duration::from_millis(100))
            .page(
                "https://shop.example.com/fast",
                catalog_page(&[("f1", "/p/f1")]),
            )
            .page("https://shop.example.com/p/s1", price_page("1 ₽"))
            .page("https://shop.example.com/p/s2", price_page("2 ₽"))
            .page("https://shop.example.com/p/f1", price_page("3 ₽"));

        let report = harvester(source).run().await.unwrap();
        let table = &report.table;

        assert_eq!(table.catalogs()[0].name, "Slow");
        assert_eq!(product_names(table, 0), vec!["s1", "s2"]);
        assert_eq!(product_names(table, 1), vec!["f1"]);
        assert_eq!(table.product_count(), 3);

        for (_, product) in table.products() {
            let expected = match product.name.as_str() {
                "s1" => "1 ₽",
                "s2" => "2 ₽",
                _ => "3 ₽",
            };
            assert_eq!(product.price.as_deref(), Some(expected));
        }
    }

    #[tokio::test]
    async fn test_missing_price_is_reported_not_raised() {
        let source = MockSource::new()
            .page(LISTING, listing(&[("A", "/a")]))
            .page(
                "https://shop.example.com/a",
                catalog_page(&[("priced", "/a/1"), ("bare", "/a/2"), ("gone", "/a/3")]),
            )
            .page("https://shop.example.com/a/1", price_page("10 ₽"))
            .page("https://shop.example.com/a/2", "<html><body>no price</body></html>")
            .failing("https://shop.example.com/a/3");

        let report = harvester(source).run().await.unwrap();

        assert_eq!(
            report.missing_prices,
            vec![
                "https://shop.example.com/a/2".to_string(),
                "https://shop.example.com/a/3".to_string(),
            ]
        );
        assert_eq!(report.price_stage.producers, 3);
        assert_eq!(report.price_stage.finished, 3);
        assert_eq!(report.price_stage.failed, 1);
        assert!(!report.price_stage.stalled);
    }

    #[tokio::test]
    async fn test_listing_failure_stops_before_discovery() {
        let source = MockSource::new()
            .failing(LISTING)
            .page("https://shop.example.com/a", catalog_page(&[("P", "/a/p1")]));
        let harvester = harvester(source);

        let err = harvester.run().await.unwrap_err();

        assert!(err.is_fatal());
        assert_eq!(harvester.source.requests(), vec![LISTING.to_string()]);
    }

    #[tokio::test]
    async fn test_hung_price_page_is_abandoned() {
        let source = MockSource::new()
            .page(LISTING, listing(&[("A", "/a")]))
            .page("https://shop.example.com/a", catalog_page(&[("P", "/a/p1")]))
            .page("https://shop.example.com/a/p1", price_page("5 ₽"))
            .delayed("https://shop.example.com/a/p1", Duration::from_secs(3600));
        let config = HarvestConfig::builder()
            .site_origin(ORIGIN)
            .price_idle_timeout(Duration::from_millis(50))
            .build();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let harvester = Harvester::new(source, config, &SelectorSet::default())
            .unwrap()
            .with_status(StatusSender::new(tx));

        let report = tokio::time::timeout(Duration::from_secs(2), harvester.run())
            .await
            .expect("a hung fetch must not hang the run")
            .unwrap();

        assert!(report.price_stage.stalled);
        assert_eq!(report.price_stage.completion, Completion::IdleTimeout);
        assert_eq!(report.price_stage.finished, 0);
        assert_eq!(report.price_stage.abandoned, 1);
        assert_eq!(report.price_stage.failed, 0);
        assert_eq!(
            report.missing_prices,
            vec!["https://shop.example.com/a/p1".to_string()]
        );

        let mut saw_stall = false;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, HarvestEvent::Stalled { stage: Stage::Prices, .. }) {
                saw_stall = true;
            }
        }
        assert!(saw_stall);
    }

    #[tokio::test]
    async fn test_pagination_longer_than_the_window_is_complete() {
        let first = format!(
            r#"<html><body>{}<div class="module-pagination"><div class="nums"><span class="cur">1</span><a href="/a?PAGEN_1=2">2</a><a href="/a?PAGEN_1=3">3</a></div></div></body></html>"#,
            r#"<div><a class="dark_link js-notice-block__title option-font-bold font_sm" href="/a/1">p1</a></div>"#
        );
        let source = MockSource::new()
            .page(LISTING, listing(&[("A", "/a")]))
            .page("https://shop.example.com/a", first)
            .page(
                "https://shop.example.com/a?PAGEN_1=2",
                catalog_page(&[("p2", "/a/2")]),
            )
            .delayed("https://shop.example.com/a?PAGEN_1=2", Duration::from_millis(100))
            .page(
                "https://shop.example.com/a?PAGEN_1=3",
                catalog_page(&[("p3", "/a/3"), ("p4", "/a/4")]),
            )
            .delayed("https://shop.example.com/a?PAGEN_1=3", Duration::from_millis(100));
        let config = HarvestConfig::builder()
            .site_origin(ORIGIN)
            .catalog_idle_timeout(Duration::from_millis(150))
            .build();
        let harvester = Harvester::new(source, config, &SelectorSet::default()).unwrap();

        let report = harvester.run().await.unwrap();

        assert_eq!(product_names(&report.table, 0), vec!["p1", "p2", "p3", "p4"]);
        assert_eq!(report.product_stage.completion, Completion::AllProducersFinished);
        assert!(!report.product_stage.stalled);
        assert_eq!(report.product_stage.abandoned, 0);
    }

    #[tokio::test]
    async fn test_worker_count_does_not_change_the_table() {
        let script = || {
            MockSource::new()
                .page(LISTING, listing(&[("A", "/a"), ("B", "/b"), ("C", "/c")]))
                .page(
                    "https://shop.example.com/a",
                    catalog_page(&[("a1", "/a/1"), ("a2", "/a/2")]),
                )
                .delayed("https://shop.example.com/a", Duration::from_millis(60))
                .page("https://shop.example.com/b", catalog_page(&[("b1", "/b/1")]))
                .delayed("https://shop.example.com/b", Duration::from_millis(30))
                .page(
                    "https://shop.example.com/c",
                    catalog_page(&[("c1", "/c/1"), ("c2", "/c/2")]),
                )
                .page("https://shop.example.com/a/1", price_page("1 ₽"))
                .page("https://shop.example.com/a/2", price_page("2 ₽"))
                .page("https://shop.example.com/b/1", price_page("3 ₽"))
                .page("https://shop.example.com/c/1", price_page("4 ₽"))
                .page("https://shop.example.com/c/2", price_page("5 ₽"))
        };
        let run = |workers: usize| async move {
            let config = HarvestConfig::builder()
                .site_origin(ORIGIN)
                .product_workers(workers)
                .price_workers(workers)
                .build();
            Harvester::new(script(), config, &SelectorSet::default())
                .unwrap()
                .run()
                .await
                .unwrap()
        };

        let serial = run(1).await;
        let parallel = run(3).await;

        for report in [&serial, &parallel] {
            assert_eq!(product_names(&report.table, 0), vec!["a1", "a2"]);
            assert_eq!(product_names(&report.table, 1), vec!["b1"]);
            assert_eq!(product_names(&report.table, 2), vec!["c1", "c2"]);
            assert!(report.missing_prices.is_empty());
        }
        let prices = |report: &HarvestReport| {
            let mut prices: Vec<(String, Option<String>)> = report
                .table
                .products()
                .map(|(_, p)| (p.name.clone(), p.price.clone()))
                .collect();
            prices.sort();
            prices
        };
        assert_eq!(prices(&serial), prices(&parallel));
    }

    #[tokio::test]
    async fn test_run_to_file_writes_the_table() {
        let source = MockSource::new()
            .page(LISTING, listing(&[("A", "/a")]))
            .page("https://shop.example.com/a", catalog_page(&[("P", "/a/p1")]))
            .page("https://shop.example.com/a/p1", price_page("7 ₽"));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let harvester = harvester(source).with_status(StatusSender::new(tx));
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("prices.json");

        let report = harvester
            .run_to_file(&output, ExportFormat::Json)
            .await
            .unwrap();

        assert_eq!(report.table.product_count(), 1);
        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.contains("7 ₽"));
        assert!(written.contains("shop.example.com"));

        let mut exported = false;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, HarvestEvent::Exported { .. }) {
                exported = true;
            }
        }
        assert!(exported);
    }

    #[tokio::test]
    async fn test_run_to_file_surfaces_export_failure() {
        let source = MockSource::new().page(LISTING, listing(&[]));
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("prices.csv");

        let err = harvester(source)
            .run_to_file(&output, ExportFormat::Csv)
            .await
            .unwrap_err();

        assert!(matches!(err, crate::Error::Io(_)));
    }

    #[tokio::test]
    async fn test_status_events_in_order() {
        let source = MockSource::new()
            .page(LISTING, listing(&[("A", "/a")]))
            .page("https://shop.example.com/a", catalog_page(&[("P", "/a/p1")]))
            .page("https://shop.example.com/a/p1", price_page("7 ₽"));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let harvester = harvester(source).with_status(StatusSender::new(tx));

        harvester.run().await.unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                HarvestEvent::Started,
                HarvestEvent::Connecting {
                    url: LISTING.to_string()
                },
                HarvestEvent::CatalogsLoaded { count: 1 },
                HarvestEvent::ProductsLoading { catalogs: 1 },
                HarvestEvent::ProductsLoaded { count: 1 },
                HarvestEvent::PricesLoading { products: 1 },
                HarvestEvent::PriceProgress { done: 1, total: 1 },
                HarvestEvent::PricesLoaded { missing: 0 },
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_listing_runs_every_stage() {
        let source = MockSource::new().page(LISTING, listing(&[]));

        let report = harvester(source).run().await.unwrap();

        assert!(report.table.is_empty());
        assert_eq!(report.product_stage.producers, 0);
        assert_eq!(report.price_stage.completion, Completion::AllProducersFinished);
    }

    #[tokio::test]
    async fn test_prices_stage_on_prebuilt_table() {
        let mut table = CatalogTable::new(vec![Catalog::new("A", "https://shop.example.com/a")]);
        table.append_products(
            0,
            vec![Product::new("P", "https://shop.example.com/a/p1")],
        );
        let source = MockSource::new().page("https://shop.example.com/a/p1", price_page("9 ₽"));

        let (table, report) = harvester(source).harvest_prices(table).await.unwrap();

        assert_eq!(report.applied, 1);
        assert_eq!(
            table.catalogs()[0].products[0].price.as_deref(),
            Some("9 ₽")
        );
    }
}
