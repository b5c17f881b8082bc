//! # Harvest CLI Application
//!
//! Command-line front end for the catalog harvester: crawls the configured
//! storefront, prints progress while it runs, and writes the resulting table
//! to disk.
//!
//! ## Features
//!
//! - Every pipeline knob exposed as a flag (workers, windows, timeouts)
//! - Selector overrides loaded from a JSON file
//! - Progress bar for the price stage
//! - CSV or JSON output
//! - Optional log file and OTLP telemetry

mod telemetry;

use anyhow::anyhow;
use catalog_harvest::export::{DEFAULT_OUTPUT, ExportFormat};
use catalog_harvest::extract::SelectorSet;
use catalog_harvest::harvest::{HarvestConfig, HarvestEvent, Harvester, StatusSender};
use catalog_harvest::source::{HttpSource, SourceConfig};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, instrument};

#[derive(Parser, Debug)]
#[command(author, version, about = "Harvest catalogs, products and prices from a storefront", long_about = None)]
struct Cli {
    /// Site origin every link is resolved against
    #[arg(long, default_value = "https://vodaplus.ru")]
    origin: String,

    /// Path of the catalog listing page
    #[arg(long, default_value = "/catalog")]
    listing_path: String,

    /// Concurrent product discovery workers
    #[arg(long, default_value = "8")]
    product_workers: usize,

    /// Concurrent price discovery workers
    #[arg(long, default_value = "32")]
    price_workers: usize,

    /// Capacity of each fan-in channel
    #[arg(long, default_value = "256")]
    channel_capacity: usize,

    /// Inactivity window of the product stage, in seconds
    #[arg(long, default_value = "30")]
    catalog_idle_secs: u64,

    /// Inactivity window of the price stage, in seconds
    #[arg(long, default_value = "120")]
    price_idle_secs: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value = "20")]
    request_timeout_secs: u64,

    /// User agent sent with every request
    #[arg(long)]
    user_agent: Option<String>,

    /// Output file
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Output format (csv or json)
    #[arg(short, long, default_value = "csv")]
    format: ExportFormat,

    /// JSON file overriding the default selectors
    #[arg(short, long)]
    selectors: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Export traces and metrics over OTLP
    #[arg(long)]
    otlp: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _otel = telemetry::init_tracing_subscriber(cli.otlp, cli.log_file.as_deref())?;

    tokio::select! {
        result = harvest_command(cli) => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Interrupted, nothing was written");
            Err(anyhow!("interrupted"))
        }
    }
}

#[instrument]
async fn harvest_command(cli: Cli) -> anyhow::Result<()> {
    let mut source_config =
        SourceConfig::builder().request_timeout(Duration::from_secs(cli.request_timeout_secs));
    if let Some(user_agent) = cli.user_agent {
        source_config = source_config.user_agent(user_agent);
    }
    let source_config = source_config.build();

    let config = HarvestConfig::builder()
        .site_origin(cli.origin)
        .catalog_listing_path(cli.listing_path)
        .product_workers(cli.product_workers)
        .price_workers(cli.price_workers)
        .channel_capacity(cli.channel_capacity)
        .catalog_idle_timeout(Duration::from_secs(cli.catalog_idle_secs))
        .price_idle_timeout(Duration::from_secs(cli.price_idle_secs))
        .build();
    config.validate(source_config.request_timeout)?;

    let selectors = match &cli.selectors {
        Some(path) => {
            info!("Loading selectors from {}", path.display());
            SelectorSet::read_config(path).await?
        }
        None => SelectorSet::default(),
    };

    let (status_sender, status_receiver) = mpsc::unbounded_channel();
    let status = StatusSender::new(status_sender);
    let printer = tokio::spawn(print_status(status_receiver));

    let harvester = Harvester::new(HttpSource::with_config(&source_config)?, config, &selectors)?
        .with_status(status.clone());

    let result = harvester.run_to_file(&cli.output, cli.format).await;
    status.send(HarvestEvent::Finished);
    let _ = printer.await;

    let report = result?;
    println!(
        "Harvested {} products from {} catalogs in {}s, {} without price",
        report.table.product_count(),
        report.table.len(),
        report.elapsed().num_seconds(),
        report.missing_prices.len()
    );
    Ok(())
}

/// Print status events until `Finished`, with a progress bar for prices
async fn print_status(mut receiver: mpsc::UnboundedReceiver<HarvestEvent>) {
    let mut progress: Option<ProgressBar> = None;

    while let Some(event) = receiver.recv().await {
        match &event {
            HarvestEvent::PricesLoading { products } => {
                println!("{}", event);
                progress = Some(price_progress_bar(*products as u64));
            }
            HarvestEvent::PriceProgress { done, .. } => {
                if let Some(bar) = &progress {
                    bar.set_position(*done as u64);
                }
            }
            HarvestEvent::PricesLoaded { .. } => {
                if let Some(bar) = progress.take() {
                    bar.finish_and_clear();
                }
                println!("{}", event);
            }
            HarvestEvent::Finished => {
                if let Some(bar) = progress.take() {
                    bar.abandon();
                }
                println!("{}", event);
                break;
            }
            _ => match &progress {
                Some(bar) => bar.println(event.to_string()),
                None => println!("{}", event),
            },
        }
    }
}

fn price_progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({eta}) {msg}")
    {
        bar.set_style(style.progress_chars("##-"));
    }
    bar.set_message("Loading prices...");
    bar
}
