//! # Export Module
//!
//! Writes a populated [`CatalogTable`] to disk, either as a CSV sheet with one
//! row per product or as the JSON form of the whole table.

mod error;

pub use error::ExportError;

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::{info, instrument};

use crate::catalog::CatalogTable;

/// Default output file name
pub const DEFAULT_OUTPUT: &str = "data.csv";

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// `Product, <site>, Product URL` rows
    #[default]
    Csv,
    /// Pretty-printed catalog table
    Json,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Write one CSV row per product, catalogs in order.
///
/// The price column is headed by `site_label`; a product without a price
/// gets an empty cell.
pub fn write_csv<W: Write>(
    table: &CatalogTable,
    writer: W,
    site_label: &str,
) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["Product", site_label, "Product URL"])?;

    for (_, product) in table.products() {
        csv.write_record([
            product.name.as_str(),
            product.price.as_deref().unwrap_or_default(),
            product.url.as_str(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Write the table as pretty JSON
pub fn write_json<W: Write>(table: &CatalogTable, writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, table)?;
    Ok(())
}

/// Create `path` and write the table in `format`
#[instrument(skip(table))]
pub fn export_table(
    table: &CatalogTable,
    path: &Path,
    format: ExportFormat,
    site_label: &str,
) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        ExportFormat::Csv => write_csv(table, &mut writer, site_label)?,
        ExportFormat::Json => write_json(table, &mut writer)?,
    }
    writer.flush()?;

    info!(
        "Exported {} products from {} catalogs to {}",
        table.product_count(),
        table.len(),
        path.display()
    );
    Ok(())
}
