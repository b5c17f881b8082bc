//! Product discovery
//!
//! One discovery unit per catalog: read the first page, emit its products,
//! then walk every page linked from the pagination control. Each fetched page
//! becomes one [`ProductBatch`] tagged with the catalog's index.

use scraper::Html;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::catalog::{CatalogTable, Product};
use crate::extract::{Extractors, collapse_nbsp, element_text, exists, select_attrs};
use crate::source::DocumentSource;

use super::HarvestError;
use super::aggregator::{Apply, Producer};

/// Products found on one page of one catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductBatch {
    /// Index of the owning catalog
    pub catalog: usize,

    /// Page the products were read from
    pub page_url: String,

    /// Products in document order
    pub products: Vec<Product>,
}

impl Apply<ProductBatch> for CatalogTable {
    fn apply(&mut self, batch: ProductBatch) -> bool {
        let ProductBatch {
            catalog,
            page_url,
            products,
        } = batch;
        if self.append_products(catalog, products) {
            true
        } else {
            warn!("Dropping products from {}: unknown catalog {}", page_url, catalog);
            false
        }
    }
}

/// What a single catalog page yields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPage {
    /// Products in document order
    pub products: Vec<Product>,

    /// Other pages of the catalog, when a pagination control is present
    pub pages: Option<Vec<String>>,
}

/// Extract products and pagination links from a parsed catalog page
pub fn parse_product_page(document: &Html, extractors: &Extractors, origin: &Url) -> ProductPage {
    let products = document
        .select(&extractors.product_link)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            let url = origin
                .join(href)
                .inspect_err(|e| warn!("Skipping product link '{}': {}", href, e))
                .ok()?;
            Some(Product::new(
                collapse_nbsp(element_text(element).trim()),
                url.to_string(),
            ))
        })
        .collect();

    let pages = exists(document, &extractors.pagination).then(|| {
        select_attrs(document, &extractors.pagination_link, "href")
            .iter()
            .filter_map(|href| origin.join(href).ok())
            .map(|url| url.to_string())
            .collect()
    });

    ProductPage { products, pages }
}

/// Discover every product of the catalog at `index`.
///
/// A failure on the first page fails the unit; a failure on a later page is
/// logged and that page is skipped.
#[instrument(skip(source, extractors, origin, producer))]
pub async fn discover_products<S>(
    source: &S,
    extractors: &Extractors,
    origin: &Url,
    index: usize,
    catalog_url: &str,
    producer: &Producer<ProductBatch>,
) -> Result<usize, HarvestError>
where
    S: DocumentSource + ?Sized,
{
    producer.heartbeat().await?;
    let document = source.fetch(catalog_url).await?;
    let first = parse_product_page(&document.parse(), extractors, origin);

    let mut emitted = first.products.len();
    if first.products.is_empty() {
        warn!("No products found on {}", catalog_url);
    }
    producer
        .emit(ProductBatch {
            catalog: index,
            page_url: catalog_url.to_string(),
            products: first.products,
        })
        .await?;

    let Some(pages) = first.pages else {
        debug!("No pagination on {}", catalog_url);
        return Ok(emitted);
    };

    let mut visited = HashSet::from([catalog_url.to_string()]);
    for page_url in pages {
        if !visited.insert(page_url.clone()) {
            continue;
        }

        producer.heartbeat().await?;
        let document = match source.fetch(&page_url).await {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to load page {}: {}", page_url, e);
                continue;
            }
        };

        let page = parse_product_page(&document.parse(), extractors, origin);
        if page.products.is_empty() {
            warn!("No products found on {}", page_url);
            continue;
        }

        emitted += page.products.len();
        producer
            .emit(ProductBatch {
                catalog: index,
                page_url,
                products: page.products,
            })
            .await?;
    }

    info!("Catalog {} yielded {} products", index, emitted);
    Ok(emitted)
}
