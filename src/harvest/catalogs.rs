//! Catalog discovery
//!
//! Reads the top-level listing page and returns its catalogs in document order.

use scraper::Html;
use tracing::{info, instrument, warn};
use url::Url;

use crate::catalog::Catalog;
use crate::extract::{Extractors, collapse_nbsp, element_text};
use crate::source::DocumentSource;

use super::HarvestError;

/// Fetch the listing at `listing_url` and return its catalogs.
///
/// A failed fetch is fatal for the run and comes back as
/// [`HarvestError::CatalogListing`].
#[instrument(skip(source, extractors, origin))]
pub async fn discover_catalogs<S>(
    source: &S,
    extractors: &Extractors,
    origin: &Url,
    listing_url: &str,
) -> Result<Vec<Catalog>, HarvestError>
where
    S: DocumentSource + ?Sized,
{
    let document = source
        .fetch(listing_url)
        .await
        .map_err(|source| HarvestError::CatalogListing {
            url: listing_url.to_string(),
            source,
        })?;

    let catalogs = parse_catalogs(&document.parse(), extractors, origin);
    if catalogs.is_empty() {
        warn!("No catalogs found on {}", listing_url);
    } else {
        info!("Found {} catalogs on {}", catalogs.len(), listing_url);
    }

    Ok(catalogs)
}

/// Extract catalog entries from a parsed listing page
pub fn parse_catalogs(document: &Html, extractors: &Extractors, origin: &Url) -> Vec<Catalog> {
    document
        .select(&extractors.catalog_link)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            match origin.join(href) {
                Ok(url) => Some(Catalog::new(
                    collapse_nbsp(element_text(element).trim()),
                    url.to_string(),
                )),
                Err(e) => {
                    warn!("Skipping catalog link '{}': {}", href, e);
                    None
                }
            }
        })
        .collect()
}
