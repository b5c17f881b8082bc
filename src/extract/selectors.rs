//! # Selector Configuration
//!
//! CSS selectors describing the storefront layout. The defaults match the
//! layout template of the default site; a JSON file can override any field,
//! missing fields keep their defaults.
//!
//! The price strategies form an ordered fallback chain. Reordering or adding a
//! strategy is a change to this list, not to the discovery code.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::ExtractError;

/// How a matched price node is interpreted and normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceKind {
    /// Bulk pricing block with quantity/price rows
    Tiered,
    /// A single displayed price
    Regular,
    /// A rental-style price
    Rental,
    /// Availability marker for items sold on order only
    OrderOnly,
}

/// One step of the price fallback chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceStrategy {
    /// Name used in logs
    pub name: String,

    /// CSS selector tried against the product page
    pub selector: String,

    /// Interpretation of the matched nodes
    pub kind: PriceKind,
}

impl PriceStrategy {
    /// Create a strategy
    pub fn new(name: impl Into<String>, selector: impl Into<String>, kind: PriceKind) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            kind,
        }
    }
}

/// Selector configuration for every extraction the harvester performs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSet {
    /// Catalog links on the listing page; the link text is the catalog name
    pub catalog_link: String,

    /// Product title links on a catalog page
    pub product_link: String,

    /// Pagination control; its presence means the catalog has more pages
    pub pagination: String,

    /// Links to the other pages inside the pagination control
    pub pagination_link: String,

    /// Ordered price fallback chain
    pub price_strategies: Vec<PriceStrategy>,

    /// Quantity unit written into tiered price rows
    pub tier_unit: String,
}

/// Body path shared by the position-based price fallbacks
const PRICE_CELL_PATH: &str = "div:nth-of-type(2) > div > div > div > div > div > div > div > \
     div:nth-of-type(2) > div > div:nth-of-type(1) > div > div > div > div > span:nth-of-type(1)";

impl Default for SelectorSet {
    fn default() -> Self {
        Self {
            catalog_link: "[class='dark_link']".to_string(),
            product_link: "a[class='dark_link js-notice-block__title option-font-bold font_sm']"
                .to_string(),
            pagination: "div[class='module-pagination']".to_string(),
            pagination_link: "div[class='nums'] > a[href]".to_string(),
            price_strategies: vec![
                PriceStrategy::new(
                    "tiered",
                    "div[class='price_matrix_block']",
                    PriceKind::Tiered,
                ),
                PriceStrategy::new(
                    "content-cell",
                    format!("#content > {PRICE_CELL_PATH}"),
                    PriceKind::Regular,
                ),
                PriceStrategy::new(
                    "body-cell-7",
                    format!(
                        "html > body > div:nth-of-type(5) > div:nth-of-type(7) > {PRICE_CELL_PATH}"
                    ),
                    PriceKind::Regular,
                ),
                PriceStrategy::new(
                    "body-cell-6",
                    format!(
                        "html > body > div:nth-of-type(5) > div:nth-of-type(6) > {PRICE_CELL_PATH}"
                    ),
                    PriceKind::Regular,
                ),
                PriceStrategy::new(
                    "rental",
                    "[class='srok-price-initial']",
                    PriceKind::Rental,
                ),
                PriceStrategy::new(
                    "rental-cell",
                    "html > body > div:nth-of-type(5) > div:nth-of-type(7) > div:nth-of-type(2) > \
                     div > div > div > div > div > div > div > div:nth-of-type(2) > div > \
                     div:nth-of-type(2) > div:nth-of-type(3)",
                    PriceKind::Rental,
                ),
                PriceStrategy::new(
                    "price-block",
                    "[class='price_value_block values_wrapper']",
                    PriceKind::Regular,
                ),
                PriceStrategy::new(
                    "order-only",
                    "span[class='store_view dotted']",
                    PriceKind::OrderOnly,
                ),
            ],
            tier_unit: "шт".to_string(),
        }
    }
}

impl SelectorSet {
    /// Read a selector set from a JSON file
    pub async fn read_config(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let config = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&config)?)
    }
}
