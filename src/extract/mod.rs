//! # Field Extraction Module
//!
//! Applies CSS selectors to parsed documents and returns the matched nodes'
//! text or attributes. Selectors are compiled once from a [`SelectorSet`] into
//! [`Extractors`], which is shared read-only by every harvest task.

mod error;
mod selectors;

pub use error::ExtractError;
pub use selectors::{PriceKind, PriceStrategy, SelectorSet};

use scraper::{ElementRef, Html, Selector};

/// Non-breaking space as emitted by the storefront template
pub const NBSP: char = '\u{a0}';

/// A compiled step of the price fallback chain
#[derive(Debug, Clone)]
pub struct CompiledStrategy {
    /// Strategy name used in logs
    pub name: String,

    /// Compiled selector
    pub selector: Selector,

    /// Interpretation of matched nodes
    pub kind: PriceKind,
}

/// Compiled selectors for every extraction the harvester performs
#[derive(Debug, Clone)]
pub struct Extractors {
    /// Catalog links on the listing page
    pub catalog_link: Selector,

    /// Product title links on a catalog page
    pub product_link: Selector,

    /// Pagination control
    pub pagination: Selector,

    /// Page links inside the pagination control
    pub pagination_link: Selector,

    /// Ordered price fallback chain
    pub price_chain: Vec<CompiledStrategy>,

    /// Quantity unit for tiered price rows
    pub tier_unit: String,
}

impl Extractors {
    /// Compile every selector of `set`
    pub fn compile(set: &SelectorSet) -> Result<Self, ExtractError> {
        if set.price_strategies.is_empty() {
            return Err(ExtractError::EmptyPriceChain);
        }

        let price_chain = set
            .price_strategies
            .iter()
            .map(|strategy| {
                Ok(CompiledStrategy {
                    name: strategy.name.clone(),
                    selector: compile_selector(&strategy.selector)?,
                    kind: strategy.kind,
                })
            })
            .collect::<Result<Vec<_>, ExtractError>>()?;

        Ok(Self {
            catalog_link: compile_selector(&set.catalog_link)?,
            product_link: compile_selector(&set.product_link)?,
            pagination: compile_selector(&set.pagination)?,
            pagination_link: compile_selector(&set.pagination_link)?,
            price_chain,
            tier_unit: set.tier_unit.clone(),
        })
    }
}

/// Parse a CSS selector, keeping the selector text in the error
pub fn compile_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Concatenated text of an element and its descendants
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Text of every node matching `selector`, in document order
pub fn select_texts(document: &Html, selector: &Selector) -> Vec<String> {
    document.select(selector).map(element_text).collect()
}

/// Value of `attribute` on every matching node that carries it
pub fn select_attrs(document: &Html, selector: &Selector, attribute: &str) -> Vec<String> {
    document
        .select(selector)
        .filter_map(|element| element.value().attr(attribute))
        .map(str::to_string)
        .collect()
}

/// Whether at least one node matches `selector`
pub fn exists(document: &Html, selector: &Selector) -> bool {
    document.select(selector).next().is_some()
}

/// Replace non-breaking spaces with regular spaces
pub fn collapse_nbsp(text: &str) -> String {
    text.replace(NBSP, " ")
}
