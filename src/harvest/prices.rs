//! Price discovery
//!
//! Each product page is matched against the price fallback chain. The first
//! strategy with at least one matching node wins; every node it matched is
//! normalized and emitted as its own [`PriceUpdate`], so the price aggregator
//! keeps the last one.

use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;
use tracing::{debug, instrument, warn};

use crate::catalog::{CatalogTable, ProductKey};
use crate::extract::{Extractors, NBSP, PriceKind, select_texts};
use crate::source::DocumentSource;

use super::HarvestError;
use super::aggregator::{Apply, Producer};

/// Any run of whitespace, including template line breaks between text nodes
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("hardcoded regex pattern is valid"));

fn squash_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

/// A price destined for one product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceUpdate {
    /// Owning product
    pub key: ProductKey,

    /// Normalized price text
    pub price: String,
}

impl Apply<PriceUpdate> for CatalogTable {
    fn apply(&mut self, update: PriceUpdate) -> bool {
        let PriceUpdate { key, price } = update;
        if self.set_price(key, price) {
            true
        } else {
            warn!("Dropping price for unknown product {:?}", key);
            false
        }
    }
}

/// Nodes matched by the winning price strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceMatch {
    /// Name of the strategy that matched
    pub strategy: String,

    /// How the matched text is interpreted
    pub kind: PriceKind,

    /// Raw text of every matched node, in document order
    pub texts: Vec<String>,
}

/// Run the fallback chain over `document`
pub fn find_price(document: &Html, extractors: &Extractors) -> Option<PriceMatch> {
    extractors.price_chain.iter().find_map(|strategy| {
        let texts = select_texts(document, &strategy.selector);
        (!texts.is_empty()).then(|| PriceMatch {
            strategy: strategy.name.clone(),
            kind: strategy.kind,
            texts,
        })
    })
}

/// Clean the text of one matched price node.
///
/// Tiered blocks alternate quantity and price cells; they are rendered as one
/// `"<qty> <unit> - <price>"` row per pair. Everything else has each run of
/// whitespace collapsed to one space.
pub fn normalize_price(text: &str, kind: PriceKind, unit: &str) -> String {
    let text = text.replace(NBSP, " ");
    match kind {
        PriceKind::Tiered => {
            let cells: Vec<String> = text
                .lines()
                .map(squash_whitespace)
                .filter(|line| !line.is_empty())
                .collect();
            cells
                .chunks(2)
                .map(|pair| match pair {
                    [quantity, price] => format!("{} {} - {}", quantity, unit, price),
                    [single] => single.to_string(),
                    _ => String::new(),
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        PriceKind::Regular | PriceKind::Rental | PriceKind::OrderOnly => {
            squash_whitespace(&text)
        }
    }
}

/// Normalized, non-empty prices found on a parsed product page
pub fn extract_prices(document: &Html, extractors: &Extractors) -> Option<(String, Vec<String>)> {
    let found = find_price(document, extractors)?;
    let prices = found
        .texts
        .iter()
        .map(|text| normalize_price(text, found.kind, &extractors.tier_unit))
        .filter(|price| !price.is_empty())
        .collect();
    Some((found.strategy, prices))
}

/// Discover the price of the product at `key`.
///
/// Returns the number of emitted updates; zero means the product stays
/// without a price.
#[instrument(skip(source, extractors, producer))]
pub async fn discover_price<S>(
    source: &S,
    extractors: &Extractors,
    key: ProductKey,
    url: &str,
    producer: &Producer<PriceUpdate>,
) -> Result<usize, HarvestError>
where
    S: DocumentSource + ?Sized,
{
    producer.heartbeat().await?;
    let document = source.fetch(url).await?;
    let Some((strategy, prices)) = extract_prices(&document.parse(), extractors) else {
        warn!("Price not found: {}", url);
        return Ok(0);
    };
    debug!("Price strategy '{}' matched {} nodes on {}", strategy, prices.len(), url);

    let emitted = prices.len();
    for price in prices {
        producer.emit(PriceUpdate { key, price }).await?;
    }
    Ok(emitted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{PriceStrategy, SelectorSet};
    use crate::harvest::aggregator::Envelope;
    use crate::source::MockSource;
    use tokio::sync::mpsc;

    fn extractors() -> Extractors {
        Extractors::compile(&SelectorSet::default()).unwrap()
    }

    fn key() -> ProductKey {
        ProductKey {
            catalog: 0,
            product: 0,
        }
    }

    async fn collect(mut rx: mpsc::Receiver<Envelope<PriceUpdate>>) -> Vec<String> {
        let mut prices = Vec::new();
        while let Some(envelope) = rx.recv().await {
            if let Envelope::Item(update) = envelope {
                prices.push(update.price);
            }
        }
        prices
    }

    #[test]
    fn test_tiered_block_wins_over_later_strategies() {
        let html = r#"<html><body>
            <div class="price_matrix_block">100 ₽</div>
            <div class="price_value_block values_wrapper">999 ₽</div>
        </body></html>"#;
        let found = find_price(&Html::parse_document(html), &extractors()).unwrap();
        assert_eq!(found.strategy, "tiered");
        assert_eq!(found.kind, PriceKind::Tiered);
        assert_eq!(found.texts, vec!["100 ₽"]);
    }

    #[test]
    fn test_rental_and_order_only_fallbacks() {
        let rental = r#"<div><span class="srok-price-initial">
                        500&nbsp;₽/сутки</span></div>"#;
        let found = find_price(&Html::parse_document(rental), &extractors()).unwrap();
        assert_eq!(found.kind, PriceKind::Rental);
        assert_eq!(
            normalize_price(&found.texts[0], found.kind, "шт"),
            "500 ₽/сутки"
        );

        let order = r#"<div><span class="store_view dotted">Под заказ</span></div>"#;
        let found = find_price(&Html::parse_document(order), &extractors()).unwrap();
        assert_eq!(found.kind, PriceKind::OrderOnly);
        assert_eq!(found.texts, vec!["Под заказ"]);
    }

    #[test]
    fn test_no_strategy_matches() {
        let html = "<html><body><p>Nothing to see</p></body></html>";
        assert_eq!(find_price(&Html::parse_document(html), &extractors()), None);
    }

    #[test]
    fn test_custom_chain_order_is_respected() {
        let mut set = SelectorSet::default();
        set.price_strategies = vec![
            PriceStrategy::new("second", "span.b", PriceKind::Regular),
            PriceStrategy::new("first", "span.a", PriceKind::Regular),
        ];
        let extractors = Extractors::compile(&set).unwrap();
        let html = r#"<span class="a">1</span><span class="b">2</span>"#;

        let found = find_price(&Html::parse_document(html), &extractors).unwrap();
        assert_eq!(found.strategy, "second");
    }

    #[test]
    fn test_normalize_tiered_rows() {
        let text = "\n\t\t\t1 - 4\n\t\t\t\n\t\t\t100\u{a0}₽\n\t\t\t5+\n\t\t\t\t90 ₽\n\t\t";
        assert_eq!(
            normalize_price(text, PriceKind::Tiered, "шт"),
            "1 - 4 шт - 100 ₽\n5+ шт - 90 ₽"
        );
        assert_eq!(normalize_price("  120 ₽ ", PriceKind::Tiered, "шт"), "120 ₽");
    }

    #[test]
    fn test_normalize_regular_strips_template_runs() {
        let text = "\n\t\t\t\t1\u{a0}250 ₽\n\t\t\t\t";
        assert_eq!(normalize_price(text, PriceKind::Regular, "шт"), "1 250 ₽");
        assert_eq!(normalize_price("\n\t\t", PriceKind::Regular, "шт"), "");
    }

    #[test]
    fn test_text_nodes_on_separate_lines_stay_apart() {
        assert_eq!(
            normalize_price("\n\t\t1 250\n\t\t₽", PriceKind::Regular, "шт"),
            "1 250 ₽"
        );

        let html = "<div class=\"price_value_block values_wrapper\">\n\t\t<span>1&nbsp;250</span>\n\t\t<span>₽</span>\n\t</div>";
        let found = find_price(&Html::parse_document(html), &extractors()).unwrap();
        assert_eq!(normalize_price(&found.texts[0], found.kind, "шт"), "1 250 ₽");
    }

    #[tokio::test]
    async fn test_every_matched_node_is_emitted_in_order() {
        let source = MockSource::new().page(
            "https://shop.example.com/a/p1",
            r#"<div class="price_matrix_block">100 ₽</div>
               <div class="price_matrix_block">120 ₽</div>"#,
        );
        let (tx, rx) = mpsc::channel(8);
        let producer = Producer::new(tx);

        let emitted = discover_price(
            &source,
            &extractors(),
            key(),
            "https://shop.example.com/a/p1",
            &producer,
        )
        .await
        .unwrap();
        drop(producer);

        assert_eq!(emitted, 2);
        assert_eq!(collect(rx).await, vec!["100 ₽", "120 ₽"]);
    }

    #[tokio::test]
    async fn test_missing_price_emits_nothing() {
        let source = MockSource::new().page("https://shop.example.com/a/p1", "<p>no price</p>");
        let (tx, rx) = mpsc::channel(8);
        let producer = Producer::new(tx);

        let emitted = discover_price(
            &source,
            &extractors(),
            key(),
            "https://shop.example.com/a/p1",
            &producer,
        )
        .await
        .unwrap();
        drop(producer);

        assert_eq!(emitted, 0);
        assert!(collect(rx).await.is_empty());
    }

    #[tokio::test]
    async fn test_price_page_failure_is_reported() {
        let source = MockSource::new().failing("https://shop.example.com/a/p1");
        let (tx, _rx) = mpsc::channel(8);

        let result = discover_price(
            &source,
            &extractors(),
            key(),
            "https://shop.example.com/a/p1",
            &Producer::new(tx),
        )
        .await;

        assert!(matches!(result, Err(HarvestError::Fetch(_))));
    }

    #[test]
    fn test_apply_update_last_write_wins() {
        let mut table = CatalogTable::new(vec![crate::catalog::Catalog::new("A", "https://a/")]);
        table.append_products(0, vec![crate::catalog::Product::new("P", "https://a/p1")]);

        for price in ["100 ₽", "120 ₽"] {
            assert!(table.apply(PriceUpdate {
                key: key(),
                price: price.to_string(),
            }));
        }
        assert_eq!(table.product(key()).unwrap().price.as_deref(), Some("120 ₽"));
        assert!(!table.apply(PriceUpdate {
            key: ProductKey {
                catalog: 3,
                product: 0
            },
            price: "1".to_string(),
        }));
    }
}
