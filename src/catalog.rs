//! # Catalog Data Model
//!
//! The two-level table the harvester fills in: catalogs own products, products
//! carry an optional price string.
//!
//! A catalog's identity is its position in the table, assigned at discovery.
//! A product's identity is its [`ProductKey`], the pair of its catalog index and
//! its position inside that catalog. Products are only ever appended, so a key
//! stays valid for the whole run.

use serde::{Deserialize, Serialize};

/// An item with a name, a detail-page URL and an optional price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Display name of the product
    pub name: String,

    /// Absolute URL of the product page
    pub url: String,

    /// Normalized price text, unset when no price was found
    pub price: Option<String>,
}

impl Product {
    /// Create a product without a price
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            price: None,
        }
    }

    /// Whether the price is missing or blank
    pub fn is_missing_price(&self) -> bool {
        self.price.as_deref().is_none_or(|p| p.trim().is_empty())
    }
}

/// A named grouping of products discovered from the top-level listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Display name of the catalog
    pub name: String,

    /// Absolute URL of the catalog's first page
    pub url: String,

    /// Products in arrival order
    pub products: Vec<Product>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            products: Vec::new(),
        }
    }
}

/// Address of a product inside a [`CatalogTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProductKey {
    /// Index of the owning catalog
    pub catalog: usize,

    /// Index of the product inside the catalog
    pub product: usize,
}

/// The harvested table: every catalog with its products
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogTable {
    catalogs: Vec<Catalog>,
}

impl CatalogTable {
    /// Wrap discovered catalogs into a table
    pub fn new(catalogs: Vec<Catalog>) -> Self {
        Self { catalogs }
    }

    /// All catalogs in discovery order
    pub fn catalogs(&self) -> &[Catalog] {
        &self.catalogs
    }

    /// Consume the table and return its catalogs
    pub fn into_catalogs(self) -> Vec<Catalog> {
        self.catalogs
    }

    /// Number of catalogs
    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    /// Whether the table has no catalogs
    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }

    /// Total number of products across all catalogs
    pub fn product_count(&self) -> usize {
        self.catalogs.iter().map(|c| c.products.len()).sum()
    }

    /// Look up a product by key
    pub fn product(&self, key: ProductKey) -> Option<&Product> {
        self.catalogs
            .get(key.catalog)
            .and_then(|c| c.products.get(key.product))
    }

    /// Iterate over every product with its key, catalog by catalog
    pub fn products(&self) -> impl Iterator<Item = (ProductKey, &Product)> {
        self.catalogs.iter().enumerate().flat_map(|(ci, catalog)| {
            catalog.products.iter().enumerate().map(move |(pi, product)| {
                (
                    ProductKey {
                        catalog: ci,
                        product: pi,
                    },
                    product,
                )
            })
        })
    }

    /// Append products to the catalog at `index`.
    ///
    /// Returns `false` and leaves the table untouched when the index is unknown.
    pub fn append_products(&mut self, index: usize, products: Vec<Product>) -> bool {
        match self.catalogs.get_mut(index) {
            Some(catalog) => {
                catalog.products.extend(products);
                true
            }
            None => false,
        }
    }

    /// Overwrite the price of the product at `key`.
    ///
    /// Returns `false` when the key does not address a product.
    pub fn set_price(&mut self, key: ProductKey, price: String) -> bool {
        match self
            .catalogs
            .get_mut(key.catalog)
            .and_then(|c| c.products.get_mut(key.product))
        {
            Some(product) => {
                product.price = Some(price);
                true
            }
            None => false,
        }
    }

    /// URLs of products that ended without a price
    pub fn missing_prices(&self) -> Vec<String> {
        self.products()
            .filter(|(_, p)| p.is_missing_price())
            .map(|(_, p)| p.url.clone())
            .collect()
    }
}
