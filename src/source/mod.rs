//! # Document Source Module
//!
//! The fetch primitive the harvester is built on: given a URL, return the page
//! as a [`Document`] or fail with a [`FetchError`].
//!
//! ## Key Components
//!
//! - `DocumentSource`: the async fetch capability, implemented by every backend
//! - `HttpSource`: reqwest-backed source used by the CLI
//! - `MockSource`: in-memory source with scripted pages, failures and delays
//! - `SourceConfig`: user agent and request timeout
//!
//! Documents keep their raw HTML. Parsing into a `scraper::Html` tree happens
//! in the synchronous extraction helpers, so no parsed tree ever lives across an
//! await point and harvest tasks stay `Send`.

mod config;
mod error;
mod http;
pub mod mock_source;

pub use config::{SourceConfig, SourceConfigBuilder};
pub use error::FetchError;
pub use http::HttpSource;
pub use mock_source::MockSource;

use async_trait::async_trait;
use scraper::Html;

/// A fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// URL the document was fetched from
    pub url: String,

    /// Raw HTML body
    pub html: String,
}

impl Document {
    /// Create a document from a URL and its HTML body
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    /// Parse the body into a queryable tree
    pub fn parse(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

/// Capability to fetch a document by URL
#[async_trait]
pub trait DocumentSource: Send + Sync + 'static {
    /// Fetch and return the document at `url`
    async fn fetch(&self, url: &str) -> Result<Document, FetchError>;
}
