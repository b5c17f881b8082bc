//! # Mock Document Source for Testing
//!
//! Provides a `MockSource` that implements the `DocumentSource` trait with
//! scripted pages. Unknown URLs answer with a 404 status, failing URLs with a
//! 500, and any URL can be given an artificial delay to force a particular
//! interleaving between concurrent tasks. Every request is recorded.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::{Document, DocumentSource, FetchError};

/// A scripted in-memory document source
#[derive(Debug, Default)]
pub struct MockSource {
    pages: HashMap<String, String>,
    failing: HashMap<String, u16>,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<String>>,
}

impl MockSource {
    /// Create an empty source; every URL answers 404
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` at `url`
    pub fn page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Answer `url` with a server error
    pub fn failing(mut self, url: impl Into<String>) -> Self {
        self.failing.insert(url.into(), 500);
        self
    }

    /// Sleep for `delay` before answering `url`
    pub fn delayed(mut self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(url.into(), delay);
        self
    }

    /// URLs requested so far, in request order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Whether `url` has been requested
    pub fn was_requested(&self, url: &str) -> bool {
        self.requests().iter().any(|r| r == url)
    }
}

#[async_trait]
impl DocumentSource for MockSource {
    async fn fetch(&self, url: &str) -> Result<Document, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }

        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }

        if let Some(status) = self.failing.get(url) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            });
        }

        match self.pages.get(url) {
            Some(html) => Ok(Document::new(url, html.clone())),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_pages_and_failures() {
        let source = MockSource::new()
            .page("https://example.com/a", "<p>a</p>")
            .failing("https://example.com/b");

        let doc = source.fetch("https://example.com/a").await.unwrap();
        assert_eq!(doc.html, "<p>a</p>");

        let err = source.fetch("https://example.com/b").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 500, .. }));

        let err = source.fetch("https://example.com/c").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));

        assert_eq!(
            source.requests(),
            vec![
                "https://example.com/a".to_string(),
                "https://example.com/b".to_string(),
                "https://example.com/c".to_string(),
            ]
        );
        assert!(source.was_requested("https://example.com/b"));
    }
}
