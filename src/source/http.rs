//! HTTP document source
//!
//! Fetches pages with a shared reqwest client.

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use tracing::{debug, instrument, warn};

use super::{Document, DocumentSource, FetchError, SourceConfig};

/// Document source that fetches pages over HTTP
#[derive(Debug, Clone)]
pub struct HttpSource {
    /// The underlying reqwest client
    client: ReqwestClient,
}

impl HttpSource {
    /// Create a source with default configuration
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(&SourceConfig::default())
    }

    /// Create a source with custom configuration
    pub fn with_config(config: &SourceConfig) -> Result<Self, FetchError> {
        let client = ReqwestClient::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    #[instrument(skip(self), level = "debug")]
    async fn fetch(&self, url: &str) -> Result<Document, FetchError> {
        let url = url::Url::parse(url)?;

        debug!("Sending GET request to {}", url);
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Request to {} failed with status {}", url, status);
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await?;
        Ok(Document::new(url.as_str(), html))
    }
}
