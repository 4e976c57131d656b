//! Page fetching

use std::sync::Arc;

use async_trait::async_trait;

use super::types::IngestError;
use crate::config::SourceConfig;

/// Source of edition and weekly pages
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Body of the page at `url` as text
    async fn fetch_text(&self, url: &str) -> Result<String, IngestError>;
}

#[async_trait]
impl<T: SourceFetcher + ?Sized> SourceFetcher for Arc<T> {
    async fn fetch_text(&self, url: &str) -> Result<String, IngestError> {
        (**self).fetch_text(url).await
    }
}

/// Fetcher backed by a shared reqwest client
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &SourceConfig) -> Result<Self, IngestError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, IngestError> {
        tracing::debug!(url, "fetching page");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
