//! Cached HTTP fetching of index files

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::FETCH_TIMEOUT_MS;
use crate::version::cache::IndexStorer;
use crate::version::error::SourceError;

/// Downloads index files, serving fresh copies from the cache when possible
pub struct Fetcher {
    client: reqwest::Client,
    storer: Option<Arc<dyn IndexStorer>>,
}

impl Fetcher {
    /// Creates a fetcher; without a storer every call hits the network
    pub fn new(storer: Option<Arc<dyn IndexStorer>>) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent("travis-rubies")
            .timeout(Duration::from_millis(FETCH_TIMEOUT_MS))
            .build()?;

        Ok(Self { client, storer })
    }

    /// Returns the body of `url`, from the cache when it is still fresh
    pub async fn data(&self, url: &str) -> Result<String, SourceError> {
        if let Some(storer) = &self.storer
            && let Some(body) = storer.get_fresh(url)?
        {
            return Ok(body);
        }

        let body = self.fetch_data(url).await?;

        if let Some(storer) = &self.storer {
            storer.store(url, &body)?;
        }

        Ok(body)
    }

    async fn fetch_data(&self, url: &str) -> Result<String, SourceError> {
        debug!("Fetching {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(url.to_string()));
        }

        if !status.is_success() {
            warn!("Index returned status {}: {}", status, url);
            return Err(SourceError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        Ok(response.text().await?)
    }
}
