//! Versions RVM knows how to install

use std::sync::Arc;

use crate::version::error::SourceError;
use crate::version::source::VersionSource;
use crate::version::sources::{Fetcher, index_lines};

/// RVM's `known_strings` list, one version per line
pub struct RvmIndex {
    fetcher: Arc<Fetcher>,
    url: String,
}

impl RvmIndex {
    pub fn new(fetcher: Arc<Fetcher>, url: &str) -> Self {
        Self {
            fetcher,
            url: url.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl VersionSource for RvmIndex {
    fn name(&self) -> &'static str {
        "rvm"
    }

    async fn fetch(&self) -> Result<Vec<String>, SourceError> {
        let body = self.fetcher.data(&self.url).await?;
        Ok(index_lines(&body).map(str::to_string).collect())
    }
}
