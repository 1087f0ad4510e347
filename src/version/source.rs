//! VersionSource trait for fetching installable version strings

#[cfg(test)]
use mockall::automock;

use crate::version::error::SourceError;

/// Trait for fetching the raw version strings offered by a remote index
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait VersionSource: Send + Sync {
    /// Short name used in logs (e.g. "travis", "rvm")
    fn name(&self) -> &'static str;

    /// Fetches every version string the index offers
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Individual version tokens without newlines, in no particular order
    /// * `Err(SourceError)` - If the fetch fails
    async fn fetch(&self) -> Result<Vec<String>, SourceError>;
}
