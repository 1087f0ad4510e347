//! Ordered, duplicate-free set of installable versions

use std::collections::BTreeSet;

use futures::future::try_join_all;
use tracing::{debug, info};

use crate::version::error::SourceError;
use crate::version::key::VersionKey;
use crate::version::source::VersionSource;

/// Installable versions sorted ascending
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    versions: Vec<VersionKey>,
}

impl Catalog {
    /// Merge raw version strings from several sources.
    ///
    /// Strings are collapsed before parsing, so the result does not depend on
    /// source order. Blank lines are skipped.
    pub fn build<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = String>,
    {
        let raw: BTreeSet<String> = sources
            .into_iter()
            .flatten()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let versions: BTreeSet<VersionKey> = raw.iter().map(|s| VersionKey::parse(s)).collect();

        Self {
            versions: versions.into_iter().collect(),
        }
    }

    /// Fetch every source and merge the results.
    ///
    /// The first failing source aborts the whole fetch.
    pub async fn fetch(sources: &[Box<dyn VersionSource>]) -> Result<Self, SourceError> {
        let fetched = try_join_all(sources.iter().map(|source| async move {
            let versions = source.fetch().await?;
            debug!("{} returned {} versions", source.name(), versions.len());
            Ok::<_, SourceError>(versions)
        }))
        .await?;

        let catalog = Self::build(fetched);
        info!("Catalog contains {} versions", catalog.len());
        Ok(catalog)
    }

    pub fn versions(&self) -> &[VersionKey] {
        &self.versions
    }

    pub fn contains(&self, version: &VersionKey) -> bool {
        self.versions.binary_search(version).is_ok()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for Catalog {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        Self::build([iter.into_iter().map(str::to_string).collect::<Vec<_>>()])
    }
}
