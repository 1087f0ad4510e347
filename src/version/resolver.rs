//! Update candidate selection
//!
//! Given a tracked version and a [`Catalog`], finds the versions worth
//! upgrading to at each requested granularity (number of leading numeric
//! parts that must stay the same).

use std::collections::{BTreeSet, HashSet};

use indexmap::IndexMap;

use crate::version::catalog::Catalog;
use crate::version::key::VersionKey;

/// Granularities used when none are given: any version, same major, same minor
pub const DEFAULT_PARTS: [usize; 3] = [0, 1, 2];

/// Options controlling candidate selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Granularities to search at
    pub parts: Vec<usize>,
    /// Offer pre-releases for stable versions
    pub allow_pre: bool,
    /// Return the best candidate per granularity within every newer group
    /// instead of the single best candidate per granularity
    pub intermediary: bool,
    /// Each entry hides candidates agreeing with it on all of its numeric parts
    pub exclude: Vec<VersionKey>,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            parts: DEFAULT_PARTS.to_vec(),
            allow_pre: false,
            intermediary: true,
            exclude: Vec::new(),
        }
    }
}

/// Compute upgrade candidates for a single version
///
/// # Returns
/// * `None` - The version has no numeric parts, or it is already the only candidate
/// * `Some(vec![])` - Nothing in the catalog can replace the version
/// * `Some(candidates)` - Candidates sorted ascending (may include the version itself)
pub fn update(
    catalog: &Catalog,
    target: &VersionKey,
    options: &UpdateOptions,
) -> Option<Vec<VersionKey>> {
    target.numeric_parts()?;
    let min_parts = options.parts.iter().copied().min()?;
    let max_parts = options.parts.iter().copied().max()?;

    let pool: Vec<&VersionKey> = catalog
        .versions()
        .iter()
        .filter(|v| is_candidate(v, target, min_parts, options))
        .collect();

    // Highest first; without allow_pre stable releases are preferred over
    // pre-releases, which only remain when the target is one itself
    let scan: Vec<&VersionKey> = if options.allow_pre {
        pool.iter().rev().copied().collect()
    } else {
        let (stable, pre): (Vec<&VersionKey>, Vec<&VersionKey>) =
            pool.iter().rev().copied().partition(|v| !v.is_pre_release());
        stable.into_iter().chain(pre).collect()
    };

    let picks: BTreeSet<VersionKey> = if options.intermediary {
        let mut groups: IndexMap<&[u64], Vec<&VersionKey>> = IndexMap::new();
        for &version in &scan {
            let parts = version.numeric_parts().unwrap_or_default();
            let key = &parts[..max_parts.min(parts.len())];
            groups.entry(key).or_default().push(version);
        }

        groups
            .values()
            .flat_map(|group| {
                options
                    .parts
                    .iter()
                    .filter_map(move |&n| group.iter().find(|v| v.matches(target, n)))
            })
            .map(|v| (*v).clone())
            .collect()
    } else {
        options
            .parts
            .iter()
            .filter_map(|&n| scan.iter().find(|v| v.matches(target, n)))
            .map(|v| (*v).clone())
            .collect()
    };

    let picks: Vec<VersionKey> = picks.into_iter().collect();
    if picks.len() == 1 && picks[0] == *target {
        None
    } else {
        Some(picks)
    }
}

fn is_candidate(
    version: &VersionKey,
    target: &VersionKey,
    min_parts: usize,
    options: &UpdateOptions,
) -> bool {
    version.numeric_parts().is_some()
        && version.matches(target, min_parts)
        && version >= target
        && (options.allow_pre || target.is_pre_release() || !version.is_pre_release())
        && !options.exclude.iter().any(|excluded| shadows(excluded, version))
}

/// An exclude entry hides a version agreeing with it on all of the entry's
/// own numeric parts (`2.3` hides every `2.3.x`)
fn shadows(excluded: &VersionKey, version: &VersionKey) -> bool {
    excluded
        .numeric_parts()
        .is_some_and(|parts| excluded.matches(version, parts.len()))
}

/// Compute updates for a set of tracked versions
///
/// Versions are processed from highest to lowest and a candidate already
/// offered to a higher version is removed from the lower ones, so no new
/// version is suggested for two tracked versions.
///
/// # Returns
/// Map keyed by distinct input versions in first-occurrence order. `None`
/// means the version should stay as is; otherwise the list replaces it
/// (an empty list removes it).
pub fn updates(
    catalog: &Catalog,
    versions: &[VersionKey],
    options: &UpdateOptions,
) -> IndexMap<VersionKey, Option<Vec<VersionKey>>> {
    let distinct: BTreeSet<&VersionKey> = versions.iter().collect();

    let mut claimed: HashSet<VersionKey> = HashSet::new();
    let mut resolved: IndexMap<&VersionKey, Option<Vec<VersionKey>>> = IndexMap::new();

    for version in distinct.into_iter().rev() {
        let candidates =
            update(catalog, version, options).unwrap_or_else(|| vec![version.clone()]);

        let surviving: Vec<VersionKey> = candidates
            .into_iter()
            .filter(|candidate| claimed.insert(candidate.clone()))
            .collect();

        let unchanged = surviving.len() == 1 && surviving[0] == *version;
        resolved.insert(version, (!unchanged).then_some(surviving));
    }

    versions
        .iter()
        .filter_map(|version| {
            resolved
                .get(version)
                .map(|update| (version.clone(), update.clone()))
        })
        .collect()
}
