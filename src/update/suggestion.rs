//! Suggestions and warnings derived from a .travis.yml and a catalog

use std::fmt;

use indexmap::IndexMap;

use crate::document::{Section, TravisYml};
use crate::version::catalog::Catalog;
use crate::version::key::VersionKey;
use crate::version::resolver::{UpdateOptions, update, updates};

/// A proposed change to one version in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    /// Entry of the `rvm` list, replaced by any number of versions
    ///
    /// No choices removes the entry, several expand it into one entry per
    /// choice.
    List {
        from: VersionKey,
        choices: Vec<VersionKey>,
    },
    /// `rvm` of a matrix entry, replaced by exactly one version
    Single {
        section: Section,
        from: VersionKey,
        choices: Vec<VersionKey>,
        to: VersionKey,
    },
}

impl Suggestion {
    pub fn section(&self) -> Section {
        match self {
            Suggestion::List { .. } => Section::Rvm,
            Suggestion::Single { section, .. } => *section,
        }
    }

    pub fn from(&self) -> &VersionKey {
        match self {
            Suggestion::List { from, .. } | Suggestion::Single { from, .. } => from,
        }
    }

    /// All candidates found for the version
    pub fn choices(&self) -> &[VersionKey] {
        match self {
            Suggestion::List { choices, .. } | Suggestion::Single { choices, .. } => choices,
        }
    }

    /// Versions written in place of `from`
    pub fn replacements(&self) -> &[VersionKey] {
        match self {
            Suggestion::List { choices, .. } => choices,
            Suggestion::Single { to, .. } => std::slice::from_ref(to),
        }
    }
}

/// Inconsistency in the document that blocks rewriting it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Same version listed more than once in `rvm`
    Repeating(VersionKey),
    /// `allow_failures` entry matching nothing in `rvm` or `include`
    UnknownAllowFailure {
        version: VersionKey,
        matrix_key: &'static str,
    },
    /// `exclude` entry matching nothing in `rvm`
    UnknownExclude {
        version: VersionKey,
        matrix_key: &'static str,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Repeating(version) => write!(f, "{} in rvm is repeating", version),
            Warning::UnknownAllowFailure {
                version,
                matrix_key,
            } => write!(
                f,
                "{} in {}.allow_failures is not in rvm or include list",
                version, matrix_key
            ),
            Warning::UnknownExclude {
                version,
                matrix_key,
            } => write!(f, "{} in {}.exclude is not in rvm list", version, matrix_key),
        }
    }
}

/// Collect structural warnings
///
/// Repeated `rvm` versions are reported once each. Matrix references are
/// reported per entry.
pub fn warnings(doc: &TravisYml) -> Vec<Warning> {
    let rvm = doc.versions(Section::Rvm);
    let include = doc.versions(Section::Include);
    let matrix_key = doc.matrix_key().unwrap_or("matrix");

    let mut counts: IndexMap<&VersionKey, usize> = IndexMap::new();
    for version in &rvm {
        *counts.entry(version).or_default() += 1;
    }

    let mut warnings: Vec<Warning> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(version, _)| Warning::Repeating(version.clone()))
        .collect();

    warnings.extend(
        doc.versions(Section::AllowFailures)
            .into_iter()
            .filter(|version| !rvm.contains(version) && !include.contains(version))
            .map(|version| Warning::UnknownAllowFailure {
                version,
                matrix_key,
            }),
    );

    warnings.extend(
        doc.versions(Section::Exclude)
            .into_iter()
            .filter(|version| !rvm.contains(version))
            .map(|version| Warning::UnknownExclude {
                version,
                matrix_key,
            }),
    );

    warnings
}

/// Derive suggestions for every section, `rvm` first
///
/// `rvm` entries share one deduplicated update map. Each matrix entry is
/// resolved on its own and moves to the first candidate, or the last one
/// for `include`; entries whose candidates still contain them are left
/// alone.
pub fn suggestions(doc: &TravisYml, catalog: &Catalog, options: &UpdateOptions) -> Vec<Suggestion> {
    let rvm = doc.versions(Section::Rvm);
    let update_map = updates(catalog, &rvm, options);

    let mut suggestions: Vec<Suggestion> = rvm
        .iter()
        .filter_map(|version| {
            let choices = update_map.get(version).cloned().flatten()?;
            Some(Suggestion::List {
                from: version.clone(),
                choices,
            })
        })
        .collect();

    for section in Section::MATRIX {
        for version in doc.versions(section) {
            let Some(choices) = update(catalog, &version, options) else {
                continue;
            };
            if choices.contains(&version) {
                continue;
            }

            let to = if section == Section::Include {
                choices.last()
            } else {
                choices.first()
            };
            let Some(to) = to.cloned() else {
                continue;
            };

            suggestions.push(Suggestion::Single {
                section,
                from: version,
                choices,
                to,
            });
        }
    }

    suggestions
}
