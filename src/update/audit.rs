//! Check and update runs over a .travis.yml

use std::path::Path;

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::document::{Section, TravisYml};
use crate::update::error::UpdateError;
use crate::update::mutator;
use crate::update::suggestion::{Suggestion, Warning, suggestions, warnings};
use crate::update::verifier;
use crate::update::writer::write_atomic;
use crate::version::catalog::Catalog;
use crate::version::resolver::UpdateOptions;

/// Warnings and suggestions for one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub warnings: Vec<Warning>,
    pub suggestions: Vec<Suggestion>,
}

impl Report {
    pub fn new(doc: &TravisYml, catalog: &Catalog, options: &UpdateOptions) -> Self {
        Self {
            warnings: warnings(doc),
            suggestions: suggestions(doc, catalog, options),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.suggestions.is_empty()
    }

    /// Warnings first, then suggestions grouped by section
    ///
    /// ```text
    /// 2.4.1 in rvm is repeating
    /// rvm:
    ///   2.2.8 -> 2.2.9, 2.3.5
    /// ```
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.warnings.iter().map(ToString::to_string).collect();

        let mut by_section: IndexMap<Section, Vec<&Suggestion>> = IndexMap::new();
        for suggestion in &self.suggestions {
            by_section
                .entry(suggestion.section())
                .or_default()
                .push(suggestion);
        }

        for (section, section_suggestions) in by_section {
            lines.push(format!("{}:", section));
            for suggestion in section_suggestions {
                let choices: Vec<&str> = suggestion
                    .choices()
                    .iter()
                    .map(|version| version.as_str())
                    .collect();
                lines.push(format!("  {} -> {}", suggestion.from(), choices.join(", ")));
            }
        }

        lines
    }
}

/// Result of an update run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing to change, file untouched
    UpToDate,
    /// File rewritten with these suggestions
    Updated(Vec<Suggestion>),
    /// Document is inconsistent, file untouched
    Blocked(Vec<Warning>),
}

/// Report on the file at `path`
pub fn check(
    path: &Path,
    catalog: &Catalog,
    options: &UpdateOptions,
) -> Result<Report, UpdateError> {
    let doc = TravisYml::read(path)?;
    Ok(Report::new(&doc, catalog, options))
}

/// Rewrite the file at `path` with every suggestion applied
///
/// Nothing is written when warnings exist, when there is nothing to change,
/// or when the rewritten text fails verification.
pub fn update(
    path: &Path,
    catalog: &Catalog,
    options: &UpdateOptions,
) -> Result<UpdateOutcome, UpdateError> {
    let doc = TravisYml::read(path)?;
    let report = Report::new(&doc, catalog, options);

    if !report.warnings.is_empty() {
        warn!("{} warnings, not updating {}", report.warnings.len(), path.display());
        return Ok(UpdateOutcome::Blocked(report.warnings));
    }

    if report.suggestions.is_empty() {
        info!("{} is up to date", path.display());
        return Ok(UpdateOutcome::UpToDate);
    }

    let content = rewrite(&doc, &report.suggestions)?;
    write_atomic(path, &content)?;
    info!("Updated {}", path.display());

    Ok(UpdateOutcome::Updated(report.suggestions))
}

/// Apply suggestions to the document text and verify the result
pub fn rewrite(doc: &TravisYml, suggestions: &[Suggestion]) -> Result<String, UpdateError> {
    let content = mutator::apply(doc.content(), suggestions)?;
    verifier::verify(
        doc.content(),
        &content,
        doc.matrix_key().unwrap_or("matrix"),
        suggestions,
    )?;
    Ok(content)
}

/// One line per written version: `from -> to # section`
pub fn change_lines(suggestions: &[Suggestion]) -> Vec<String> {
    suggestions
        .iter()
        .flat_map(|suggestion| {
            let from = suggestion.from();
            let section = suggestion.section();
            let replacements = suggestion.replacements();

            if replacements.is_empty() {
                vec![format!("{} removed # {}", from, section)]
            } else {
                replacements
                    .iter()
                    .map(|to| format!("{} -> {} # {}", from, to, section))
                    .collect()
            }
        })
        .collect()
}
