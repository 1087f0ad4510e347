//! Format-preserving rewriting of version scalars
//!
//! Every edit touches only the line holding the scalar: the text before and
//! after the scalar (indentation, quotes, inline comments) is kept verbatim.

use tracing::info;

use crate::document::{EntryStyle, Locator, TravisYml};
use crate::update::error::UpdateError;
use crate::update::suggestion::Suggestion;

/// A single text substitution, resolved against the current content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub locator: Locator,
    pub style: EntryStyle,
    /// Text searched for inside the scalar
    pub from: String,
    /// Texts replacing it; one line is produced per choice
    pub choices: Vec<String>,
}

impl Edit {
    /// Locate the first entry of the suggestion's section declaring `from`
    pub fn resolve(doc: &TravisYml, suggestion: &Suggestion) -> Result<Self, UpdateError> {
        let section = suggestion.section();
        let from = suggestion.from();

        let entry = doc
            .locate(section, from)
            .ok_or_else(|| UpdateError::EntryNotFound {
                section,
                from: from.to_string(),
            })?;

        let choices: Vec<String> = suggestion
            .replacements()
            .iter()
            .map(|version| version.as_str().to_string())
            .collect();

        if choices.len() != 1 && entry.style != EntryStyle::BlockItem {
            return Err(UpdateError::UnsupportedLayout {
                section,
                from: from.to_string(),
                action: if choices.is_empty() { "remove" } else { "expand" },
            });
        }

        Ok(Self {
            locator: entry.locator,
            style: entry.style,
            from: from.as_str().to_string(),
            choices,
        })
    }
}

/// Apply suggestions one after another
///
/// The content is parsed again before each edit, so line shifts caused by
/// expansions and removals never leave a stale locator behind.
pub fn apply(content: &str, suggestions: &[Suggestion]) -> Result<String, UpdateError> {
    let mut content = content.to_string();

    for suggestion in suggestions {
        let doc = TravisYml::parse(content.as_str())?;
        let edit = Edit::resolve(&doc, suggestion)?;

        for choice in &edit.choices {
            info!("{} -> {} # {}", edit.from, choice, suggestion.section());
        }
        if edit.choices.is_empty() {
            info!("{} removed # {}", edit.from, suggestion.section());
        }

        content = splice(&content, &edit)?;
    }

    Ok(content)
}

/// Replace the scalar at the edit's locator
///
/// One choice rewrites the line in place, several choices produce one copy
/// of the line per choice (inline comments included), none removes the line.
pub fn splice(content: &str, edit: &Edit) -> Result<String, UpdateError> {
    let mut lines: Vec<&str> = content.split_inclusive('\n').collect();
    let line_index = edit.locator.line;

    let Some(line) = lines.get(line_index).copied() else {
        return Err(UpdateError::LocatorDrift {
            from: edit.from.clone(),
            line: String::new(),
        });
    };

    let body = line.trim_end_matches(['\n', '\r']);
    let terminator = &line[body.len()..];

    let drift = || UpdateError::LocatorDrift {
        from: edit.from.clone(),
        line: line.to_string(),
    };

    let before = body.get(..edit.locator.start_column).ok_or_else(drift)?;
    let excerpt = body
        .get(edit.locator.start_column..edit.locator.end_column)
        .ok_or_else(drift)?;
    let after = body.get(edit.locator.end_column..).ok_or_else(drift)?;

    if !excerpt.contains(edit.from.as_str()) {
        return Err(drift());
    }

    let separator = if terminator.is_empty() {
        "\n"
    } else {
        terminator
    };

    let replaced: Vec<String> = edit
        .choices
        .iter()
        .map(|choice| {
            format!(
                "{}{}{}",
                before,
                excerpt.replacen(edit.from.as_str(), choice, 1),
                after
            )
        })
        .collect();

    let new_line = if replaced.is_empty() {
        String::new()
    } else {
        format!("{}{}", replaced.join(separator), terminator)
    };

    lines[line_index] = new_line.as_str();
    Ok(lines.concat())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Section;
    use crate::version::key::VersionKey;
    use rstest::rstest;

    const TRAVIS_YML: &str = "language: ruby\nrvm:\n  - '2.2.8' # bar\n  - 2.3.4\nscript: rake\n";

    fn edit_at(line: usize, start: usize, end: usize, from: &str, choices: &[&str]) -> Edit {
        Edit {
            locator: Locator {
                line,
                start_column: start,
                end_column: end,
            },
            style: EntryStyle::BlockItem,
            from: from.to_string(),
            choices: choices.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn list(from: &str, choices: &[&str]) -> Suggestion {
        Suggestion::List {
            from: VersionKey::parse(from),
            choices: choices.iter().map(|c| VersionKey::parse(c)).collect(),
        }
    }

    #[test]
    fn splice_replaces_version_in_place() {
        let result = splice(TRAVIS_YML, &edit_at(2, 4, 11, "2.2.8", &["2.2.9"])).unwrap();

        assert_eq!(
            result,
            "language: ruby\nrvm:\n  - '2.2.9' # bar\n  - 2.3.4\nscript: rake\n"
        );
    }

    #[test]
    fn splice_expands_line_per_choice_keeping_comment() {
        let result = splice(TRAVIS_YML, &edit_at(2, 4, 11, "2.2.8", &["2.2.9", "2.3.4"])).unwrap();

        assert_eq!(
            result,
            "language: ruby\nrvm:\n  - '2.2.9' # bar\n  - '2.3.4' # bar\n  - 2.3.4\nscript: rake\n"
        );
    }

    #[test]
    fn splice_removes_line_without_choices() {
        let result = splice(TRAVIS_YML, &edit_at(3, 4, 9, "2.3.4", &[])).unwrap();

        assert_eq!(result, "language: ruby\nrvm:\n  - '2.2.8' # bar\nscript: rake\n");
    }

    #[test]
    fn splice_keeps_prefix_of_version() {
        let content = "rvm:\n  - ruby-2.4.1\n";

        let result = splice(content, &edit_at(1, 4, 14, "2.4.1", &["2.4.2"])).unwrap();

        assert_eq!(result, "rvm:\n  - ruby-2.4.2\n");
    }

    #[test]
    fn splice_expands_last_line_without_newline() {
        let content = "rvm:\n  - 2.4.1";

        let result = splice(content, &edit_at(1, 4, 9, "2.4.1", &["2.4.2", "2.5.0"])).unwrap();

        assert_eq!(result, "rvm:\n  - 2.4.2\n  - 2.5.0");
    }

    #[test]
    fn splice_keeps_crlf_line_endings() {
        let content = "rvm:\r\n  - 2.4.1\r\nscript: rake\r\n";

        let result = splice(content, &edit_at(1, 4, 9, "2.4.1", &["2.4.2", "2.5.0"])).unwrap();

        assert_eq!(result, "rvm:\r\n  - 2.4.2\r\n  - 2.5.0\r\nscript: rake\r\n");
    }

    #[rstest]
    #[case::wrong_text(edit_at(3, 4, 9, "2.2.8", &["2.2.9"]))]
    #[case::span_past_line(edit_at(3, 4, 40, "2.3.4", &["2.3.5"]))]
    #[case::line_past_end(edit_at(9, 4, 9, "2.3.4", &["2.3.5"]))]
    fn splice_fails_on_locator_drift(#[case] edit: Edit) {
        let result = splice(TRAVIS_YML, &edit);

        assert!(matches!(result, Err(UpdateError::LocatorDrift { .. })));
    }

    #[test]
    fn apply_relocates_entries_after_expansion() {
        let content = "rvm:\n  - 2.2.8\n  - 2.3.4 # keep\n  - 2.4.1\n";
        let suggestions = vec![
            list("2.2.8", &["2.2.9", "2.3.5"]),
            list("2.3.4", &[]),
            list("2.4.1", &["2.4.2"]),
        ];

        let result = apply(content, &suggestions).unwrap();

        assert_eq!(result, "rvm:\n  - 2.2.9\n  - 2.3.5\n  - 2.4.2\n");
    }

    #[test]
    fn apply_rewrites_matrix_entries_in_order() {
        let content = r#"rvm:
  - 2.3.4
matrix:
  exclude:
    - rvm: 2.2.8
      env: A=1
    - rvm: 2.2.8
      env: B=1
"#;
        let single = |to: &str| Suggestion::Single {
            section: Section::Exclude,
            from: VersionKey::parse("2.2.8"),
            choices: vec![VersionKey::parse(to)],
            to: VersionKey::parse(to),
        };

        let result = apply(content, &[single("2.2.9"), single("2.2.9")]).unwrap();

        assert_eq!(result, content.replace("2.2.8", "2.2.9"));
    }

    #[test]
    fn apply_rejects_expanding_flow_sequence() {
        let result = apply("rvm: [2.2.8]\n", &[list("2.2.8", &["2.2.9", "2.3.5"])]);

        assert!(matches!(
            result,
            Err(UpdateError::UnsupportedLayout {
                action: "expand",
                ..
            })
        ));
    }

    #[test]
    fn apply_replaces_single_choice_in_flow_sequence() {
        let result = apply("rvm: [2.2.8, 2.3.4]\n", &[list("2.2.8", &["2.2.9"])]).unwrap();

        assert_eq!(result, "rvm: [2.2.9, 2.3.4]\n");
    }

    #[test]
    fn apply_fails_for_missing_entry() {
        let result = apply("rvm:\n  - 2.3.4\n", &[list("2.2.8", &["2.2.9"])]);

        assert!(matches!(result, Err(UpdateError::EntryNotFound { .. })));
    }
}
