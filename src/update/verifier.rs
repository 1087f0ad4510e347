//! Check that rewritten text means what the suggestions say

use serde_json::Value;
use tracing::error;

use crate::document::{Section, to_logical_value};
use crate::update::error::UpdateError;
use crate::update::suggestion::Suggestion;
use crate::version::key::VersionKey;

/// Compare the reparsed `updated` text with `original` plus the suggestions
/// applied to its data model
pub fn verify(
    original: &str,
    updated: &str,
    matrix_key: &str,
    suggestions: &[Suggestion],
) -> Result<(), UpdateError> {
    let expected = expected_value(to_logical_value(original)?, matrix_key, suggestions);
    let actual = to_logical_value(updated)?;

    if actual != expected {
        error!("Updated content does not match expected values");
        return Err(UpdateError::VerificationFailed {
            content: updated.to_string(),
        });
    }

    Ok(())
}

/// Apply suggestions directly to a logical value
pub fn expected_value(mut value: Value, matrix_key: &str, suggestions: &[Suggestion]) -> Value {
    for suggestion in suggestions {
        match suggestion.section() {
            Section::Rvm => replace_in_rvm(&mut value, suggestion),
            section => {
                if let Some(entries) = value
                    .get_mut(matrix_key)
                    .and_then(|matrix| matrix.get_mut(section.as_str()))
                    .and_then(Value::as_array_mut)
                {
                    replace_in_matrix(entries, suggestion);
                }
            }
        }
    }

    value
}

fn declares(value: &Value, version: &VersionKey) -> bool {
    value
        .as_str()
        .is_some_and(|s| VersionKey::parse(s) == *version)
}

/// Rewrite a scalar the way the mutator does, keeping any prefix
fn replaced(original: &Value, from: &VersionKey, to: &VersionKey) -> Value {
    let text = match original.as_str() {
        Some(s) if s.contains(from.as_str()) => s.replacen(from.as_str(), to.as_str(), 1),
        _ => to.as_str().to_string(),
    };
    Value::String(text)
}

fn replace_in_rvm(value: &mut Value, suggestion: &Suggestion) {
    let from = suggestion.from();
    let Some(rvm) = value.get_mut(Section::Rvm.as_str()) else {
        return;
    };

    match rvm {
        Value::Array(items) => {
            if let Some(index) = items.iter().position(|item| declares(item, from)) {
                let replacements: Vec<Value> = suggestion
                    .replacements()
                    .iter()
                    .map(|to| replaced(&items[index], from, to))
                    .collect();
                items.splice(index..=index, replacements);
            }
        }
        scalar => {
            if let [to] = suggestion.replacements()
                && declares(scalar, from)
            {
                *scalar = replaced(scalar, from, to);
            }
        }
    }
}

fn replace_in_matrix(entries: &mut [Value], suggestion: &Suggestion) {
    let from = suggestion.from();
    let Some(rvm) = entries
        .iter_mut()
        .filter_map(|entry| entry.get_mut(Section::Rvm.as_str()))
        .find(|rvm| declares(rvm, from))
    else {
        return;
    };

    if let [to] = suggestion.replacements() {
        *rvm = replaced(rvm, from, to);
    }
}
