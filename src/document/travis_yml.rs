//! .travis.yml reader

use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};
use tree_sitter::{Node, Tree};

use crate::document::error::DocumentError;
use crate::document::types::{EntryStyle, Locator, Section, VersionEntry};
use crate::version::key::VersionKey;

/// Keys under which matrix sections are looked up, in order of preference
const MATRIX_KEYS: [&str; 2] = ["matrix", "jobs"];

/// Structural view of a .travis.yml
///
/// Holds the ruby versions declared in `rvm` and in the matrix sections,
/// each with the position of its scalar in the source text.
///
/// YAML tree structure:
/// ```text
/// stream
///   document
///     block_node
///       block_mapping
///         block_mapping_pair          <- "rvm: ..."
///           flow_node                 <- key: "rvm"
///           block_node
///             block_sequence
///               block_sequence_item   <- "- 2.4.1"
///                 flow_node
///                   plain_scalar      <- TARGET
///         block_mapping_pair          <- "matrix: ..."
///           block_node
///             block_mapping
///               block_mapping_pair    <- "include: ..."
///                 block_node
///                   block_sequence
///                     block_sequence_item
///                       block_node
///                         block_mapping
///                           block_mapping_pair  <- "rvm: 2.4.1"
///                             flow_node         <- TARGET
/// ```
#[derive(Debug, Clone)]
pub struct TravisYml {
    content: String,
    rvm: Vec<VersionEntry>,
    matrix_key: Option<&'static str>,
    allow_failures: Vec<VersionEntry>,
    exclude: Vec<VersionEntry>,
    include: Vec<VersionEntry>,
}

impl TravisYml {
    /// Read and parse a file
    pub fn read(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(content)
    }

    pub fn parse(content: impl Into<String>) -> Result<Self, DocumentError> {
        let content = content.into();
        let tree = parse_tree(&content)?;

        let mut doc = Self {
            rvm: Vec::new(),
            matrix_key: None,
            allow_failures: Vec::new(),
            exclude: Vec::new(),
            include: Vec::new(),
            content: String::new(),
        };

        if let Some(root) = root_value(&tree) {
            doc.rvm = rvm_entries(root, &content);

            if let Some((key, matrix)) = MATRIX_KEYS
                .iter()
                .find_map(|key| mapping_value(root, key, &content).map(|node| (*key, node)))
            {
                doc.matrix_key = Some(key);
                doc.allow_failures = matrix_entries(matrix, Section::AllowFailures, &content);
                doc.exclude = matrix_entries(matrix, Section::Exclude, &content);
                doc.include = matrix_entries(matrix, Section::Include, &content);
            }
        }

        debug!(
            "Found {} rvm entries and {} matrix entries",
            doc.rvm.len(),
            doc.allow_failures.len() + doc.exclude.len() + doc.include.len()
        );

        doc.content = content;
        Ok(doc)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Key holding the matrix sections (`matrix` or `jobs`), if any
    pub fn matrix_key(&self) -> Option<&'static str> {
        self.matrix_key
    }

    pub fn entries(&self, section: Section) -> &[VersionEntry] {
        match section {
            Section::Rvm => &self.rvm,
            Section::AllowFailures => &self.allow_failures,
            Section::Exclude => &self.exclude,
            Section::Include => &self.include,
        }
    }

    /// Parsed versions of a section, in document order
    pub fn versions(&self, section: Section) -> Vec<VersionKey> {
        self.entries(section)
            .iter()
            .map(|entry| VersionKey::parse(&entry.value))
            .collect()
    }

    /// First entry of a section declaring `version`
    pub fn locate(&self, section: Section, version: &VersionKey) -> Option<&VersionEntry> {
        self.entries(section)
            .iter()
            .find(|entry| VersionKey::parse(&entry.value) == *version)
    }

    pub fn to_logical_value(&self) -> Result<Value, DocumentError> {
        to_logical_value(&self.content)
    }
}

/// Build the data model of the first document
///
/// Mappings become objects, sequences become arrays and every scalar becomes
/// a string, so `2.10` and `2.1` stay distinct. Null and missing values
/// become `Value::Null`.
pub fn to_logical_value(content: &str) -> Result<Value, DocumentError> {
    let tree = parse_tree(content)?;
    Ok(root_value(&tree).map_or(Value::Null, |node| logical_value(node, content)))
}

fn parse_tree(content: &str) -> Result<Tree, DocumentError> {
    let mut parser = tree_sitter::Parser::new();
    let language = tree_sitter_yaml::LANGUAGE;
    parser.set_language(&language.into()).map_err(|e| {
        warn!("Failed to set YAML language for tree-sitter: {}", e);
        DocumentError::TreeSitter(e.to_string())
    })?;

    let tree = parser.parse(content, None).ok_or_else(|| {
        warn!("Failed to parse YAML content");
        DocumentError::ParseFailed("Failed to parse YAML".to_string())
    })?;

    if tree.root_node().has_error() {
        return Err(DocumentError::ParseFailed("Invalid YAML syntax".to_string()));
    }

    Ok(tree)
}

/// Top node of the first document
fn root_value(tree: &Tree) -> Option<Node<'_>> {
    let stream = tree.root_node();
    let mut cursor = stream.walk();
    let document = stream
        .named_children(&mut cursor)
        .find(|node| node.kind() == "document")?;

    let mut cursor = document.walk();
    let root = document
        .named_children(&mut cursor)
        .find(|node| matches!(node.kind(), "block_node" | "flow_node"));
    root
}

/// Unwrap `block_node`/`flow_node`, skipping anchors and tags
fn content_node(node: Node<'_>) -> Option<Node<'_>> {
    if !matches!(node.kind(), "block_node" | "flow_node") {
        return Some(node);
    }

    let mut cursor = node.walk();
    let inner = node
        .named_children(&mut cursor)
        .find(|child| !matches!(child.kind(), "anchor" | "tag" | "comment"));
    inner
}

fn scalar_node(node: Node<'_>) -> Option<Node<'_>> {
    content_node(node).filter(|inner| {
        matches!(
            inner.kind(),
            "plain_scalar" | "single_quote_scalar" | "double_quote_scalar"
        )
    })
}

fn pairs(mapping: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = mapping.walk();
    mapping
        .named_children(&mut cursor)
        .filter(|child| matches!(child.kind(), "block_mapping_pair" | "flow_pair"))
        .collect()
}

/// Value node stored under `key` when `node` is a mapping
fn mapping_value<'t>(node: Node<'t>, key: &str, content: &str) -> Option<Node<'t>> {
    let mapping = content_node(node)?;
    if !matches!(mapping.kind(), "block_mapping" | "flow_mapping") {
        return None;
    }

    pairs(mapping)
        .into_iter()
        .find(|pair| {
            pair.child_by_field_name("key")
                .and_then(scalar_node)
                .is_some_and(|scalar| decode_scalar(scalar, content) == key)
        })
        .and_then(|pair| pair.child_by_field_name("value"))
}

/// Items of a block or flow sequence, with the style of each item
fn sequence_items(node: Node<'_>) -> Vec<(Node<'_>, EntryStyle)> {
    let Some(sequence) = content_node(node) else {
        return Vec::new();
    };

    let mut cursor = sequence.walk();
    match sequence.kind() {
        "block_sequence" => sequence
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "block_sequence_item")
            .filter_map(|item| {
                let mut item_cursor = item.walk();
                let value = item
                    .named_children(&mut item_cursor)
                    .find(|child| child.kind() != "comment")?;

                let same_line = value.start_position().row == item.start_position().row
                    && value.end_position().row == item.start_position().row;
                let style = if same_line {
                    EntryStyle::BlockItem
                } else {
                    EntryStyle::Inline
                };
                Some((value, style))
            })
            .collect(),
        "flow_sequence" => sequence
            .named_children(&mut cursor)
            .filter(|child| child.kind() != "comment")
            .map(|child| (child, EntryStyle::Inline))
            .collect(),
        _ => Vec::new(),
    }
}

fn version_entry(node: Node<'_>, style: EntryStyle, content: &str) -> Option<VersionEntry> {
    let scalar = scalar_node(node)?;
    let start = scalar.start_position();
    let end = scalar.end_position();

    let (end_column, style) = if end.row == start.row {
        (end.column, style)
    } else {
        let line_len = content.lines().nth(start.row).map_or(start.column, str::len);
        (line_len, EntryStyle::Inline)
    };

    Some(VersionEntry {
        value: decode_scalar(scalar, content),
        locator: Locator {
            line: start.row,
            start_column: start.column,
            end_column,
        },
        style,
    })
}

/// `rvm` may be a sequence or a single scalar
fn rvm_entries(root: Node<'_>, content: &str) -> Vec<VersionEntry> {
    let Some(rvm) = mapping_value(root, Section::Rvm.as_str(), content) else {
        return Vec::new();
    };

    if scalar_node(rvm).is_some() {
        return version_entry(rvm, EntryStyle::Inline, content)
            .into_iter()
            .collect();
    }

    sequence_items(rvm)
        .into_iter()
        .filter_map(|(item, style)| version_entry(item, style, content))
        .collect()
}

/// `rvm` values of the mappings listed in a matrix section
fn matrix_entries(matrix: Node<'_>, section: Section, content: &str) -> Vec<VersionEntry> {
    let Some(list) = mapping_value(matrix, section.as_str(), content) else {
        return Vec::new();
    };

    sequence_items(list)
        .into_iter()
        .filter_map(|(item, _)| mapping_value(item, Section::Rvm.as_str(), content))
        .filter_map(|rvm| version_entry(rvm, EntryStyle::Inline, content))
        .collect()
}

fn logical_value(node: Node<'_>, content: &str) -> Value {
    let Some(inner) = content_node(node) else {
        return Value::Null;
    };

    match inner.kind() {
        "block_mapping" | "flow_mapping" => {
            let mut map = serde_json::Map::new();
            for pair in pairs(inner) {
                let key = match pair.child_by_field_name("key").map(|k| logical_value(k, content)) {
                    Some(Value::String(key)) => key,
                    Some(Value::Null) | None => String::new(),
                    Some(other) => other.to_string(),
                };
                let value = pair
                    .child_by_field_name("value")
                    .map_or(Value::Null, |v| logical_value(v, content));
                map.insert(key, value);
            }
            Value::Object(map)
        }
        "block_sequence" | "flow_sequence" => Value::Array(
            sequence_items(inner)
                .into_iter()
                .map(|(item, _)| logical_value(item, content))
                .collect(),
        ),
        "flow_pair" => {
            let mut map = serde_json::Map::new();
            let key = inner
                .child_by_field_name("key")
                .and_then(scalar_node)
                .map(|k| decode_scalar(k, content))
                .unwrap_or_default();
            let value = inner
                .child_by_field_name("value")
                .map_or(Value::Null, |v| logical_value(v, content));
            map.insert(key, value);
            Value::Object(map)
        }
        "plain_scalar" => {
            let is_null = inner
                .named_child(0)
                .is_some_and(|child| child.kind() == "null_scalar");
            if is_null {
                Value::Null
            } else {
                Value::String(decode_scalar(inner, content))
            }
        }
        "single_quote_scalar" | "double_quote_scalar" => {
            Value::String(decode_scalar(inner, content))
        }
        _ => Value::String(content[inner.byte_range()].to_string()),
    }
}

/// Text of a scalar with quotes removed and escapes decoded
fn decode_scalar(node: Node<'_>, content: &str) -> String {
    let text = &content[node.byte_range()];

    match node.kind() {
        "single_quote_scalar" => fold_lines(strip_quotes(text, '\'')).replace("''", "'"),
        "double_quote_scalar" => unescape(&fold_lines(strip_quotes(text, '"'))),
        _ => fold_lines(text.trim()),
    }
}

fn strip_quotes(text: &str, quote: char) -> &str {
    text.strip_prefix(quote)
        .and_then(|rest| rest.strip_suffix(quote))
        .unwrap_or(text)
}

/// Multi-line flow scalars fold line breaks into spaces
fn fold_lines(text: &str) -> String {
    if !text.contains('\n') {
        return text.to_string();
    }

    text.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ")
}

fn unescape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some('"') => result.push('"'),
            Some('/') => result.push('/'),
            Some('\\') => result.push('\\'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}
