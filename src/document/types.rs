//! Common types for the .travis.yml reader

/// Place in .travis.yml where a ruby version is declared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Top-level `rvm` list
    Rvm,
    /// `matrix.allow_failures[].rvm`
    AllowFailures,
    /// `matrix.exclude[].rvm`
    Exclude,
    /// `matrix.include[].rvm`
    Include,
}

impl Section {
    /// Sections holding one version per matrix entry
    pub const MATRIX: [Section; 3] = [Section::AllowFailures, Section::Exclude, Section::Include];

    /// Returns the YAML key of the section
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Rvm => "rvm",
            Section::AllowFailures => "allow_failures",
            Section::Exclude => "exclude",
            Section::Include => "include",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Span of a scalar on a single line
///
/// Columns are byte offsets into the line and cover the whole scalar,
/// quotes included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locator {
    /// Line number (0-indexed)
    pub line: usize,
    pub start_column: usize,
    pub end_column: usize,
}

/// How the scalar sits in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStyle {
    /// `- 2.4.1` on its own line in a block sequence
    BlockItem,
    /// Anything else: flow sequence items, plain mapping values
    Inline,
}

/// A version string found in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    /// Scalar value with quotes removed
    pub value: String,
    pub locator: Locator,
    pub style: EntryStyle,
}
