//! Document layer
//! - types.rs: Section, Locator, VersionEntry
//! - travis_yml.rs: tree-sitter based .travis.yml reader
//! - error.rs: DocumentError

pub mod error;
pub mod travis_yml;
pub mod types;

pub use error::DocumentError;
pub use travis_yml::{TravisYml, to_logical_value};
pub use types::{EntryStyle, Locator, Section, VersionEntry};
