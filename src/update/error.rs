use thiserror::Error;

use crate::document::{DocumentError, Section};

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("Didn't find {from} in {line:?}")]
    LocatorDrift { from: String, line: String },

    #[error("Can't {action} {from} in {section}: expected a block sequence item on its own line")]
    UnsupportedLayout {
        section: Section,
        from: String,
        action: &'static str,
    },

    #[error("Didn't find {from} in {section}")]
    EntryNotFound { section: Section, from: String },

    #[error("Updated content does not match expected values")]
    VerificationFailed { content: String },

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to replace file: {0}")]
    Persist(#[from] tempfile::PersistError),
}
