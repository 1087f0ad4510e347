use thiserror::Error;

/// Error type for reading .travis.yml
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Tree-sitter related error
    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),

    /// Failed to parse the file structure
    #[error("Failed to parse file: {0}")]
    ParseFailed(String),
}
