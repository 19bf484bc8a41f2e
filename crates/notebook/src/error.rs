use thiserror::Error;

/// Result type for notebook operations
pub type Result<T> = std::result::Result<T, NotebookError>;

/// Errors that can occur while loading or querying a notebook
#[derive(Error, Debug)]
pub enum NotebookError {
    /// Top-level structure is not a JSON object with a `cells` array
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// Input bytes are not valid UTF-8
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// Query referenced a cell that does not exist
    #[error("Cell index {index} out of range (notebook has {len} cells)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Reader configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Search pattern could not be compiled
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// IO error while reading the document
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NotebookError {
    /// Create a malformed document error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedDocument(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(msg: impl Into<String>) -> Self {
        Self::InvalidPattern(msg.into())
    }

    /// Whether the error is scoped to a single query rather than the load
    #[must_use]
    pub const fn is_query_error(&self) -> bool {
        matches!(self, Self::IndexOutOfRange { .. } | Self::InvalidPattern(_))
    }
}
