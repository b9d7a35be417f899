use thiserror::Error;

/// Convenience result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Error type returned by loading functions.
///
/// Row-level problems in a text document are never reported through this type; they are
/// collected as [`crate::ingestion::ParseDiagnostic`]s next to the built database.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Options/config could not be read.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// Values do not conform to the record type's [`crate::types::Schema`].
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A binary blob is malformed, truncated, or was written for a different schema.
    #[error("invalid binary data at byte {offset}: {message}")]
    Binary { offset: usize, message: String },

    /// The input format could not be determined or is not supported.
    #[error("unsupported format: {message}")]
    UnsupportedFormat { message: String },
}
