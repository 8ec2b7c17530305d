//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP {status} fetching {location}")]
    HttpStatus {
        /// Resource that was requested
        location: String,
        /// Status code returned by the server
        status: u16,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not available from a local or in-memory source
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// CSV decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON decoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Expected column absent from a table
    #[error("Missing column {column:?} in {resource}")]
    MissingColumn {
        /// Resource the table was read from
        resource: String,
        /// Column that was expected
        column: String,
    },

    /// Universe loaded but holds no usable security
    #[error("Universe is empty: no security survived normalization")]
    EmptyUniverse,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Cache error
    #[error("Cache error: {0}")]
    Cache(String),
}

/// Coarse classification of a [`DataError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The resource could not be retrieved.
    Fetch,
    /// The resource was retrieved but its body is malformed.
    Parse,
    /// The body parsed but an expected column or field is absent.
    Schema,
    /// Local cache failure.
    Cache,
}

impl DataError {
    /// Classify this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) | Self::HttpStatus { .. } | Self::Io(_) | Self::NotFound(_) => {
                ErrorKind::Fetch
            }
            Self::Csv(_) | Self::Serialization(_) | Self::Parse(_) => ErrorKind::Parse,
            Self::MissingColumn { .. } | Self::EmptyUniverse => ErrorKind::Schema,
            Self::Database(_) | Self::Cache(_) => ErrorKind::Cache,
        }
    }

    /// Whether the resource could not be retrieved at all.
    pub const fn is_fetch_failure(&self) -> bool {
        matches!(self.kind(), ErrorKind::Fetch)
    }
}
