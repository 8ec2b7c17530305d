//! Error types for summaries and reports.

use thiserror::Error;

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, SummaryError>;

/// Errors that can occur while building summaries and reports.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// DataFrame construction error.
    #[error("DataFrame error: {0}")]
    Frame(#[from] polars::error::PolarsError),
}
