//! Export error types.

use thiserror::Error;

/// Errors that can occur while exporting a condition.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The JSON document could not be encoded.
    #[error("failed to encode condition as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;
