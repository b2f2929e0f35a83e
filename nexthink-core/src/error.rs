//! Core error types.

use thiserror::Error;

/// Errors raised when parsing the closed value sets of the API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Region string is not one of the supported regions.
    #[error("invalid region '{0}': must be one of: us, eu, pac, meta")]
    InvalidRegion(String),

    /// Export status string is not part of the job state machine.
    #[error("invalid export status: {0}")]
    InvalidExportStatus(String),

    /// Export format is neither csv nor json.
    #[error("format must be either 'csv' or 'json', got: {0}")]
    InvalidExportFormat(String),
}
