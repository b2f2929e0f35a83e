//! Export job types.
//!
//! An export runs server-side and moves through a small state machine:
//!
//! ```text
//! SUBMITTED -> IN_PROGRESS -> COMPLETED
//!                          \-> ERROR
//! ```
//!
//! `COMPLETED` and `ERROR` are terminal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ============================================================================
// Export Status
// ============================================================================

/// Status of an asynchronous export job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExportStatus {
    /// Export is queued.
    Submitted,
    /// Export is running.
    InProgress,
    /// Export finished and a results file is available.
    Completed,
    /// Export failed.
    Error,
}

impl ExportStatus {
    /// Returns the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "SUBMITTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Error => "ERROR",
        }
    }

    /// Returns true if no further transitions can occur.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUBMITTED" => Ok(Self::Submitted),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "ERROR" => Ok(Self::Error),
            other => Err(CoreError::InvalidExportStatus(other.to_string())),
        }
    }
}

// ============================================================================
// Export Format
// ============================================================================

/// File format produced by an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-separated values (server default).
    #[default]
    Csv,
    /// JSON document.
    Json,
}

impl ExportFormat {
    /// Returns the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(CoreError::InvalidExportFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!ExportStatus::Submitted.is_terminal());
        assert!(!ExportStatus::InProgress.is_terminal());
        assert!(ExportStatus::Completed.is_terminal());
        assert!(ExportStatus::Error.is_terminal());
    }

    #[test]
    fn test_status_wire_format() {
        let status: ExportStatus = serde_json::from_str(r#""IN_PROGRESS""#).unwrap();
        assert_eq!(status, ExportStatus::InProgress);
        assert_eq!(
            serde_json::to_string(&ExportStatus::Completed).unwrap(),
            r#""COMPLETED""#
        );
        assert!(serde_json::from_str::<ExportStatus>(r#""DONE""#).is_err());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("ERROR".parse::<ExportStatus>().unwrap(), ExportStatus::Error);
        assert!("completed".parse::<ExportStatus>().is_err());
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::default(), ExportFormat::Csv);
        assert_eq!(
            "xml".parse::<ExportFormat>(),
            Err(CoreError::InvalidExportFormat("xml".to_string()))
        );
    }
}
