//! NQL request and response types.

use chrono::{NaiveDate, NaiveDateTime};
use nexthink_core::{ExportFormat, ExportStatus};
use nexthink_transport::JobState;
use serde::{Deserialize, Serialize};

// ============================================================================
// Execute
// ============================================================================

/// Synchronous query execution request.
///
/// The query must already exist in the Nexthink admin; it is referenced by
/// its `#name` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    /// Query identifier, e.g. `#active_devices`.
    pub query_id: String,
    /// Optional platform filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

impl ExecuteRequest {
    /// Creates a request for a query.
    pub fn new(query_id: impl Into<String>) -> Self {
        Self {
            query_id: query_id.into(),
            platform: None,
        }
    }

    /// Restricts the query to a platform.
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }
}

/// Execution timestamp as returned by the V1 endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionDateTime {
    /// Year.
    pub year: i32,
    /// Month, 1-12.
    pub month: u32,
    /// Day of month.
    pub day: u32,
    /// Hour, 0-23.
    pub hour: u32,
    /// Minute.
    pub minute: u32,
    /// Second.
    pub second: u32,
}

impl ExecutionDateTime {
    /// Converts to a chrono value. `None` if the fields do not form a date.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?
            .and_hms_opt(self.hour, self.minute, self.second)
    }
}

/// V1 execute response: positional rows with a separate header list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecuteV1Response {
    /// Identifier of the executed query.
    pub query_id: String,
    /// Final query text with parameters substituted.
    pub executed_query: String,
    /// Number of rows returned.
    pub rows: i64,
    /// When the query ran.
    pub execution_date_time: Option<ExecutionDateTime>,
    /// Field names, in row order.
    pub headers: Vec<String>,
    /// Rows of values.
    pub data: Vec<Vec<serde_json::Value>>,
}

/// V2 execute response: rows as objects.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecuteV2Response {
    /// Identifier of the executed query.
    pub query_id: String,
    /// Final query text with parameters substituted.
    pub executed_query: String,
    /// Number of rows returned.
    pub rows: i64,
    /// When the query ran, ISO 8601.
    pub execution_date_time: Option<String>,
    /// Rows keyed by field name.
    pub data: Vec<serde_json::Map<String, serde_json::Value>>,
}

// ============================================================================
// Export
// ============================================================================

/// Asynchronous export request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    /// Query identifier, e.g. `#active_devices`.
    pub query_id: String,
    /// Optional platform filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Output format. The server defaults to CSV.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ExportFormat>,
}

impl ExportRequest {
    /// Creates a request for a query.
    pub fn new(query_id: impl Into<String>) -> Self {
        Self {
            query_id: query_id.into(),
            platform: None,
            format: None,
        }
    }

    /// Restricts the query to a platform.
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Selects the output format.
    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// Response to starting an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartExportResponse {
    /// Identifier used to poll the export.
    pub export_id: String,
    /// Initial status.
    pub status: ExportStatus,
    /// Informational message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Status of an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportStatusResponse {
    /// Export identifier, when echoed by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_id: Option<String>,
    /// Current status.
    pub status: ExportStatus,
    /// Pre-signed download URL. Present once `COMPLETED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_file_url: Option<String>,
    /// Failure reason. Present once `ERROR`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl ExportStatusResponse {
    /// Returns true if the export completed successfully.
    pub fn is_completed(&self) -> bool {
        self.status == ExportStatus::Completed
    }

    /// Returns true if the export failed.
    pub fn is_failed(&self) -> bool {
        self.status == ExportStatus::Error
    }
}

impl JobState for ExportStatusResponse {
    fn export_status(&self) -> ExportStatus {
        self.status
    }
}
