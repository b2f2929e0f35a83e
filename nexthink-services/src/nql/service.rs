//! NQL API operations.

use std::time::Duration;

use async_trait::async_trait;
use nexthink_transport::{
    ApiRequest, CancellationToken, DownloadError, JobPoller, JobStatusSource, PollError,
    ResultDownloader, Transport, TransportError,
};
use tracing::{info, instrument};

use super::models::{
    ExecuteRequest, ExecuteV1Response, ExecuteV2Response, ExportRequest, ExportStatusResponse,
    StartExportResponse,
};
use super::validate::{validate_execute_request, validate_export_id, validate_export_request};

// ============================================================================
// Constants
// ============================================================================

/// Synchronous execution, positional rows.
pub const ENDPOINT_EXECUTE_V1: &str = "/api/v1/nql/execute";

/// Synchronous execution, object rows.
pub const ENDPOINT_EXECUTE_V2: &str = "/api/v2/nql/execute";

/// Start an export.
pub const ENDPOINT_EXPORT: &str = "/api/v1/nql/export";

/// Export status, followed by `/{exportId}`.
pub const ENDPOINT_STATUS: &str = "/api/v1/nql/status";

/// Media types accepted from NQL endpoints.
const ACCEPT: [&str; 2] = ["application/json", "text/csv"];

// ============================================================================
// Service
// ============================================================================

/// NQL query execution and export.
#[derive(Debug, Clone)]
pub struct NqlService {
    transport: Transport,
    downloader: ResultDownloader,
}

impl NqlService {
    /// Creates the service on top of a shared transport.
    pub fn new(transport: Transport, downloader: ResultDownloader) -> Self {
        Self {
            transport,
            downloader,
        }
    }

    /// Runs a query synchronously, returning positional rows.
    #[instrument(skip(self, cancel), fields(query_id = %request.query_id))]
    pub async fn execute_v1(
        &self,
        request: &ExecuteRequest,
        cancel: &CancellationToken,
    ) -> Result<ExecuteV1Response, TransportError> {
        validate_execute_request(request)?;
        let api_request = ApiRequest::post(ENDPOINT_EXECUTE_V1)
            .with_accept(ACCEPT)
            .with_json(request)?;
        self.transport.execute_json(&api_request, cancel).await
    }

    /// Runs a query synchronously, returning rows as objects.
    #[instrument(skip(self, cancel), fields(query_id = %request.query_id))]
    pub async fn execute_v2(
        &self,
        request: &ExecuteRequest,
        cancel: &CancellationToken,
    ) -> Result<ExecuteV2Response, TransportError> {
        validate_execute_request(request)?;
        let api_request = ApiRequest::post(ENDPOINT_EXECUTE_V2)
            .with_accept(ACCEPT)
            .with_json(request)?;
        self.transport.execute_json(&api_request, cancel).await
    }

    /// Starts an asynchronous export.
    #[instrument(skip(self, cancel), fields(query_id = %request.query_id))]
    pub async fn start_export(
        &self,
        request: &ExportRequest,
        cancel: &CancellationToken,
    ) -> Result<StartExportResponse, TransportError> {
        validate_export_request(request)?;
        let api_request = ApiRequest::post(ENDPOINT_EXPORT)
            .with_accept(ACCEPT)
            .with_json(request)?;
        let started: StartExportResponse = self.transport.execute_json(&api_request, cancel).await?;
        info!(export_id = %started.export_id, status = %started.status, "Export started");
        Ok(started)
    }

    /// Fetches the current status of an export.
    pub async fn export_status(
        &self,
        export_id: &str,
        cancel: &CancellationToken,
    ) -> Result<ExportStatusResponse, TransportError> {
        validate_export_id(export_id)?;
        let api_request =
            ApiRequest::get(format!("{ENDPOINT_STATUS}/{export_id}")).with_accept(ACCEPT);
        self.transport.execute_json(&api_request, cancel).await
    }

    /// Polls an export until it completes or fails.
    ///
    /// Zero durations fall back to a 5 second interval and a 10 minute
    /// timeout. A failed export is returned as `Ok` with status `ERROR`.
    pub async fn wait_for_export(
        &self,
        export_id: &str,
        poll_interval: Duration,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<ExportStatusResponse, PollError<ExportStatusResponse>> {
        if export_id.is_empty() {
            return Err(PollError::InvalidJobId);
        }
        validate_export_id(export_id)?;
        JobPoller::new(poll_interval, timeout)
            .wait_for(self, export_id, cancel)
            .await
    }

    /// Downloads a completed export from its pre-signed URL.
    ///
    /// The request carries no API credentials.
    pub async fn download_export(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, DownloadError> {
        self.downloader.download(url, cancel).await
    }
}

#[async_trait]
impl JobStatusSource for NqlService {
    type Status = ExportStatusResponse;

    async fn fetch_status(
        &self,
        job_id: &str,
        cancel: &CancellationToken,
    ) -> Result<ExportStatusResponse, TransportError> {
        self.export_status(job_id, cancel).await
    }
}
