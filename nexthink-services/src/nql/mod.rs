//! NQL (Nexthink Query Language) service.
//!
//! Queries are defined in the Nexthink admin and referenced by `#id`. They
//! can be run synchronously, or exported asynchronously:
//!
//! 1. [`NqlService::start_export`] returns an export id
//! 2. [`NqlService::wait_for_export`] polls until `COMPLETED` or `ERROR`
//! 3. [`NqlService::download_export`] fetches the results file

mod models;
mod service;
mod validate;

pub use models::{
    ExecuteRequest, ExecuteV1Response, ExecuteV2Response, ExecutionDateTime, ExportRequest,
    ExportStatusResponse, StartExportResponse,
};
pub use service::{
    ENDPOINT_EXECUTE_V1, ENDPOINT_EXECUTE_V2, ENDPOINT_EXPORT, ENDPOINT_STATUS, NqlService,
};
pub use validate::{
    MAX_EXPORT_ID_LENGTH, MAX_PLATFORM_LENGTH, MAX_QUERY_ID_LENGTH, validate_execute_request,
    validate_export_id, validate_export_request,
};
