//! Domain models for the Nexthink API.
//!
//! ## Submodules
//!
//! - [`region`] - Hosting regions and the URLs derived from them
//! - [`export`] - Export job status and format
//! - [`http_status`] - Status code table used by the error classifier

mod export;
mod http_status;
mod region;

pub use export::{ExportFormat, ExportStatus};
pub use http_status::{ErrorKind, status_code};
pub use region::Region;
