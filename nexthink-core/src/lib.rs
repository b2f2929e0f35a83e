// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Nexthink Core
//!
//! Core types and constant tables shared by the Nexthink API client crates.
//!
//! Everything here is plain data: no I/O, no runtime state. The values that
//! the API defines as fixed string or number sets are modelled as closed
//! enums so the rest of the workspace can match on them exhaustively.
//!
//! ## Key Types
//!
//! - [`Region`] - Hosting region of a Nexthink instance
//! - [`ExportStatus`] - State machine of an asynchronous export job
//! - [`ExportFormat`] - Output format of an export
//! - [`ErrorKind`] - HTTP status table with default error messages

pub mod error;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{ErrorKind, ExportFormat, ExportStatus, Region, status_code};
