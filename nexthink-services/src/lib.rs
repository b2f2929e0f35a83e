// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Nexthink Services
//!
//! Resource services for the Nexthink API and the client that ties them
//! together.
//!
//! - [`NexthinkClient`] - Owns the transport and exposes the services
//! - [`nql::NqlService`] - Query execution, export, polling and download
//!
//! ## Example
//!
//! ```ignore
//! use nexthink_services::{NexthinkClient, nql::ExportRequest};
//! use nexthink_transport::CancellationToken;
//!
//! let client = NexthinkClient::from_env()?;
//! let cancel = CancellationToken::new();
//!
//! let started = client.nql().start_export(&ExportRequest::new("#devices"), &cancel).await?;
//! let status = client
//!     .nql()
//!     .wait_for_export(&started.export_id, Duration::ZERO, Duration::ZERO, &cancel)
//!     .await?;
//! if let Some(url) = status.results_file_url {
//!     let bytes = client.nql().download_export(&url, &cancel).await?;
//! }
//! ```

pub mod client;
pub mod nql;

pub use client::NexthinkClient;
