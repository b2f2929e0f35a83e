// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Nexthink Transport
//!
//! Authenticated HTTP transport for the Nexthink API.
//!
//! ## Authentication
//!
//! The [`auth`] module implements the OAuth2 client-credentials flow:
//!
//! - [`auth::Credential`] - Client id, secret, instance and region
//! - [`auth::TokenStore`] - Single-slot token cache behind an async mutex
//! - [`auth::TokenManager`] - Reuses, refreshes and invalidates tokens
//!
//! ## Request Pipeline
//!
//! - [`Transport`] - Injects the bearer token, retries, classifies errors
//! - [`ApiRequest`] / [`ApiResponse`] - What goes in and comes out
//! - [`RetryStrategy`] - Bounded linear or exponential backoff
//!
//! ## Jobs
//!
//! - [`JobPoller`] - Fixed-interval status loop with a deadline
//! - [`ResultDownloader`] - Unauthenticated download of result files
//!
//! ## Example
//!
//! ```ignore
//! use nexthink_core::Region;
//! use nexthink_transport::{ApiRequest, ClientConfig, Credential, Transport};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = ClientConfig::new(Credential::new("id", "secret", "acme", Region::Eu));
//! let transport = Transport::new(&config)?;
//!
//! let response = transport
//!     .execute(&ApiRequest::get("/api/v1/nql/status/abc"), &CancellationToken::new())
//!     .await?;
//! ```

pub mod auth;
pub mod classify;
pub mod config;
pub mod download;
pub mod error;
pub mod poller;
pub mod request;
pub mod response;
pub mod retry;
pub mod transport;

// Errors
pub use error::{ApiError, AuthError, DownloadError, PollError, TransportError};

// Authentication
pub use auth::{Credential, Token, TokenManager, TokenStore};

// Pipeline
pub use classify::classify_error;
pub use config::{ClientConfig, TlsConfig, TlsVersion};
pub use request::ApiRequest;
pub use response::{ApiResponse, RateLimit};
pub use retry::RetryStrategy;
pub use transport::Transport;

// Jobs
pub use download::ResultDownloader;
pub use poller::{JobPoller, JobState, JobStatusSource};

// Re-exported so callers do not need a direct dependency.
pub use tokio_util::sync::CancellationToken;
