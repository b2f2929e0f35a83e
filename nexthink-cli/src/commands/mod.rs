//! CLI command implementations.

pub mod download;
pub mod execute;
pub mod export;
pub mod status;
pub mod token;
pub mod wait;

use std::time::Duration;

use clap::Args;

/// Polling options shared by `wait` and `export --wait`.
#[derive(Args, Debug, Clone)]
pub struct PollArgs {
    /// Seconds between status checks.
    #[arg(long, default_value = "5")]
    pub interval: u64,

    /// Seconds to wait before giving up.
    #[arg(long, default_value = "600")]
    pub timeout: u64,
}

impl PollArgs {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// An export reached `ERROR`.
#[derive(Debug, thiserror::Error)]
#[error("export {export_id} failed: {reason}")]
pub struct ExportFailed {
    pub export_id: String,
    pub reason: String,
}
