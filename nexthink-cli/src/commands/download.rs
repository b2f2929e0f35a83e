//! Download command - fetch an export results file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use nexthink_services::NexthinkClient;
use nexthink_transport::CancellationToken;
use tracing::info;

use crate::output::write_bytes;

/// Arguments for the download command.
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Pre-signed results URL.
    pub url: String,

    /// Write to this file instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Runs the download command.
pub async fn run(
    args: &DownloadArgs,
    client: &NexthinkClient,
    cancel: &CancellationToken,
) -> Result<()> {
    let bytes = client.nql().download_export(&args.url, cancel).await?;
    info!(bytes = bytes.len(), "Downloaded results");
    write_bytes(args.output.as_deref(), &bytes).await
}
