//! Export command - start an export, optionally wait and download.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use nexthink_core::ExportFormat;
use nexthink_services::NexthinkClient;
use nexthink_services::nql::ExportRequest;
use nexthink_transport::CancellationToken;
use tracing::info;

use super::PollArgs;
use super::wait::wait_until_done;
use crate::output::{JsonFormatter, format_status, write_bytes};
use crate::{Cli, OutputFormat};

/// Arguments for the export command.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Query identifier, e.g. `#active_devices`.
    pub query_id: String,

    /// Platform filter.
    #[arg(long)]
    pub platform: Option<String>,

    /// Results file format: csv or json.
    #[arg(long = "export-format")]
    pub export_format: Option<ExportFormat>,

    /// Wait for the export to finish.
    #[arg(long)]
    pub wait: bool,

    /// Download the results to this file once finished. Implies --wait.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub poll: PollArgs,
}

impl ExportArgs {
    fn request(&self) -> ExportRequest {
        let mut request = ExportRequest::new(&self.query_id);
        if let Some(platform) = &self.platform {
            request = request.with_platform(platform);
        }
        if let Some(format) = self.export_format {
            request = request.with_format(format);
        }
        request
    }
}

/// Runs the export command.
pub async fn run(
    args: &ExportArgs,
    cli: &Cli,
    client: &NexthinkClient,
    cancel: &CancellationToken,
) -> Result<()> {
    let formatter = JsonFormatter::new(cli.pretty);
    let started = client.nql().start_export(&args.request(), cancel).await?;

    if !args.wait && args.output.is_none() {
        match cli.format {
            OutputFormat::Text => println!("{}", started.export_id),
            OutputFormat::Json => println!("{}", formatter.format(&started)?),
        }
        return Ok(());
    }

    let status = wait_until_done(client, &started.export_id, &args.poll, cancel).await?;

    if let Some(path) = &args.output {
        let url = status
            .results_file_url
            .as_deref()
            .context("export completed without a results URL")?;
        let bytes = client.nql().download_export(url, cancel).await?;
        write_bytes(Some(path), &bytes).await?;
        info!(path = %path.display(), bytes = bytes.len(), "Results saved");
    }

    match cli.format {
        OutputFormat::Text => println!("{}", format_status(&started.export_id, &status)),
        OutputFormat::Json => println!("{}", formatter.format(&status)?),
    }

    Ok(())
}
