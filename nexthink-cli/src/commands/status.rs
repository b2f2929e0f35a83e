//! Status command - show the current state of an export.

use anyhow::Result;
use clap::Args;
use nexthink_services::NexthinkClient;
use nexthink_transport::CancellationToken;

use crate::output::{JsonFormatter, format_status};
use crate::{Cli, OutputFormat};

/// Arguments for the status command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Export identifier returned by `export`.
    pub export_id: String,
}

/// Runs the status command.
pub async fn run(
    args: &StatusArgs,
    cli: &Cli,
    client: &NexthinkClient,
    cancel: &CancellationToken,
) -> Result<()> {
    let status = client.nql().export_status(&args.export_id, cancel).await?;

    match cli.format {
        OutputFormat::Text => println!("{}", format_status(&args.export_id, &status)),
        OutputFormat::Json => println!("{}", JsonFormatter::new(cli.pretty).format(&status)?),
    }

    Ok(())
}
