//! Wait command - poll an export until it finishes.

use anyhow::Result;
use clap::Args;
use nexthink_services::NexthinkClient;
use nexthink_services::nql::ExportStatusResponse;
use nexthink_transport::CancellationToken;

use super::{ExportFailed, PollArgs};
use crate::output::{JsonFormatter, format_status};
use crate::{Cli, OutputFormat};

/// Arguments for the wait command.
#[derive(Args, Debug)]
pub struct WaitArgs {
    /// Export identifier returned by `export`.
    pub export_id: String,

    #[command(flatten)]
    pub poll: PollArgs,
}

/// Runs the wait command.
pub async fn run(
    args: &WaitArgs,
    cli: &Cli,
    client: &NexthinkClient,
    cancel: &CancellationToken,
) -> Result<()> {
    let status = wait_until_done(client, &args.export_id, &args.poll, cancel).await?;

    match cli.format {
        OutputFormat::Text => println!("{}", format_status(&args.export_id, &status)),
        OutputFormat::Json => println!("{}", JsonFormatter::new(cli.pretty).format(&status)?),
    }

    Ok(())
}

/// Polls until the export completes. `ERROR` becomes [`ExportFailed`].
pub async fn wait_until_done(
    client: &NexthinkClient,
    export_id: &str,
    poll: &PollArgs,
    cancel: &CancellationToken,
) -> Result<ExportStatusResponse> {
    let status = client
        .nql()
        .wait_for_export(export_id, poll.interval(), poll.timeout(), cancel)
        .await?;

    if status.is_failed() {
        return Err(ExportFailed {
            export_id: export_id.to_string(),
            reason: status
                .error_description
                .unwrap_or_else(|| "no error description".to_string()),
        }
        .into());
    }
    Ok(status)
}
