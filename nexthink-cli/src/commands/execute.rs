//! Execute command - run an NQL query synchronously.

use anyhow::Result;
use clap::Args;
use nexthink_services::NexthinkClient;
use nexthink_services::nql::ExecuteRequest;
use nexthink_transport::CancellationToken;
use tracing::info;

use crate::output::{JsonFormatter, format_rows};
use crate::{Cli, OutputFormat};

/// Arguments for the execute command.
#[derive(Args, Debug)]
pub struct ExecuteArgs {
    /// Query identifier, e.g. `#active_devices`.
    pub query_id: String,

    /// Platform filter.
    #[arg(long)]
    pub platform: Option<String>,

    /// Use the V2 endpoint (rows as objects).
    #[arg(long)]
    pub v2: bool,
}

impl ExecuteArgs {
    fn request(&self) -> ExecuteRequest {
        let request = ExecuteRequest::new(&self.query_id);
        match &self.platform {
            Some(platform) => request.with_platform(platform),
            None => request,
        }
    }
}

/// Runs the execute command.
pub async fn run(
    args: &ExecuteArgs,
    cli: &Cli,
    client: &NexthinkClient,
    cancel: &CancellationToken,
) -> Result<()> {
    let request = args.request();
    let formatter = JsonFormatter::new(cli.pretty);

    if args.v2 {
        let response = client.nql().execute_v2(&request, cancel).await?;
        info!(rows = response.rows, "Query executed");
        match cli.format {
            OutputFormat::Text => {
                for row in &response.data {
                    println!("{}", formatter.format(row)?);
                }
            }
            OutputFormat::Json => println!("{}", formatter.format(&response)?),
        }
    } else {
        let response = client.nql().execute_v1(&request, cancel).await?;
        info!(rows = response.rows, "Query executed");
        match cli.format {
            OutputFormat::Text => println!("{}", format_rows(&response)),
            OutputFormat::Json => println!("{}", formatter.format(&response)?),
        }
    }

    Ok(())
}
