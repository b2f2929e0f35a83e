//! Token command - verify credentials and show token expiry.

use anyhow::Result;
use clap::Args;
use nexthink_services::NexthinkClient;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the token command.
#[derive(Args, Debug, Default)]
pub struct TokenArgs {
    /// Print the access token itself.
    #[arg(long)]
    pub show: bool,
}

/// Runs the token command.
pub async fn run(args: &TokenArgs, cli: &Cli, client: &NexthinkClient) -> Result<()> {
    let token = client.token_manager().get_token().await?;
    let expires_at = client.token_manager().expires_at().await;

    match cli.format {
        OutputFormat::Text => {
            println!("Authenticated against {}", client.transport().base_url());
            if let Some(at) = expires_at {
                println!("Token expires at {}", at.to_rfc3339());
            }
            if args.show {
                println!("{token}");
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "base_url": client.transport().base_url(),
                "expires_at": expires_at.map(|at| at.to_rfc3339()),
                "access_token": args.show.then_some(token),
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }

    Ok(())
}
