// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Nexthink CLI - run NQL queries and exports from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Check credentials
//! nexthink token
//!
//! # Run a query
//! nexthink execute '#active_devices' --platform windows
//!
//! # Export, wait and save the results
//! nexthink export '#active_devices' --output devices.csv
//!
//! # Step by step
//! nexthink export '#active_devices'
//! nexthink wait <export-id> --timeout 900
//! nexthink download <url> -o devices.csv
//! ```

mod commands;
mod output;
mod settings;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use nexthink_services::NexthinkClient;
use nexthink_services::nql::ExportStatusResponse;
use nexthink_transport::{CancellationToken, ClientConfig, DownloadError, PollError, TransportError};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{ExportFailed, download, execute, export, status, token, wait};
use settings::Profile;

// ============================================================================
// CLI Definition
// ============================================================================

/// Nexthink CLI - NQL queries and exports.
#[derive(Parser, Debug)]
#[command(name = "nexthink")]
#[command(about = "Nexthink API command-line client")]
#[command(long_about = r#"
Runs NQL queries and exports against a Nexthink instance.

Credentials come from the profile file and the environment:
  NEXTHINK_CLIENT_ID, NEXTHINK_CLIENT_SECRET,
  NEXTHINK_INSTANCE, NEXTHINK_REGION (us, eu, pac, meta),
  NEXTHINK_BASE_URL (optional)

Environment variables override the profile.
"#)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Profile file. Defaults to <config dir>/nexthink/config.json.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log request and response bodies (implies --verbose).
    #[arg(long, global = true)]
    pub debug: bool,

    /// Quiet mode (no logs, errors only as exit codes).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Obtain a token and show when it expires.
    Token(token::TokenArgs),

    /// Run an NQL query synchronously.
    #[command(visible_alias = "x")]
    Execute(execute::ExecuteArgs),

    /// Start an NQL export.
    #[command(visible_alias = "e")]
    Export(export::ExportArgs),

    /// Show the status of an export.
    #[command(visible_alias = "s")]
    Status(status::StatusArgs),

    /// Wait for an export to finish.
    #[command(visible_alias = "w")]
    Wait(wait::WaitArgs),

    /// Download an export results file.
    #[command(visible_alias = "d")]
    Download(download::DownloadArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// General error.
    Error = 1,
    /// Missing or invalid configuration.
    Config = 2,
    /// The export finished with status `ERROR`.
    ExportFailed = 3,
    /// Timed out waiting for an export.
    Timeout = 4,
    /// Interrupted.
    Cancelled = 130,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    fn for_error(error: &anyhow::Error) -> Self {
        if let Some(poll) = error.downcast_ref::<PollError<ExportStatusResponse>>() {
            return match poll {
                PollError::Timeout { .. } => Self::Timeout,
                PollError::Cancelled => Self::Cancelled,
                PollError::Transport(e) => Self::for_transport(e),
                PollError::InvalidJobId => Self::Error,
            };
        }
        if let Some(transport) = error.downcast_ref::<TransportError>() {
            return Self::for_transport(transport);
        }
        if let Some(DownloadError::Cancelled) = error.downcast_ref::<DownloadError>() {
            return Self::Cancelled;
        }
        if error.downcast_ref::<ExportFailed>().is_some() {
            return Self::ExportFailed;
        }
        Self::Error
    }

    fn for_transport(error: &TransportError) -> Self {
        match error {
            TransportError::Cancelled => Self::Cancelled,
            TransportError::Config(_) => Self::Config,
            _ => Self::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("nexthink=debug,info")
        } else {
            EnvFilter::new("nexthink=warn")
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose || cli.debug, cli.quiet);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    if let Err(e) = run(&cli, &cancel).await {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let path = cli.config.clone().unwrap_or_else(Profile::default_path);
    let config = Profile::load_from(&path)?
        .overlay_env(|key| std::env::var(key).ok())?
        .into_config()?
        .with_debug(cli.debug);
    Ok(config)
}

async fn run(cli: &Cli, cancel: &CancellationToken) -> Result<()> {
    let config = load_config(cli).map_err(|e| TransportError::Config(format!("{e:#}")))?;
    let client = NexthinkClient::new(&config)?;

    match &cli.command {
        Commands::Token(args) => token::run(args, cli, &client).await,
        Commands::Execute(args) => execute::run(args, cli, &client, cancel).await,
        Commands::Export(args) => export::run(args, cli, &client, cancel).await,
        Commands::Status(args) => status::run(args, cli, &client, cancel).await,
        Commands::Wait(args) => wait::run(args, cli, &client, cancel).await,
        Commands::Download(args) => download::run(args, &client, cancel).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::time::Duration;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_export() {
        let cli = Cli::parse_from([
            "nexthink",
            "export",
            "#devices",
            "--export-format",
            "json",
            "--timeout",
            "30",
            "-f",
            "json",
        ]);
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.query_id, "#devices");
                assert_eq!(args.export_format, Some(nexthink_core::ExportFormat::Json));
                assert_eq!(args.poll.timeout(), Duration::from_secs(30));
                assert_eq!(args.poll.interval(), Duration::from_secs(5));
                assert!(!args.wait);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_exit_codes() {
        let timeout: PollError<ExportStatusResponse> = PollError::Timeout {
            last: None,
            waited: Duration::from_secs(1),
        };
        assert_eq!(ExitCode::for_error(&timeout.into()), ExitCode::Timeout);

        let cancelled: PollError<ExportStatusResponse> =
            PollError::Transport(TransportError::Cancelled);
        assert_eq!(ExitCode::for_error(&cancelled.into()), ExitCode::Cancelled);

        let config = TransportError::Config("bad".into());
        assert_eq!(ExitCode::for_error(&config.into()), ExitCode::Config);

        let failed = ExportFailed {
            export_id: "e1".into(),
            reason: "boom".into(),
        };
        assert_eq!(ExitCode::for_error(&failed.into()), ExitCode::ExportFailed);

        assert_eq!(
            ExitCode::for_error(&anyhow::anyhow!("other")),
            ExitCode::Error
        );
    }
}
