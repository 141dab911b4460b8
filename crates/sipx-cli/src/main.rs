use anyhow::Result;
use clap::{Parser, Subcommand};
use sipx_cli::commands::identifiers::{cmd_identifiers, IdentifiersArgs};
use sipx_cli::commands::premis::{self, PremisArgs};
use sipx_cli::commands::verify::{cmd_verify, VerifyArgs};
use sipx_cli::config::Config;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Archival package verification and PREMIS provenance.
#[derive(Parser, Debug)]
#[command(name = "sipx", version)]
struct Cli {
    /// Configuration file (default: ./sipx.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a package's files against its manifest.
    Verify(VerifyArgs),
    /// Write the identifier sidecar for the restructured package.
    Identifiers(IdentifiersArgs),
    /// Read and update PREMIS files.
    Premis(PremisArgs),
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Verify(args) => {
            if cmd_verify(args)? {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(1))
            }
        }
        Commands::Identifiers(args) => {
            cmd_identifiers(args, &config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Premis(args) => {
            premis::run(args, &config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
