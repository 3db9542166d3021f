use clap::{Parser, Subcommand};
use colored::Colorize;
use seasonarr::Config;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    inspect::{InspectArgs, cmd_inspect},
    reconcile::{ReconcileArgs, cmd_reconcile},
};

mod commands;

#[derive(Parser)]
#[command(version, about = "Inspect and reconcile Sonarr series by TVDB id")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the air state of every season of a series
    Inspect(InspectArgs),
    /// Run the reconciliation for a series once
    Reconcile(ReconcileArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let result = match &cli.command {
        Commands::Inspect(args) => cmd_inspect(&cli.config, args).await,
        Commands::Reconcile(args) => cmd_reconcile(&cli.config, args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
