use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use log::{error, info};
use seasonarr::Config;
use tracing_subscriber::EnvFilter;

use crate::app::create_app;

mod app;
mod error;
mod models;
mod routes;
mod state;

#[derive(Parser, Debug)]
#[command(version, about = "Triggers Sonarr episode searches for freshly requested TV shows")]
struct Args {
    #[command(flatten)]
    config: Config,

    #[arg(long, env = "HOST", default_value = "0.0.0.0", help_heading = "Server")]
    host: String,

    #[arg(long, env = "PORT", default_value_t = 5000, help_heading = "Server")]
    port: u16,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let reconciler = match args.config.build_reconciler() {
        Ok(reconciler) => reconciler,
        Err(err) => {
            error!("Invalid Sonarr configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let app = create_app(Arc::new(reconciler));

    let address = format!("{}:{}", args.host, args.port);
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind {}: {}", address, err);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "Listening on {} (Sonarr at {})",
        address, args.config.sonarr.url
    );

    if let Err(err) = axum::serve(listener, app).await {
        error!("Server error: {}", err);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
