//! chattyd — Chatty daemon.
//!
//! Serves the Urban Farm Lab question-answering API over HTTP.

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chatty::server::AppState;
use chatty::server::config::{Config, Secrets};

/// Chatty daemon — Urban Farm Lab question answering.
#[derive(Parser)]
#[command(name = "chattyd")]
#[command(version = chatty::PKG_VERSION)]
#[command(about = "Chatty question-answering daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Listen port (overrides config and PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; variables may come from the environment.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    if let Ok(path) = &dotenv {
        info!(path = %path.display(), "loaded environment file");
    }

    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(args.config.as_deref())?;
    config.apply_env()?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    let secrets = Secrets::load_or_default();

    let state = AppState::from_config(&config, secrets.api_key())?;

    let addr = config.server.address();
    info!(
        version = chatty::version_string(),
        %addr,
        upstream = state.upstream_configured(),
        "chattyd starting"
    );

    let listener = TcpListener::bind(&addr).await?;
    chatty::server::serve(listener, Arc::new(state)).await?;

    Ok(())
}
