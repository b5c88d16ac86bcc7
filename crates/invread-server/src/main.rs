//! Upload relay server.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use invread_core::{InvreadConfig, RelayConfig};
use invread_server::{RelayState, router};

/// Relay invoice uploads to the Vision Parser API
#[derive(Parser)]
#[command(name = "invread-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides the config file)
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => InvreadConfig::from_file(path)?.relay,
        None => RelayConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.bind_address = bind;
    }

    let api_key = config.api_key_from_env();
    if api_key.is_none() {
        tracing::warn!(
            env = %config.api_key_env,
            "provider API key not set; uploads without an apiKey field will fail"
        );
    }

    let addr: SocketAddr = config.bind_address.parse()?;
    let state = RelayState::new(config, api_key)?;

    tracing::info!("listening on {addr}");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
