//! Backend entry point: configuration, logging, serve.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use wayfare::config::load_config;
use wayfare::{AppConfig, Server};

#[derive(Parser)]
#[command(name = "wayfare")]
#[command(about = "Journey tracking REST backend", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    wayfare::observability::init_logging();
    tracing::info!("wayfare v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.listener.request_timeout_secs,
        notifier_enabled = config.notifier.enabled,
        api_key_set = config.api_key.is_some(),
        "configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let server = Server::new(config);
    server.run(listener).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
