//! Parley relay server binary

use anyhow::Result;
use clap::Parser;
use parley_api::ApiServer;
use parley_core::config::Config;
use parley_core::logging::init_logging_with_config;
use parley_core::metrics::init_metrics;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "parley-api")]
#[command(author, version, about = "Parley one-to-one messaging relay", long_about = None)]
struct Args {
    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    /// Command-line flags win over file and environment
    fn apply(&self, config: &mut Config) -> Result<()> {
        if self.host.is_some() || self.port.is_some() {
            let ip: IpAddr = match &self.host {
                Some(host) => host.parse()?,
                None => config.server.bind_address.ip(),
            };
            let port = self.port.unwrap_or(config.server.bind_address.port());
            config.server.bind_address = SocketAddr::new(ip, port);
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.json_logs {
            config.logging.json_format = true;
        }
        config.validate()?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    args.apply(&mut config)?;

    init_logging_with_config(config.logging.to_log_config()?)?;
    init_metrics();

    let server = ApiServer::new(&config);
    let shutdown = server.shutdown_coordinator();
    let mut server_task = tokio::spawn(server.run());

    tokio::select! {
        result = &mut server_task => {
            return match result {
                Ok(result) => result,
                Err(e) => Err(e.into()),
            };
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
        }
    }

    shutdown.shutdown().await;
    match tokio::time::timeout(shutdown.timeout(), server_task).await {
        Ok(Ok(result)) => result?,
        Ok(Err(e)) => error!("Server task failed: {}", e),
        Err(_) => warn!(timeout = ?shutdown.timeout(), "Server did not drain in time"),
    }
    shutdown.complete().await;

    Ok(())
}
