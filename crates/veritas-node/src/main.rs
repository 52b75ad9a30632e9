//! Veritas Node — entry point.
//!
//! Runs the credential registry and verification protocol behind an HTTP
//! API, with configuration from a TOML file or defaults.

// Public APIs for node internals — used by tests and external consumers.
#![allow(dead_code)]

mod api;
mod commands;
mod config;
mod ledger;
mod node;
mod state;
mod storage;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::VeritasConfig;
use node::VeritasFullNode;

/// Veritas Node
#[derive(Parser, Debug)]
#[command(name = "veritas-node", version, about = "Veritas credential ledger node")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "veritas.toml")]
    config: PathBuf,

    /// Override the API port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Override the log format (text, json).
    #[arg(long)]
    log_format: Option<String>,

    /// Generate a default config file with a fresh admin address and exit.
    #[arg(long)]
    init: bool,
}

fn init_tracing(config: &VeritasConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.json_logs() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Handle --init flag
    if args.init {
        let config = VeritasConfig::generate();
        config.save(&args.config)?;
        println!(
            "wrote {} (admin {})",
            args.config.display(),
            config.protocol.admin
        );
        return Ok(());
    }

    // Load configuration
    let mut config = VeritasConfig::load(&args.config)?;

    // Apply CLI overrides
    if let Some(api_port) = args.api_port {
        config.api.port = api_port;
    }
    if let Some(ref data_dir) = args.data_dir {
        config.storage.data_dir = data_dir.clone();
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(format) = args.log_format {
        config.logging.format = format;
    }

    init_tracing(&config);
    tracing::info!("Veritas Node v{}", env!("CARGO_PKG_VERSION"));

    let mut node = VeritasFullNode::new(config)?;
    node.start().await?;

    // Set up graceful shutdown on SIGINT
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
        tracing::info!("received shutdown signal");
    };

    tokio::select! {
        result = node.run() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "node event loop error");
            }
        }
        _ = shutdown => {
            tracing::info!("initiating graceful shutdown");
        }
    }

    node.shutdown().await?;
    tracing::info!("Veritas node exited cleanly");
    Ok(())
}
