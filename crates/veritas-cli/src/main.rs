//! Veritas CLI — Command-line interface for the credential ledger.
//!
//! Subcommands: status, issuer, mint, credential, request, prove, proof,
//! admin, events.

mod client;
mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use client::NodeArgs;

/// Veritas — Soulbound credentials and zero-knowledge verification.
#[derive(Parser, Debug)]
#[command(name = "veritas", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    node: NodeArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Query the status of a running node.
    Status,
    /// Manage and inspect the issuer whitelist.
    Issuer(commands::issuer::IssuerArgs),
    /// Mint a soulbound credential.
    Mint(commands::mint::MintArgs),
    /// Inspect, revoke or attempt to move credentials.
    Credential(commands::credential::CredentialArgs),
    /// Create and manage verification requests.
    Request(commands::request::RequestArgs),
    /// Generate a proof for a request and submit it.
    Prove(commands::prove::ProveArgs),
    /// Look up a recorded proof submission.
    Proof(commands::proof::ProofArgs),
    /// Protocol administration.
    Admin(commands::admin::AdminArgs),
    /// Page through the registry or protocol event log.
    Events(commands::events::EventsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let node = client::NodeClient::new(&cli.node);

    match &cli.command {
        Commands::Status => commands::status::run(&node).await,
        Commands::Issuer(args) => commands::issuer::run(&node, args).await,
        Commands::Mint(args) => commands::mint::run(&node, args).await,
        Commands::Credential(args) => commands::credential::run(&node, args).await,
        Commands::Request(args) => commands::request::run(&node, args).await,
        Commands::Prove(args) => commands::prove::run(&node, args).await,
        Commands::Proof(args) => commands::proof::run(&node, args).await,
        Commands::Admin(args) => commands::admin::run(&node, args).await,
        Commands::Events(args) => commands::events::run(&node, args).await,
    }
}
