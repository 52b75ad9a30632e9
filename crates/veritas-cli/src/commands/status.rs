//! `veritas status` — Query the status of a running Veritas node.

use serde::Deserialize;

use veritas_core::{Address, ReplayScope};

use crate::client::NodeClient;

#[derive(Deserialize)]
struct StatusResponse {
    version: String,
    uptime_secs: u64,
    name: String,
    symbol: String,
    admin: Address,
    total_supply: u64,
    issuer_count: usize,
    verification_enabled: bool,
    default_expiry_secs: u64,
    replay_scope: ReplayScope,
    request_count: usize,
    submission_count: usize,
    registry_events: usize,
    protocol_events: usize,
}

pub async fn run(node: &NodeClient) -> anyhow::Result<()> {
    let status: StatusResponse = node.get("/status").await?;

    println!("Node Status:");
    println!("  Version:       {}", status.version);
    println!("  Uptime:        {}s", status.uptime_secs);
    println!("  Admin:         {}", status.admin);
    println!();
    println!("Registry: {} ({})", status.name, status.symbol);
    println!("  Credentials:   {}", status.total_supply);
    println!("  Issuers:       {}", status.issuer_count);
    println!("  Events:        {}", status.registry_events);
    println!();
    println!("Verification:");
    println!(
        "  Enabled:       {}",
        if status.verification_enabled { "yes" } else { "no" }
    );
    println!("  Expiry window: {}s", status.default_expiry_secs);
    println!("  Replay scope:  {:?}", status.replay_scope);
    println!("  Requests:      {}", status.request_count);
    println!("  Submissions:   {}", status.submission_count);
    println!("  Events:        {}", status.protocol_events);

    Ok(())
}
