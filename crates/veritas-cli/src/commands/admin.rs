//! `veritas admin` — Protocol administration.

use clap::{Args, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use veritas_core::{Address, Bytes32};
use veritas_proof::RawVerificationKey;

use crate::client::{CallerArgs, NodeClient};

#[derive(Args, Debug)]
pub struct AdminArgs {
    #[command(flatten)]
    pub from: CallerArgs,

    #[command(subcommand)]
    pub action: AdminAction,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

#[derive(Subcommand, Debug)]
pub enum AdminAction {
    /// Turn proof submissions on or off.
    Verification { switch: Switch },
    /// Set the expiry window for requests created without one.
    DefaultExpiry { seconds: u64 },
    /// Install a verification key from a JSON file.
    VerificationKey { path: PathBuf },
}

#[derive(Serialize)]
struct SetEnabledRequest {
    caller: Address,
    enabled: bool,
}

#[derive(Serialize)]
struct SetExpiryRequest {
    caller: Address,
    seconds: u64,
}

#[derive(Serialize)]
struct SetKeyRequest {
    caller: Address,
    key: RawVerificationKey,
}

#[derive(Deserialize)]
struct LedgerStatus {
    verification_enabled: bool,
    default_expiry_secs: u64,
}

#[derive(Deserialize)]
struct KeyResponse {
    key_hash: Bytes32,
}

pub async fn run(node: &NodeClient, args: &AdminArgs) -> anyhow::Result<()> {
    let caller = args.from.caller;
    match &args.action {
        AdminAction::Verification { switch } => {
            let body = SetEnabledRequest {
                caller,
                enabled: matches!(switch, Switch::On),
            };
            let status: LedgerStatus = node.post("/admin/verification", &body).await?;
            println!(
                "Verification {}",
                if status.verification_enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
        }
        AdminAction::DefaultExpiry { seconds } => {
            let body = SetExpiryRequest {
                caller,
                seconds: *seconds,
            };
            let status: LedgerStatus = node.post("/admin/default-expiry", &body).await?;
            println!("Default expiry set to {}s", status.default_expiry_secs);
        }
        AdminAction::VerificationKey { path } => {
            let contents = std::fs::read_to_string(path)?;
            let key: RawVerificationKey = serde_json::from_str(&contents)
                .map_err(|e| anyhow::anyhow!("invalid verification key file: {}", e))?;
            let resp: KeyResponse = node
                .post("/admin/verification-key", &SetKeyRequest { caller, key })
                .await?;
            println!("Verification key installed: {}", resp.key_hash);
        }
    }
    Ok(())
}
