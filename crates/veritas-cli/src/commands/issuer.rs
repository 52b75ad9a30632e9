//! `veritas issuer` — Manage and inspect the issuer whitelist.

use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};

use veritas_core::Address;

use crate::client::{CallerArgs, NodeClient};

#[derive(Args, Debug)]
pub struct IssuerArgs {
    #[command(subcommand)]
    pub action: IssuerAction,
}

#[derive(Subcommand, Debug)]
pub enum IssuerAction {
    /// Whitelist an issuer (administrator only).
    Add {
        issuer: Address,
        #[command(flatten)]
        from: CallerArgs,
    },
    /// Remove an issuer from the whitelist (administrator only).
    Remove {
        issuer: Address,
        #[command(flatten)]
        from: CallerArgs,
    },
    /// Show whether an address is whitelisted.
    Show { issuer: Address },
}

#[derive(Serialize)]
struct SetIssuerRequest {
    caller: Address,
    issuer: Address,
    status: bool,
}

#[derive(Deserialize)]
struct IssuerResponse {
    issuer: Address,
    whitelisted: bool,
}

pub async fn run(node: &NodeClient, args: &IssuerArgs) -> anyhow::Result<()> {
    let resp: IssuerResponse = match &args.action {
        IssuerAction::Add { issuer, from } | IssuerAction::Remove { issuer, from } => {
            let body = SetIssuerRequest {
                caller: from.caller,
                issuer: *issuer,
                status: matches!(args.action, IssuerAction::Add { .. }),
            };
            node.post("/issuers", &body).await?
        }
        IssuerAction::Show { issuer } => node.get(&format!("/issuers/{}", issuer)).await?,
    };

    println!(
        "{} is {}",
        resp.issuer,
        if resp.whitelisted {
            "a whitelisted issuer"
        } else {
            "not whitelisted"
        }
    );
    Ok(())
}
