//! `veritas credential` — Inspect, revoke or attempt to move credentials.

use clap::{Args, Subcommand};
use serde::Serialize;

use veritas_core::{Address, TokenId};
use veritas_credentials::verify_metadata_uri;

use crate::client::{print_json, CallerArgs, CredentialView, NodeClient};

#[derive(Args, Debug)]
pub struct CredentialArgs {
    #[command(subcommand)]
    pub action: CredentialAction,
}

#[derive(Subcommand, Debug)]
pub enum CredentialAction {
    /// Show one credential.
    Show { token_id: TokenId },
    /// List every credential held by an address.
    List { owner: Address },
    /// Revoke a credential (administrator only).
    Revoke {
        token_id: TokenId,
        #[arg(short, long, default_value = "")]
        reason: String,
        #[command(flatten)]
        from: CallerArgs,
    },
    /// Attempt a transfer. Always refused: credentials are soulbound.
    Transfer {
        token_id: TokenId,
        #[arg(long)]
        to: Address,
        #[command(flatten)]
        from: CallerArgs,
    },
    /// Attempt an approval. Always refused: credentials are soulbound.
    Approve {
        token_id: TokenId,
        #[arg(long)]
        to: Address,
        #[command(flatten)]
        from: CallerArgs,
    },
    /// Check an inline metadata document against the stored hash.
    VerifyMetadata { token_id: TokenId },
}

#[derive(Serialize)]
struct RevokeRequest<'a> {
    caller: Address,
    reason: &'a str,
}

#[derive(Serialize)]
struct TransferRequest {
    caller: Address,
    from: Address,
    to: Address,
}

#[derive(Serialize)]
struct ApproveRequest {
    caller: Address,
    to: Address,
}

fn print_summary(view: &CredentialView) {
    let c = &view.credential;
    println!(
        "#{:<5} {:<28} {:<8} owner {}  issuer {} ({})",
        c.token_id,
        c.credential_type,
        c.status.to_string(),
        c.owner,
        c.issuer_name,
        c.issuer
    );
}

pub async fn run(node: &NodeClient, args: &CredentialArgs) -> anyhow::Result<()> {
    match &args.action {
        CredentialAction::Show { token_id } => {
            let view: CredentialView = node.get(&format!("/credentials/{}", token_id)).await?;
            print_json(&view.credential)?;
            println!("valid: {}", view.is_valid);
        }
        CredentialAction::List { owner } => {
            let views: Vec<CredentialView> =
                node.get(&format!("/users/{}/credentials", owner)).await?;
            if views.is_empty() {
                println!("{} holds no credentials", owner);
            }
            for view in &views {
                print_summary(view);
            }
        }
        CredentialAction::Revoke {
            token_id,
            reason,
            from,
        } => {
            let body = RevokeRequest {
                caller: from.caller,
                reason,
            };
            let view: CredentialView = node
                .post(&format!("/credentials/{}/revoke", token_id), &body)
                .await?;
            println!("Credential revoked.");
            print_summary(&view);
        }
        CredentialAction::Transfer { token_id, to, from } => {
            let body = TransferRequest {
                caller: from.caller,
                from: from.caller,
                to: *to,
            };
            let _: CredentialView = node
                .post(&format!("/credentials/{}/transfer", token_id), &body)
                .await?;
        }
        CredentialAction::Approve { token_id, to, from } => {
            let body = ApproveRequest {
                caller: from.caller,
                to: *to,
            };
            let _: CredentialView = node
                .post(&format!("/credentials/{}/approve", token_id), &body)
                .await?;
        }
        CredentialAction::VerifyMetadata { token_id } => {
            let view: CredentialView = node.get(&format!("/credentials/{}", token_id)).await?;
            let c = &view.credential;
            let metadata = verify_metadata_uri(&c.metadata_uri, &c.metadata_hash)?;
            println!("Metadata matches hash {}", c.metadata_hash);
            print_json(&metadata)?;
        }
    }
    Ok(())
}
