//! `veritas request` — Create and manage verification requests.

use clap::{Args, Subcommand};
use serde::Serialize;

use veritas_core::{Address, Bytes32, RequestId, Timestamp};
use veritas_proof::criteria_hash;
use veritas_verification::{NewProofRequest, ProofSubmission, RequestView};

use crate::client::{print_json, CallerArgs, NodeClient};

#[derive(Args, Debug)]
pub struct RequestArgs {
    #[command(subcommand)]
    pub action: RequestAction,
}

#[derive(Subcommand, Debug)]
pub enum RequestAction {
    /// Publish a verification request.
    Create {
        #[command(flatten)]
        from: CallerArgs,
        /// Credential types a prover may present, comma-separated.
        #[arg(short = 't', long = "types", value_delimiter = ',', required = true)]
        required_types: Vec<String>,
        /// Minimum number of matching credentials.
        #[arg(short, long, default_value_t = 1)]
        min: u64,
        /// Credential-set commitment the proof must echo.
        #[arg(long)]
        merkle_root: Option<Bytes32>,
        /// Absolute expiry as seconds since the Unix epoch; defaults to the
        /// node's expiry window.
        #[arg(long)]
        expires_at: Option<Timestamp>,
    },
    /// Show a request and its current state.
    Show { request_id: RequestId },
    /// List requests created by an address.
    List { requester: Address },
    /// Deactivate a request (requester or administrator).
    Deactivate {
        request_id: RequestId,
        #[command(flatten)]
        from: CallerArgs,
    },
    /// List the proofs submitted against a request.
    Submissions { request_id: RequestId },
}

#[derive(Serialize)]
struct CreateRequest {
    caller: Address,
    #[serde(flatten)]
    request: NewProofRequest,
}

#[derive(Serialize)]
struct CallerRequest {
    caller: Address,
}

fn print_summary(view: &RequestView) {
    let r = &view.request;
    println!(
        "{}  {:<11} min {} of [{}]  expires {}",
        r.request_id,
        view.state.to_string(),
        r.min_credentials,
        r.required_credentials.join(", "),
        r.expiry_time
    );
}

pub async fn run(node: &NodeClient, args: &RequestArgs) -> anyhow::Result<()> {
    match &args.action {
        RequestAction::Create {
            from,
            required_types,
            min,
            merkle_root,
            expires_at,
        } => {
            let body = CreateRequest {
                caller: from.caller,
                request: NewProofRequest {
                    required_credentials: required_types.clone(),
                    criteria_hash: criteria_hash(required_types, *min)?,
                    merkle_root: merkle_root.unwrap_or_default(),
                    min_credentials: *min,
                    expiry_time: expires_at.unwrap_or(0),
                },
            };
            let view: RequestView = node.post("/requests", &body).await?;
            println!("Request created!");
            println!("  Request ID: {}", view.request.request_id);
            println!("  Criteria:   {}", view.request.criteria_hash);
            println!("  Expires:    {}", view.request.expiry_time);
        }
        RequestAction::Show { request_id } => {
            let view: RequestView = node.get(&format!("/requests/{}", request_id)).await?;
            print_json(&view)?;
        }
        RequestAction::List { requester } => {
            let views: Vec<RequestView> =
                node.get(&format!("/requesters/{}/requests", requester)).await?;
            if views.is_empty() {
                println!("{} has created no requests", requester);
            }
            for view in &views {
                print_summary(view);
            }
        }
        RequestAction::Deactivate { request_id, from } => {
            let body = CallerRequest {
                caller: from.caller,
            };
            let view: RequestView = node
                .post(&format!("/requests/{}/deactivate", request_id), &body)
                .await?;
            println!("Request deactivated.");
            print_summary(&view);
        }
        RequestAction::Submissions { request_id } => {
            let subs: Vec<ProofSubmission> = node
                .get(&format!("/requests/{}/submissions", request_id))
                .await?;
            if subs.is_empty() {
                println!("no submissions for {}", request_id);
            }
            for sub in &subs {
                println!(
                    "{}  prover {}  {}  at {}",
                    sub.proof_id, sub.prover, sub.result, sub.timestamp
                );
            }
        }
    }
    Ok(())
}
