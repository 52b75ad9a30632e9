//! `veritas prove` — Generate a proof for a request and submit it.
//!
//! Proof generation runs locally with the reference Noir adapter; only the
//! resulting payload is sent to the node.

use clap::Args;
use serde::Serialize;

use veritas_core::{Address, RequestId};
use veritas_proof::{CredentialClaim, MockNoirProver, ProofAdapter, ProofTarget};
use veritas_verification::{ProofPayload, ProofSubmission, RequestView};

use crate::client::{print_json, CallerArgs, CredentialView, NodeClient};

#[derive(Args, Debug)]
pub struct ProveArgs {
    /// Request to answer.
    pub request_id: RequestId,

    /// Prover address; its credentials are used as the witness.
    #[command(flatten)]
    pub from: CallerArgs,

    /// Print the payload instead of submitting it.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Serialize)]
struct SubmitRequest {
    caller: Address,
    #[serde(flatten)]
    payload: ProofPayload,
}

fn claims(views: &[CredentialView]) -> Vec<CredentialClaim> {
    views
        .iter()
        .map(|v| CredentialClaim {
            token_id: v.credential.token_id,
            credential_type: v.credential.credential_type.clone(),
            metadata_hash: v.credential.metadata_hash,
            is_valid: v.is_valid,
        })
        .collect()
}

fn target(view: &RequestView) -> ProofTarget {
    let r = &view.request;
    ProofTarget {
        request_id: r.request_id,
        required_types: r.required_credentials.clone(),
        min_credentials: r.min_credentials,
        criteria_hash: r.criteria_hash,
        merkle_root: r.merkle_root,
    }
}

pub async fn run(node: &NodeClient, args: &ProveArgs) -> anyhow::Result<()> {
    let prover = args.from.caller;

    let request: RequestView = node.get(&format!("/requests/{}", args.request_id)).await?;
    if !request.is_active {
        anyhow::bail!("request {} is {}", args.request_id, request.state);
    }
    let held: Vec<CredentialView> = node.get(&format!("/users/{}/credentials", prover)).await?;

    let bundle = MockNoirProver::new().generate(&prover, &claims(&held), &target(&request))?;
    tracing::debug!(
        credential_root = %bundle.credential_root,
        credentials = bundle.metadata.credential_count,
        "proof generated"
    );
    let payload = ProofPayload::from_bundle(args.request_id, &bundle);

    if args.dry_run {
        return print_json(&payload);
    }

    let body = SubmitRequest {
        caller: prover,
        payload,
    };
    let submission: ProofSubmission = node.post("/proofs", &body).await?;
    println!(
        "{}",
        if submission.is_verified {
            "Proof accepted!"
        } else {
            "Proof recorded but rejected by the verifier."
        }
    );
    println!("  Proof ID:   {}", submission.proof_id);
    println!("  Proof hash: {}", submission.proof_hash);
    println!("  Result:     {}", submission.result);
    Ok(())
}
