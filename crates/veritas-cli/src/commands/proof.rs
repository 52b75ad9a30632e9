//! `veritas proof` — Look up a recorded proof submission.

use clap::Args;

use veritas_core::ProofId;
use veritas_verification::ProofSubmission;

use crate::client::{print_json, NodeClient};

#[derive(Args, Debug)]
pub struct ProofArgs {
    /// Proof id returned by `veritas prove`.
    pub proof_id: ProofId,
}

pub async fn run(node: &NodeClient, args: &ProofArgs) -> anyhow::Result<()> {
    let submission: ProofSubmission = node.get(&format!("/proofs/{}", args.proof_id)).await?;
    print_json(&submission)
}
