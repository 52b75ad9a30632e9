use serde::{Deserialize, Serialize};

use veritas_core::{Address, Bytes32, ProofId, RequestId, Timestamp};
use veritas_proof::{ProofBundle, RawProof};

/// A proof as submitted against a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofPayload {
    pub request_id: RequestId,
    /// Declared content hash of the proof blob; the replay key.
    pub proof_hash: Bytes32,
    /// Declared content hash of the public inputs.
    pub public_inputs_hash: Bytes32,
    pub proof: RawProof,
    pub public_inputs: Vec<String>,
}

impl ProofPayload {
    /// Package a prover's output for submission against `request_id`.
    pub fn from_bundle(request_id: RequestId, bundle: &ProofBundle) -> Self {
        Self {
            request_id,
            proof_hash: bundle.proof_hash,
            public_inputs_hash: bundle.public_inputs_hash,
            proof: bundle.proof.to_raw(),
            public_inputs: bundle.public_inputs.to_hex_strings(),
        }
    }
}

/// A recorded submission. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofSubmission {
    pub proof_id: ProofId,
    pub request_id: RequestId,
    pub prover: Address,
    pub proof_hash: Bytes32,
    pub public_inputs_hash: Bytes32,
    pub timestamp: Timestamp,
    pub is_verified: bool,
    pub result: String,
}
