//! Deterministic identifiers for verification requests and proof submissions.
//!
//! Request ids include a protocol-wide nonce that is never reused, so two
//! requests can never share an id. Proof ids include the `(request, proof
//! hash)` pair, which replay protection admits at most once. The domain tags
//! keep the two id spaces disjoint.

use veritas_core::{Address, Bytes32, ProofId, RequestId, Timestamp};

use crate::hashing::hash_parts;

pub const REQUEST_ID_DOMAIN: &str = "veritas.request.v1";
pub const PROOF_ID_DOMAIN: &str = "veritas.proof.v1";

/// `BLAKE3("veritas.request.v1" ‖ requester ‖ nonce ‖ timestamp)`.
pub fn derive_request_id(requester: &Address, nonce: u64, timestamp: Timestamp) -> RequestId {
    hash_parts(
        REQUEST_ID_DOMAIN,
        &[
            requester.as_bytes(),
            &nonce.to_be_bytes(),
            &timestamp.to_be_bytes(),
        ],
    )
}

/// `BLAKE3("veritas.proof.v1" ‖ requestId ‖ prover ‖ proofHash)`.
pub fn derive_proof_id(request_id: &RequestId, prover: &Address, proof_hash: &Bytes32) -> ProofId {
    hash_parts(
        PROOF_ID_DOMAIN,
        &[request_id.as_bytes(), prover.as_bytes(), proof_hash.as_bytes()],
    )
}
