use veritas_core::Bytes32;

use crate::error::ProofError;
use crate::field::FieldElement;
use crate::noir::{NoirProof, VerificationKey};
use crate::public_inputs::{
    PublicInputs, CRITERIA_HASH_INDEX, MERKLE_ROOT_INDEX, MIN_CREDENTIALS_INDEX,
};

/// The values a request commits a proof to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestCommitments {
    pub merkle_root: Bytes32,
    pub min_credentials: u64,
    pub criteria_hash: Bytes32,
}

/// Check that a proof's public inputs echo the request's commitments.
///
/// The merkle root must match exactly, so a request without a root only
/// accepts a zero root.
pub fn check_public_inputs(
    inputs: &PublicInputs,
    expected: &RequestCommitments,
) -> Result<(), ProofError> {
    if inputs.merkle_root() != FieldElement::from(expected.merkle_root) {
        return Err(ProofError::PublicInputMismatch {
            index: MERKLE_ROOT_INDEX,
            name: "merkle_root",
        });
    }
    if inputs.min_credentials() != FieldElement::from_u64(expected.min_credentials) {
        return Err(ProofError::PublicInputMismatch {
            index: MIN_CREDENTIALS_INDEX,
            name: "min_credentials",
        });
    }
    if inputs.criteria_hash() != FieldElement::from(expected.criteria_hash) {
        return Err(ProofError::PublicInputMismatch {
            index: CRITERIA_HASH_INDEX,
            name: "criteria_hash",
        });
    }
    Ok(())
}

/// Decides whether a structurally valid proof is accepted.
///
/// Implementations run after every protocol-level check has passed
/// (shape, echoed commitments, declared hashes). The returned boolean is
/// recorded as the submission outcome.
pub trait ProofVerifier: Send + Sync {
    /// Short name recorded in logs.
    fn name(&self) -> &'static str;

    /// Verify `proof` against `inputs`. `key` is the installed verification
    /// key, if any.
    fn verify(
        &self,
        proof: &NoirProof,
        inputs: &PublicInputs,
        key: Option<&VerificationKey>,
    ) -> bool;
}

/// Non-cryptographic default verifier.
///
/// Performs no pairing check and ignores the verification key. It rejects
/// only degenerate proofs whose `a`, `b` or `c` component is the all-zero
/// identity point; every other well-formed proof is accepted. A deployment
/// that needs soundness must plug in a real verifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralVerifier;

impl ProofVerifier for StructuralVerifier {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn verify(
        &self,
        proof: &NoirProof,
        _inputs: &PublicInputs,
        _key: Option<&VerificationKey>,
    ) -> bool {
        let zero_pair = |p: &[FieldElement; 2]| p.iter().all(FieldElement::is_zero);
        !(zero_pair(&proof.a) || proof.b.iter().all(zero_pair) || zero_pair(&proof.c))
    }
}
