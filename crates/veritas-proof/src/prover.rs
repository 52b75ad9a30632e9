use chrono::Utc;
use serde::{Deserialize, Serialize};

use veritas_core::{Address, Bytes32, RequestId, TokenId};
use veritas_crypto::{hash, hash_parts, merkle_root, Hash};

use crate::error::ProofError;
use crate::field::FieldElement;
use crate::noir::NoirProof;
use crate::public_inputs::PublicInputs;

pub const CIRCUIT_NAME: &str = "veritas_credential_proof_v1";
pub const CIRCUIT_VERSION: &str = "1.0.0";

/// Credential-type slots in the circuit witness. Credentials past this
/// still count towards the threshold and the credential root.
pub const MAX_CREDENTIALS: usize = 10;
/// Required-type slots in the circuit witness.
pub const MAX_REQUIRED_TYPES: usize = 5;

const BINDING_DOMAIN: &str = "veritas.binding.v1";
const LEAF_DOMAIN: &str = "veritas.credential-leaf.v1";
const WITNESS_DOMAIN: &str = "veritas.mock-witness.v1";

/// Fixed circuit encodings of the well-known credential types.
const KNOWN_TYPE_ENCODINGS: &[(&str, u64)] = &[
    ("Hackathon Winner", 0x1a2b_3c4d_5e6f_7890),
    ("DeFi Contributor", 0x2b3c_4d5e_6f78_9012),
    ("Smart Contract Auditor", 0x3c4d_5e6f_7890_1234),
    ("Full Stack Developer", 0x4d5e_6f78_9012_3456),
    ("Blockchain Developer", 0x5e6f_7890_1234_5678),
    ("Security Researcher", 0x6f78_9012_3456_7890),
    ("Open Source Contributor", 0x7890_1234_5678_901a),
    ("Technical Writer", 0x8901_2345_6789_01ab),
    ("Community Moderator", 0x9012_3456_7890_1abc),
    ("Bug Bounty Hunter", 0xa123_4567_8901_abcd),
];

/// Circuit encoding of a credential type. Unknown types encode as zero.
pub fn encode_credential_type(credential_type: &str) -> FieldElement {
    KNOWN_TYPE_ENCODINGS
        .iter()
        .find(|(name, _)| *name == credential_type)
        .map(|(_, code)| FieldElement::from_u64(*code))
        .unwrap_or(FieldElement::ZERO)
}

/// A credential the prover holds, as seen by the prover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialClaim {
    pub token_id: TokenId,
    pub credential_type: String,
    pub metadata_hash: Bytes32,
    pub is_valid: bool,
}

impl CredentialClaim {
    /// Merkle leaf committing to this credential.
    pub fn leaf(&self) -> Hash {
        hash_parts(
            LEAF_DOMAIN,
            &[
                &self.token_id.to_be_bytes(),
                self.credential_type.as_bytes(),
                self.metadata_hash.as_bytes(),
            ],
        )
        .0
    }
}

/// The request a proof is generated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofTarget {
    pub request_id: RequestId,
    pub required_types: Vec<String>,
    pub min_credentials: u64,
    pub criteria_hash: Bytes32,
    /// The request's merkle root, echoed verbatim.
    pub merkle_root: Bytes32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofMetadata {
    pub circuit: String,
    pub version: String,
    /// Generation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Number of matching credentials the proof attests to.
    pub credential_count: u64,
}

/// Everything a prover hands back, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBundle {
    pub proof: NoirProof,
    pub public_inputs: PublicInputs,
    pub proof_hash: Bytes32,
    pub public_inputs_hash: Bytes32,
    /// Merkle root over the prover's credential leaves.
    pub credential_root: Bytes32,
    pub metadata: ProofMetadata,
}

/// Turns credential claims into a proof bound to one request.
pub trait ProofAdapter {
    fn generate(
        &self,
        prover: &Address,
        credentials: &[CredentialClaim],
        target: &ProofTarget,
    ) -> Result<ProofBundle, ProofError>;
}

/// Reference adapter that mimics the Noir circuit's input handling.
///
/// It applies the circuit's admission rules and produces proof components
/// derived deterministically from the witness. The output is well formed and
/// correctly bound to the target request, but it is not a zero-knowledge
/// proof of anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockNoirProver;

impl MockNoirProver {
    pub fn new() -> Self {
        Self
    }

    fn component(witness: &Bytes32, label: &str) -> FieldElement {
        FieldElement::from(hash_parts(WITNESS_DOMAIN, &[witness.as_bytes(), label.as_bytes()]))
    }
}

impl ProofAdapter for MockNoirProver {
    fn generate(
        &self,
        prover: &Address,
        credentials: &[CredentialClaim],
        target: &ProofTarget,
    ) -> Result<ProofBundle, ProofError> {
        if credentials.is_empty() {
            return Err(ProofError::NoCredentials);
        }
        if target.required_types.is_empty() {
            return Err(ProofError::NoRequiredTypes);
        }

        let matching = credentials
            .iter()
            .filter(|c| c.is_valid && target.required_types.contains(&c.credential_type))
            .count() as u64;
        if matching < target.min_credentials {
            return Err(ProofError::InsufficientCredentials {
                required: target.min_credentials,
                found: matching,
            });
        }

        let leaves: Vec<Hash> = credentials.iter().map(CredentialClaim::leaf).collect();
        let credential_root = Bytes32(merkle_root(&leaves));

        let binding = hash_parts(
            BINDING_DOMAIN,
            &[
                target.request_id.as_bytes(),
                prover.as_bytes(),
                target.criteria_hash.as_bytes(),
                credential_root.as_bytes(),
                &matching.to_be_bytes(),
            ],
        );

        let public_inputs = PublicInputs::new(vec![
            FieldElement::from(target.merkle_root),
            FieldElement::from_u64(target.min_credentials),
            FieldElement::from(target.criteria_hash),
            FieldElement::from(binding),
        ])?;

        let slots = &credentials[..credentials.len().min(MAX_CREDENTIALS)];
        let required = &target.required_types[..target.required_types.len().min(MAX_REQUIRED_TYPES)];
        let mut type_codes = Vec::with_capacity((slots.len() + required.len()) * 32);
        for fe in slots
            .iter()
            .map(|c| encode_credential_type(&c.credential_type))
            .chain(required.iter().map(|t| encode_credential_type(t)))
        {
            type_codes.extend_from_slice(&fe.to_be_bytes());
        }
        let witness = Bytes32(hash(&[public_inputs.to_bytes(), type_codes].concat()));

        let proof = NoirProof {
            a: [
                Self::component(&witness, "a0"),
                Self::component(&witness, "a1"),
            ],
            b: [
                [
                    Self::component(&witness, "b00"),
                    Self::component(&witness, "b01"),
                ],
                [
                    Self::component(&witness, "b10"),
                    Self::component(&witness, "b11"),
                ],
            ],
            c: [
                Self::component(&witness, "c0"),
                Self::component(&witness, "c1"),
            ],
        };

        tracing::debug!(
            prover = %prover,
            request_id = %target.request_id,
            matching,
            "mock proof generated"
        );

        Ok(ProofBundle {
            proof_hash: proof.content_hash(),
            public_inputs_hash: public_inputs.content_hash(),
            proof,
            public_inputs,
            credential_root,
            metadata: ProofMetadata {
                circuit: CIRCUIT_NAME.to_string(),
                version: CIRCUIT_VERSION.to_string(),
                timestamp: Utc::now().timestamp_millis(),
                credential_count: matching,
            },
        })
    }
}
