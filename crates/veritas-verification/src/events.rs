use serde::{Deserialize, Serialize};

use veritas_core::{Address, Bytes32, IndexedEvent, ProofId, RequestId, Timestamp, Topic};

/// Events published by the verification protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum VerificationEvent {
    ProofRequestCreated {
        request_id: RequestId,
        requester: Address,
        required_credentials: Vec<String>,
        criteria_hash: Bytes32,
        timestamp: Timestamp,
        expiry_time: Timestamp,
    },
    ProofRequestDeactivated {
        request_id: RequestId,
        by: Address,
    },
    /// The outcome of a submission. Verifiers learn results from this event.
    ProofVerified {
        proof_id: ProofId,
        request_id: RequestId,
        prover: Address,
        proof_hash: Bytes32,
        timestamp: Timestamp,
        success: bool,
        result: String,
    },
    VerificationToggled {
        enabled: bool,
    },
    DefaultExpiryUpdated {
        seconds: u64,
    },
    VerificationKeyUpdated {
        key_hash: Bytes32,
    },
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
}

impl IndexedEvent for VerificationEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::ProofRequestCreated { .. } => "ProofRequestCreated",
            Self::ProofRequestDeactivated { .. } => "ProofRequestDeactivated",
            Self::ProofVerified { .. } => "ProofVerified",
            Self::VerificationToggled { .. } => "VerificationToggled",
            Self::DefaultExpiryUpdated { .. } => "DefaultExpiryUpdated",
            Self::VerificationKeyUpdated { .. } => "VerificationKeyUpdated",
            Self::OwnershipTransferred { .. } => "OwnershipTransferred",
        }
    }

    fn topics(&self) -> Vec<Topic> {
        match self {
            Self::ProofRequestCreated {
                request_id,
                requester,
                ..
            } => vec![Topic::Id(*request_id), Topic::Address(*requester)],
            Self::ProofRequestDeactivated { request_id, by } => {
                vec![Topic::Id(*request_id), Topic::Address(*by)]
            }
            Self::ProofVerified {
                proof_id,
                request_id,
                prover,
                ..
            } => vec![
                Topic::Id(*proof_id),
                Topic::Id(*request_id),
                Topic::Address(*prover),
            ],
            Self::VerificationKeyUpdated { key_hash } => vec![Topic::Id(*key_hash)],
            Self::OwnershipTransferred {
                previous_owner,
                new_owner,
            } => vec![Topic::Address(*previous_owner), Topic::Address(*new_owner)],
            Self::VerificationToggled { .. } | Self::DefaultExpiryUpdated { .. } => Vec::new(),
        }
    }
}
