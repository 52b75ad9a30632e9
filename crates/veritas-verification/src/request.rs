use serde::{Deserialize, Serialize};

use veritas_core::{Address, Bytes32, RequestId, RequestState, Timestamp};
use veritas_proof::RequestCommitments;

/// Parameters for a new verification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProofRequest {
    /// Credential types a prover may present, in order.
    pub required_credentials: Vec<String>,
    pub criteria_hash: Bytes32,
    /// Zero when the request does not commit to a credential set.
    #[serde(default)]
    pub merkle_root: Bytes32,
    pub min_credentials: u64,
    /// Absolute expiry; 0 applies the protocol's default window.
    #[serde(default)]
    pub expiry_time: Timestamp,
}

/// A stored verification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofRequest {
    pub request_id: RequestId,
    pub requester: Address,
    pub required_credentials: Vec<String>,
    pub criteria_hash: Bytes32,
    pub merkle_root: Bytes32,
    pub min_credentials: u64,
    /// Creation time.
    pub timestamp: Timestamp,
    pub expiry_time: Timestamp,
    /// When the request was deactivated, if it was.
    pub deactivated_at: Option<Timestamp>,
}

impl ProofRequest {
    /// Lifecycle state at ledger time `now`. Expiry is inclusive of
    /// `expiry_time` itself.
    pub fn state_at(&self, now: Timestamp) -> RequestState {
        if self.deactivated_at.is_some() {
            RequestState::Deactivated
        } else if now > self.expiry_time {
            RequestState::Expired
        } else {
            RequestState::Active
        }
    }

    pub fn is_active_at(&self, now: Timestamp) -> bool {
        self.state_at(now) == RequestState::Active
    }

    /// Values a proof's public inputs must echo.
    pub fn commitments(&self) -> RequestCommitments {
        RequestCommitments {
            merkle_root: self.merkle_root,
            min_credentials: self.min_credentials,
            criteria_hash: self.criteria_hash,
        }
    }
}

/// A request as read at a particular time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestView {
    #[serde(flatten)]
    pub request: ProofRequest,
    pub state: RequestState,
    pub is_active: bool,
}

impl RequestView {
    pub fn at(request: &ProofRequest, now: Timestamp) -> Self {
        let state = request.state_at(now);
        Self {
            request: request.clone(),
            state,
            is_active: state == RequestState::Active,
        }
    }
}
