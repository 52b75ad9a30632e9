//! Commands dispatched from the HTTP API to the node event loop.

use serde::Serialize;
use tokio::sync::oneshot;

use veritas_core::{
    Address, Bytes32, ErrorKind, LogEntry, ProofId, ReplayScope, RequestId, TokenId,
};
use veritas_credentials::{Credential, CredentialError, NewCredential, RegistryEvent};
use veritas_proof::RawVerificationKey;
use veritas_verification::{
    NewProofRequest, ProofPayload, ProofSubmission, RequestView, VerificationError,
    VerificationEvent,
};

/// Where a command's result goes.
pub type Reply<T> = oneshot::Sender<Result<T, ApiError>>;

/// A command sent from the HTTP API to the node's main event loop.
pub enum NodeCommand {
    Status {
        reply: Reply<LedgerStatus>,
    },

    // --- Registry ---
    SetIssuerWhitelist {
        caller: Address,
        issuer: Address,
        status: bool,
        reply: Reply<IssuerResponse>,
    },
    IsWhitelisted {
        issuer: Address,
        reply: Reply<IssuerResponse>,
    },
    MintCredential {
        caller: Address,
        params: NewCredential,
        reply: Reply<CredentialView>,
    },
    GetCredential {
        token_id: TokenId,
        reply: Reply<CredentialView>,
    },
    RevokeCredential {
        caller: Address,
        token_id: TokenId,
        reason: String,
        reply: Reply<CredentialView>,
    },
    /// Always rejected; credentials are soulbound.
    TransferCredential {
        caller: Address,
        from: Address,
        to: Address,
        token_id: TokenId,
        reply: Reply<CredentialView>,
    },
    /// Always rejected; credentials are soulbound.
    ApproveCredential {
        caller: Address,
        to: Address,
        token_id: TokenId,
        reply: Reply<CredentialView>,
    },
    UserCredentials {
        user: Address,
        reply: Reply<Vec<CredentialView>>,
    },

    // --- Verification protocol ---
    CreateProofRequest {
        caller: Address,
        params: NewProofRequest,
        reply: Reply<RequestView>,
    },
    GetProofRequest {
        request_id: RequestId,
        reply: Reply<RequestView>,
    },
    DeactivateRequest {
        caller: Address,
        request_id: RequestId,
        reply: Reply<RequestView>,
    },
    RequesterRequests {
        requester: Address,
        reply: Reply<Vec<RequestView>>,
    },
    SubmitProof {
        caller: Address,
        payload: ProofPayload,
        reply: Reply<ProofSubmission>,
    },
    GetProofSubmission {
        proof_id: ProofId,
        reply: Reply<ProofSubmission>,
    },
    RequestSubmissions {
        request_id: RequestId,
        reply: Reply<Vec<ProofSubmission>>,
    },
    SetVerificationEnabled {
        caller: Address,
        enabled: bool,
        reply: Reply<LedgerStatus>,
    },
    SetDefaultExpiry {
        caller: Address,
        seconds: u64,
        reply: Reply<LedgerStatus>,
    },
    SetVerificationKey {
        caller: Address,
        key: RawVerificationKey,
        reply: Reply<KeyResponse>,
    },

    // --- Event feeds ---
    RegistryEvents {
        since: u64,
        limit: usize,
        reply: Reply<Vec<LogEntry<RegistryEvent>>>,
    },
    ProtocolEvents {
        since: u64,
        limit: usize,
        reply: Reply<Vec<LogEntry<VerificationEvent>>>,
    },
}

/// Failure reported back to the API. `kind` is `None` for node-side
/// failures such as storage errors.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub kind: Option<ErrorKind>,
    pub message: String,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: None,
            message: message.into(),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(e: CredentialError) -> Self {
        Self {
            kind: Some(e.kind()),
            message: e.to_string(),
        }
    }
}

impl From<VerificationError> for ApiError {
    fn from(e: VerificationError) -> Self {
        Self {
            kind: Some(e.kind()),
            message: e.to_string(),
        }
    }
}

/// Ledger-wide counters and settings.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerStatus {
    pub name: String,
    pub symbol: String,
    pub admin: Address,
    pub total_supply: u64,
    pub issuer_count: usize,
    pub verification_enabled: bool,
    pub default_expiry_secs: u64,
    pub replay_scope: ReplayScope,
    pub request_count: usize,
    pub submission_count: usize,
    pub registry_events: usize,
    pub protocol_events: usize,
}

/// A credential together with its derived validity.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialView {
    #[serde(flatten)]
    pub credential: Credential,
    pub is_valid: bool,
}

impl From<&Credential> for CredentialView {
    fn from(credential: &Credential) -> Self {
        Self {
            credential: credential.clone(),
            is_valid: credential.is_valid(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuerResponse {
    pub issuer: Address,
    pub whitelisted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyResponse {
    pub key_hash: Bytes32,
}
