use veritas_core::{Address, CoreError, ErrorKind, ProofId, RequestId, RequestState};
use veritas_proof::ProofError;

/// Verification protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("caller {0} is not the protocol administrator")]
    NotAdmin(Address),

    #[error("caller {caller} may not manage request {request_id}")]
    NotRequester {
        caller: Address,
        request_id: RequestId,
    },

    #[error("no credentials specified")]
    NoCredentialsSpecified,

    #[error("required credential types must not be empty")]
    EmptyCredentialType,

    #[error("minimum credential count must be at least 1")]
    InvalidMinCredentials,

    #[error("invalid expiry window: {0}")]
    InvalidExpiryWindow(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid proof hash")]
    InvalidProofHash,

    #[error("proof already used")]
    ProofAlreadyUsed,

    #[error("request not found: {0}")]
    RequestNotFound(RequestId),

    #[error("proof submission not found: {0}")]
    SubmissionNotFound(ProofId),

    #[error("request {request_id} is {state}")]
    RequestInactiveOrExpired {
        request_id: RequestId,
        state: RequestState,
    },

    #[error("verification is disabled")]
    VerificationDisabled,

    #[error("declared {0} hash does not match the submitted data")]
    HashMismatch(&'static str),

    #[error("proof error: {0}")]
    Proof(#[from] ProofError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

impl VerificationError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAdmin(_) | Self::NotRequester { .. } => ErrorKind::Authorization,
            Self::RequestNotFound(_) | Self::SubmissionNotFound(_) => ErrorKind::NotFound,
            Self::ProofAlreadyUsed
            | Self::RequestInactiveOrExpired { .. }
            | Self::VerificationDisabled => ErrorKind::State,
            Self::Proof(e) => e.kind(),
            Self::Core(e) => e.kind(),
            Self::NoCredentialsSpecified
            | Self::EmptyCredentialType
            | Self::InvalidMinCredentials
            | Self::InvalidExpiryWindow(_)
            | Self::InvalidAddress(_)
            | Self::InvalidProofHash
            | Self::HashMismatch(_) => ErrorKind::Validation,
        }
    }
}
