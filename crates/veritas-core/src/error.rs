use serde::{Deserialize, Serialize};
use std::fmt;

use crate::credential_state::CredentialStatus;
use crate::request_state::RequestState;

/// Coarse classification shared by every protocol error.
///
/// Callers branch on the kind rather than on crate-specific variants:
/// an authorization failure means "you may not do this", a state failure
/// means "not now / not again", and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller lacks the role required by the operation.
    Authorization,
    /// The referenced token, request, or submission does not exist.
    NotFound,
    /// Input is malformed or violates a precondition.
    Validation,
    /// The target is in a state that refuses the operation.
    State,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authorization => write!(f, "authorization"),
            Self::NotFound => write!(f, "not_found"),
            Self::Validation => write!(f, "validation"),
            Self::State => write!(f, "state"),
        }
    }
}

/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid credential transition from {from} to {to}")]
    InvalidCredentialTransition {
        from: CredentialStatus,
        to: CredentialStatus,
    },

    #[error("invalid request transition from {from} to {to}")]
    InvalidRequestTransition {
        from: RequestState,
        to: RequestState,
    },

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] prost::EncodeError),

    #[error("deserialization error: {0}")]
    DeserializationError(#[from] prost::DecodeError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("event log gap: expected sequence {expected}, found {found}")]
    EventSequence { expected: u64, found: u64 },
}

impl CoreError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredentialTransition { .. } | Self::InvalidRequestTransition { .. } => {
                ErrorKind::State
            }
            _ => ErrorKind::Validation,
        }
    }
}
