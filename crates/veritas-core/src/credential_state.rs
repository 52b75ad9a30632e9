use std::fmt;

use crate::error::CoreError;

/// Validity of a soulbound credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CredentialStatus {
    /// Minted and usable as proof input.
    Valid,
    /// Permanently revoked by the registry administrator. Final state.
    Revoked,
}

impl CredentialStatus {
    /// Whether this is a final (terminal) state.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Revoked)
    }

    /// Whether the credential may back a proof.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "Valid"),
            Self::Revoked => write!(f, "Revoked"),
        }
    }
}

/// Events that trigger credential status transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialEvent {
    /// The administrator revokes the credential.
    Revoke,
}

/// Credential validity transitions.
///
/// Valid transitions:
/// - Valid → Revoked (Revoke)
///
/// There is no path back to Valid.
pub struct CredentialStateMachine;

impl CredentialStateMachine {
    /// Attempt a transition. Returns the new status, or an error for
    /// transitions out of a final state.
    pub fn transition(
        current: CredentialStatus,
        event: CredentialEvent,
    ) -> Result<CredentialStatus, CoreError> {
        let new_state = match (current, event) {
            (CredentialStatus::Valid, CredentialEvent::Revoke) => CredentialStatus::Revoked,
            (CredentialStatus::Revoked, CredentialEvent::Revoke) => {
                return Err(CoreError::InvalidCredentialTransition {
                    from: current,
                    to: CredentialStatus::Revoked,
                });
            }
        };

        tracing::debug!(
            from = %current,
            to = %new_state,
            event = ?event,
            "credential status transition"
        );

        Ok(new_state)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: CredentialStatus, event: CredentialEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
