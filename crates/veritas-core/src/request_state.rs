use std::fmt;

use crate::error::CoreError;

/// Lifecycle of a verification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum RequestState {
    /// Accepting proof submissions.
    Active,
    /// The expiry time has passed. Final state.
    Expired,
    /// Closed by the requester or the administrator. Final state.
    Deactivated,
}

impl RequestState {
    /// Whether this is a final (terminal) state.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Expired | Self::Deactivated)
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Expired => write!(f, "Expired"),
            Self::Deactivated => write!(f, "Deactivated"),
        }
    }
}

/// Events that move a request out of Active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestEvent {
    /// Ledger time passed the request's expiry.
    Expire,
    /// The requester or administrator closed the request.
    Deactivate,
}

/// Verification request transitions.
///
/// Valid transitions:
/// - Active → Expired (Expire)
/// - Active → Deactivated (Deactivate)
///
/// Nothing ever returns to Active.
pub struct RequestStateMachine;

impl RequestStateMachine {
    /// Attempt a state transition based on an event.
    pub fn transition(current: RequestState, event: RequestEvent) -> Result<RequestState, CoreError> {
        let new_state = match (current, event) {
            (RequestState::Active, RequestEvent::Expire) => RequestState::Expired,
            (RequestState::Active, RequestEvent::Deactivate) => RequestState::Deactivated,
            _ => {
                let target = match event {
                    RequestEvent::Expire => RequestState::Expired,
                    RequestEvent::Deactivate => RequestState::Deactivated,
                };
                return Err(CoreError::InvalidRequestTransition {
                    from: current,
                    to: target,
                });
            }
        };

        tracing::debug!(
            from = %current,
            to = %new_state,
            event = ?event,
            "request state transition"
        );

        Ok(new_state)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: RequestState, event: RequestEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
