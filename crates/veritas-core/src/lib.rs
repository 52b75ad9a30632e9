//! Veritas Core — Fundamental types, errors, state machines, and the
//! append-only event log shared by the Veritas credential registry and
//! verification protocol.

pub mod config;
pub mod credential_state;
pub mod error;
pub mod events;
pub mod request_state;
pub mod types;
pub mod wire;

pub use config::{ProtocolConfig, ReplayScope};
pub use credential_state::{CredentialEvent, CredentialStateMachine, CredentialStatus};
pub use error::{CoreError, ErrorKind};
pub use events::{EventLog, IndexedEvent, LogEntry, Topic};
pub use request_state::{RequestEvent, RequestState, RequestStateMachine};
pub use types::{Address, Bytes32, CallContext, ProofId, RequestId, Timestamp, TokenId};
pub use wire::EventEnvelope;
