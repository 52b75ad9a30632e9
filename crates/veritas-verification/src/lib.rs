//! Veritas Verification — Proof requests, proof submissions, and the
//! protocol that binds them.

pub mod error;
pub mod events;
pub mod protocol;
pub mod request;
pub mod submission;

pub use error::VerificationError;
pub use events::VerificationEvent;
pub use protocol::{ProtocolState, VerificationProtocol};
pub use request::{NewProofRequest, ProofRequest, RequestView};
pub use submission::{ProofPayload, ProofSubmission};
