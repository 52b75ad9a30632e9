//! Veritas Proof — The boundary between the verification protocol and
//! zero-knowledge provers.
//!
//! Provides:
//! - Field elements and the Noir-style proof blob (a/b/c components)
//! - The public-input vector and its echo check against a request
//! - The pluggable [`ProofVerifier`] capability and its non-cryptographic
//!   [`StructuralVerifier`] default
//! - The [`ProofAdapter`] prover interface with a reference [`MockNoirProver`]

pub mod criteria;
pub mod error;
pub mod field;
pub mod noir;
pub mod prover;
pub mod public_inputs;
pub mod verifier;

pub use criteria::criteria_hash;
pub use error::ProofError;
pub use field::FieldElement;
pub use noir::{NoirProof, RawProof, RawVerificationKey, VerificationKey};
pub use prover::{
    CredentialClaim, MockNoirProver, ProofAdapter, ProofBundle, ProofMetadata, ProofTarget,
};
pub use public_inputs::PublicInputs;
pub use verifier::{check_public_inputs, ProofVerifier, RequestCommitments, StructuralVerifier};
