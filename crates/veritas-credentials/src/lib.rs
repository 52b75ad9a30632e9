//! Veritas Credentials — Soulbound credential registry, registry events,
//! and the off-chain metadata convention.

pub mod credential;
pub mod error;
pub mod events;
pub mod metadata;
pub mod registry;

pub use credential::{Credential, NewCredential};
pub use error::CredentialError;
pub use events::RegistryEvent;
pub use metadata::{decode_metadata_uri, verify_metadata_uri, CredentialMetadata, EncodedMetadata};
pub use registry::CredentialRegistry;
