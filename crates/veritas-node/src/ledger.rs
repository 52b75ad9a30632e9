//! The node's single-writer ledger: one credential registry and one
//! verification protocol, snapshotted together.
//!
//! Snapshots carry state only. The event logs live in the node's events
//! column family and are attached after a snapshot is loaded.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use veritas_core::{Address, CallContext, EventLog, ProtocolConfig, Timestamp};
use veritas_credentials::{CredentialError, CredentialRegistry, RegistryEvent};
use veritas_proof::StructuralVerifier;
use veritas_verification::{ProtocolState, VerificationEvent, VerificationProtocol};

/// Names of the two event streams, as stored and served.
pub const REGISTRY_STREAM: &str = "registry";
pub const PROTOCOL_STREAM: &str = "protocol";

/// Serialized form of a [`Ledger`].
#[derive(Debug, Deserialize)]
struct LedgerSnapshot {
    registry: CredentialRegistry,
    protocol: ProtocolState,
}

#[derive(Serialize)]
struct LedgerSnapshotRef<'a> {
    registry: &'a CredentialRegistry,
    protocol: &'a ProtocolState,
}

#[derive(Debug)]
pub struct Ledger {
    pub registry: CredentialRegistry,
    pub protocol: VerificationProtocol,
}

impl Ledger {
    /// Build a fresh ledger administered by `admin`, with `issuers`
    /// whitelisted at time `timestamp`.
    pub fn genesis(
        admin: Address,
        issuers: &[Address],
        config: &ProtocolConfig,
        timestamp: Timestamp,
    ) -> Result<Self, CredentialError> {
        if admin.is_zero() {
            return Err(CredentialError::InvalidAddress(
                "genesis admin is the zero address".into(),
            ));
        }

        let mut registry = CredentialRegistry::with_config(admin, config);
        let ctx = CallContext::new(admin, timestamp);
        for issuer in issuers {
            registry.set_issuer_whitelist(&ctx, *issuer, true)?;
        }

        tracing::info!(admin = %admin, issuers = issuers.len(), "ledger genesis");
        Ok(Self {
            registry,
            protocol: VerificationProtocol::new(admin, config),
        })
    }

    /// Resume from a snapshot written by [`Ledger::to_json`]. Submissions
    /// are checked with the [`StructuralVerifier`].
    pub fn from_json(data: &[u8]) -> serde_json::Result<Self> {
        let snapshot: LedgerSnapshot = serde_json::from_slice(data)?;
        Ok(Self {
            registry: snapshot.registry,
            protocol: VerificationProtocol::from_state(
                snapshot.protocol,
                Arc::new(StructuralVerifier),
            ),
        })
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&LedgerSnapshotRef {
            registry: &self.registry,
            protocol: self.protocol.state(),
        })
    }

    pub fn attach_events(
        &mut self,
        registry: EventLog<RegistryEvent>,
        protocol: EventLog<VerificationEvent>,
    ) {
        self.registry.replace_events(registry);
        self.protocol.replace_events(protocol);
    }

    /// Return to the state in `snapshot`, keeping only the first
    /// `registry_len` and `protocol_len` events. On error the ledger is
    /// left as it was.
    pub fn rewind(
        &mut self,
        snapshot: &[u8],
        registry_len: usize,
        protocol_len: usize,
    ) -> serde_json::Result<()> {
        let mut restored = Self::from_json(snapshot)?;
        let mut registry = self.registry.replace_events(EventLog::new());
        let mut protocol = self.protocol.replace_events(EventLog::new());
        registry.truncate(registry_len);
        protocol.truncate(protocol_len);
        restored.attach_events(registry, protocol);
        *self = restored;
        Ok(())
    }
}
