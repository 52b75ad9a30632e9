//! Shared fixtures for the Veritas integration tests.
//!
//! A [`World`] is one registry and one verification protocol under the same
//! administrator, with a single whitelisted issuer, driven at explicit
//! ledger times.

use chrono::{TimeZone, Utc};

use veritas_core::{Address, CallContext, ProtocolConfig, RequestId, Timestamp, TokenId};
use veritas_credentials::{Credential, CredentialMetadata, CredentialRegistry, NewCredential};
use veritas_proof::{
    criteria_hash, CredentialClaim, MockNoirProver, ProofAdapter, ProofBundle, ProofTarget,
};
use veritas_verification::{NewProofRequest, ProofPayload, VerificationProtocol};

/// Ledger time the fixtures start at.
pub const GENESIS: Timestamp = 1_700_000_000;

pub const AUDITOR: &str = "Smart Contract Auditor";
pub const DEFI_EXPERT: &str = "DeFi Expert";
pub const HACKATHON_WINNER: &str = "Hackathon Winner";

pub fn admin() -> Address {
    Address::from_low_u64(0xad)
}
pub fn issuer() -> Address {
    Address::from_low_u64(0x15)
}
pub fn alice() -> Address {
    Address::from_low_u64(0xa1)
}
pub fn bob() -> Address {
    Address::from_low_u64(0xb0)
}
pub fn verifier_org() -> Address {
    Address::from_low_u64(0x0e)
}

pub fn ctx(caller: Address, timestamp: Timestamp) -> CallContext {
    CallContext::new(caller, timestamp)
}

pub struct World {
    pub registry: CredentialRegistry,
    pub protocol: VerificationProtocol,
}

impl World {
    pub fn new() -> Self {
        Self::with_config(&ProtocolConfig::default())
    }

    pub fn with_config(config: &ProtocolConfig) -> Self {
        let mut registry = CredentialRegistry::with_config(admin(), config);
        registry
            .set_issuer_whitelist(&ctx(admin(), GENESIS), issuer(), true)
            .expect("whitelist issuer");
        Self {
            registry,
            protocol: VerificationProtocol::new(admin(), config),
        }
    }

    /// Mint a credential of `credential_type` to `recipient` with an inline
    /// metadata document.
    pub fn mint(&mut self, recipient: Address, credential_type: &str, at: Timestamp) -> TokenId {
        let issued_at = Utc
            .timestamp_opt(at as i64, 0)
            .single()
            .expect("valid timestamp");
        let encoded = CredentialMetadata::new(
            format!("{} credential", credential_type),
            Some(serde_json::json!({ "cohort": 2024 })),
            issuer(),
            issued_at,
        )
        .encode()
        .expect("encode metadata");

        self.registry
            .mint_credential(
                &ctx(issuer(), at),
                NewCredential {
                    recipient,
                    credential_type: credential_type.to_string(),
                    issuer_name: "Veritas Academy".into(),
                    metadata_hash: encoded.hash,
                    metadata_uri: encoded.uri,
                },
            )
            .expect("mint")
    }

    /// Publish a request from `requester` for `min` of `types`.
    pub fn request(
        &mut self,
        requester: Address,
        types: &[&str],
        min: u64,
        at: Timestamp,
        expiry_time: Timestamp,
    ) -> RequestId {
        let required: Vec<String> = types.iter().map(|t| t.to_string()).collect();
        let criteria = criteria_hash(&required, min).expect("criteria hash");
        self.protocol
            .create_proof_request(
                &ctx(requester, at),
                NewProofRequest {
                    required_credentials: required,
                    criteria_hash: criteria,
                    merkle_root: Default::default(),
                    min_credentials: min,
                    expiry_time,
                },
            )
            .expect("create request")
    }

    /// The registry's view of a holder's credentials, as a prover sees them.
    pub fn claims(&self, holder: &Address) -> Vec<CredentialClaim> {
        self.registry
            .get_user_credentials(holder)
            .iter()
            .filter_map(|id| self.registry.get_credential(*id).ok())
            .map(claim)
            .collect()
    }

    /// Generate a proof for `prover` against `request_id` at time `at`.
    pub fn prove(
        &self,
        prover: &Address,
        request_id: &RequestId,
        at: Timestamp,
    ) -> Result<ProofBundle, veritas_proof::ProofError> {
        let view = self
            .protocol
            .get_proof_request(request_id, at)
            .expect("request exists");
        let r = view.request;
        let target = ProofTarget {
            request_id: r.request_id,
            required_types: r.required_credentials,
            min_credentials: r.min_credentials,
            criteria_hash: r.criteria_hash,
            merkle_root: r.merkle_root,
        };
        MockNoirProver::new().generate(prover, &self.claims(prover), &target)
    }

    /// A ready-to-submit payload for `prover` against `request_id`.
    pub fn payload(&self, prover: &Address, request_id: &RequestId, at: Timestamp) -> ProofPayload {
        let bundle = self.prove(prover, request_id, at).expect("prove");
        ProofPayload::from_bundle(*request_id, &bundle)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

pub fn claim(credential: &Credential) -> CredentialClaim {
    CredentialClaim {
        token_id: credential.token_id,
        credential_type: credential.credential_type.clone(),
        metadata_hash: credential.metadata_hash,
        is_valid: credential.is_valid(),
    }
}
