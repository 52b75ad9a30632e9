//! Integration test: credential lifecycle from issuance to verified proof.
//!
//! Exercises veritas-credentials, veritas-proof and veritas-verification
//! together: an issuer mints, a holder proves, a verifier reads the outcome
//! from the protocol's event log.

use veritas_core::{CredentialStatus, ErrorKind, RequestState, Topic};
use veritas_credentials::{verify_metadata_uri, RegistryEvent};
use veritas_proof::ProofError;
use veritas_verification::{VerificationEvent, VerificationProtocol};

use veritas_integration_tests::*;

// =========================================================================
// Issuance and metadata
// =========================================================================

#[test]
fn test_mint_and_read_back() {
    let mut world = World::new();
    let id = world.mint(alice(), AUDITOR, GENESIS + 10);

    assert_eq!(id, 1);
    let c = world.registry.get_credential(id).unwrap();
    assert_eq!(c.owner, alice());
    assert_eq!(c.issuer, issuer());
    assert_eq!(c.timestamp, GENESIS + 10);
    assert_eq!(c.status, CredentialStatus::Valid);
    assert_eq!(world.registry.get_user_credentials(&alice()), &[1]);
    assert_eq!(world.registry.token_uri(id).unwrap(), c.metadata_uri);
}

#[test]
fn test_inline_metadata_matches_hash() {
    let mut world = World::new();
    let id = world.mint(alice(), DEFI_EXPERT, GENESIS + 10);
    let c = world.registry.get_credential(id).unwrap();

    let metadata = verify_metadata_uri(&c.metadata_uri, &c.metadata_hash).unwrap();
    assert_eq!(metadata.issuer, issuer());
    assert_eq!(metadata.description, "DeFi Expert credential");
    assert_eq!(metadata.additional_data["cohort"], 2024);
    assert_eq!(
        metadata.issued_at().unwrap().timestamp(),
        (GENESIS + 10) as i64
    );

    // Any other hash fails.
    let other = veritas_crypto::content_hash(b"something else");
    assert!(verify_metadata_uri(&c.metadata_uri, &other).is_err());
}

#[test]
fn test_issuance_event_is_indexed() {
    let mut world = World::new();
    let id = world.mint(alice(), AUDITOR, GENESIS + 10);

    let by_owner = world.registry.events().by_topic(&Topic::Address(alice()));
    assert_eq!(by_owner.len(), 1);
    match &by_owner[0].event {
        RegistryEvent::CredentialIssued {
            token_id,
            credential_type,
            issuer: by,
            ..
        } => {
            assert_eq!(*token_id, id);
            assert_eq!(credential_type, AUDITOR);
            assert_eq!(*by, issuer());
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(world.registry.events().by_topic(&Topic::Token(id)).len(), 1);
}

// =========================================================================
// Holder proves, verifier reads the outcome
// =========================================================================

#[test]
fn test_end_to_end_verified_proof() {
    let mut world = World::new();
    world.mint(alice(), AUDITOR, GENESIS + 10);
    world.mint(alice(), HACKATHON_WINNER, GENESIS + 11);

    let request_id = world.request(verifier_org(), &[AUDITOR, DEFI_EXPERT], 1, GENESIS + 20, 0);
    let payload = world.payload(&alice(), &request_id, GENESIS + 30);

    let proof_id = world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 30), payload.clone())
        .unwrap();

    let sub = world.protocol.get_proof_submission(&proof_id).unwrap();
    assert!(sub.is_verified);
    assert_eq!(sub.prover, alice());
    assert_eq!(sub.proof_hash, payload.proof_hash);
    assert_eq!(sub.result, "Proof verified successfully");
    assert!(world.protocol.is_proof_used(&request_id, &payload.proof_hash));

    // The verifier learns the outcome from the request's event stream.
    let events = world.protocol.events().by_topic(&Topic::Id(request_id));
    let verified = events
        .iter()
        .find_map(|e| match &e.event {
            VerificationEvent::ProofVerified {
                success, prover, ..
            } => Some((*success, *prover)),
            _ => None,
        })
        .unwrap();
    assert_eq!(verified, (true, alice()));
}

#[test]
fn test_revoked_credential_cannot_back_a_proof() {
    let mut world = World::new();
    let id = world.mint(alice(), AUDITOR, GENESIS + 10);
    world
        .registry
        .revoke_credential(&ctx(admin(), GENESIS + 15), id, "license lapsed")
        .unwrap();
    assert!(!world.registry.is_credential_valid(id).unwrap());

    let request_id = world.request(verifier_org(), &[AUDITOR], 1, GENESIS + 20, 0);
    let err = world.prove(&alice(), &request_id, GENESIS + 30).unwrap_err();
    assert!(matches!(
        err,
        ProofError::InsufficientCredentials {
            required: 1,
            found: 0
        }
    ));
}

#[test]
fn test_holder_without_matching_types_cannot_prove() {
    let mut world = World::new();
    world.mint(bob(), HACKATHON_WINNER, GENESIS + 10);

    let request_id = world.request(verifier_org(), &[AUDITOR, DEFI_EXPERT], 1, GENESIS + 20, 0);
    assert!(world.prove(&bob(), &request_id, GENESIS + 30).is_err());
}

#[test]
fn test_proof_for_one_holder_recorded_per_prover() {
    let mut world = World::new();
    world.mint(alice(), AUDITOR, GENESIS + 10);
    world.mint(bob(), AUDITOR, GENESIS + 11);

    let request_id = world.request(verifier_org(), &[AUDITOR], 1, GENESIS + 20, 0);
    let pa = world.payload(&alice(), &request_id, GENESIS + 30);
    let pb = world.payload(&bob(), &request_id, GENESIS + 30);
    assert_ne!(pa.proof_hash, pb.proof_hash);

    let a = world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 30), pa)
        .unwrap();
    let b = world
        .protocol
        .submit_noir_zk_proof(&ctx(bob(), GENESIS + 31), pb)
        .unwrap();
    assert_ne!(a, b);

    let subs = world.protocol.get_request_submissions(&request_id).unwrap();
    assert_eq!(subs.len(), 2);
    assert_eq!(subs[0].prover, alice());
    assert_eq!(subs[1].prover, bob());
}

// =========================================================================
// Persistence boundary
// =========================================================================

#[test]
fn test_state_survives_serialization() {
    let mut world = World::new();
    world.mint(alice(), AUDITOR, GENESIS + 10);
    let request_id = world.request(verifier_org(), &[AUDITOR], 1, GENESIS + 20, 0);
    let payload = world.payload(&alice(), &request_id, GENESIS + 30);
    world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 30), payload.clone())
        .unwrap();

    let registry_json = serde_json::to_string(&world.registry).unwrap();
    let state_json = serde_json::to_string(world.protocol.state()).unwrap();

    let registry: veritas_credentials::CredentialRegistry =
        serde_json::from_str(&registry_json).unwrap();
    let mut protocol = VerificationProtocol::from_state(
        serde_json::from_str(&state_json).unwrap(),
        std::sync::Arc::new(veritas_proof::StructuralVerifier),
    );

    assert_eq!(registry.total_supply(), 1);
    assert_eq!(
        protocol
            .get_proof_request(&request_id, GENESIS + 30)
            .unwrap()
            .state,
        RequestState::Active
    );

    // The replay set came back with the rest of the state.
    let err = protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 40), payload)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);

    // And the request counter: a new request gets a fresh id.
    let next = protocol
        .create_proof_request(
            &ctx(verifier_org(), GENESIS + 20),
            veritas_verification::NewProofRequest {
                required_credentials: vec![AUDITOR.into()],
                criteria_hash: veritas_crypto::content_hash(b"c"),
                merkle_root: Default::default(),
                min_credentials: 1,
                expiry_time: 0,
            },
        )
        .unwrap();
    assert_ne!(next, request_id);
}
