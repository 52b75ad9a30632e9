//! Integration test: verification requests and proof submissions.
//!
//! Covers the submission checks in the order the protocol applies them,
//! replay protection under both scopes, request lifetime, and the event
//! stream indexers consume.

use std::sync::Arc;

use veritas_core::config::DEFAULT_EXPIRY_SECS;
use veritas_core::{
    Bytes32, ErrorKind, EventEnvelope, ProtocolConfig, ReplayScope, RequestState, Topic,
};
use veritas_proof::{
    NoirProof, ProofError, ProofVerifier, PublicInputs, RawVerificationKey, VerificationKey,
};
use veritas_verification::protocol::{RESULT_REJECTED, RESULT_VERIFIED};
use veritas_verification::{
    NewProofRequest, VerificationError, VerificationEvent, VerificationProtocol,
};

use veritas_integration_tests::*;

/// Verifier that refuses every proof.
struct RejectAll;

impl ProofVerifier for RejectAll {
    fn name(&self) -> &'static str {
        "reject-all"
    }

    fn verify(&self, _: &NoirProof, _: &PublicInputs, _: Option<&VerificationKey>) -> bool {
        false
    }
}

/// Alice holds an auditor credential and verifier_org asks for one.
fn auditor_request(world: &mut World) -> Bytes32 {
    world.mint(alice(), AUDITOR, GENESIS + 10);
    world.request(verifier_org(), &[AUDITOR], 1, GENESIS + 20, GENESIS + 1_000)
}

// =========================================================================
// Request creation
// =========================================================================

#[test]
fn test_request_ids_are_unique_per_requester_nonce() {
    let mut world = World::new();
    let a = world.request(verifier_org(), &[AUDITOR], 1, GENESIS + 20, 0);
    let b = world.request(verifier_org(), &[AUDITOR], 1, GENESIS + 20, 0);
    assert_ne!(a, b);
    assert_eq!(world.protocol.get_requester_requests(&verifier_org()), &[a, b]);
    assert!(world.protocol.get_requester_requests(&alice()).is_empty());
    assert_eq!(world.protocol.request_count(), 2);
}

#[test]
fn test_request_default_expiry() {
    let mut world = World::new();
    let id = world.request(verifier_org(), &[AUDITOR], 1, GENESIS + 20, 0);
    let view = world.protocol.get_proof_request(&id, GENESIS + 20).unwrap();
    assert_eq!(view.request.expiry_time, GENESIS + 20 + 7 * 24 * 60 * 60);
    assert_eq!(view.state, RequestState::Active);
    assert!(view.is_active);

    // A changed window applies to later requests only.
    world
        .protocol
        .set_default_expiry_time(&ctx(admin(), GENESIS + 30), 60)
        .unwrap();
    let later = world.request(verifier_org(), &[AUDITOR], 1, GENESIS + 40, 0);
    assert_eq!(
        world
            .protocol
            .get_proof_request(&later, GENESIS + 40)
            .unwrap()
            .request
            .expiry_time,
        GENESIS + 100
    );
    assert_eq!(
        world
            .protocol
            .get_proof_request(&id, GENESIS + 40)
            .unwrap()
            .request
            .expiry_time,
        GENESIS + 20 + 7 * 24 * 60 * 60
    );
}

#[test]
fn test_request_validation() {
    let mut world = World::new();
    let c = ctx(verifier_org(), GENESIS + 20);
    let base = NewProofRequest {
        required_credentials: vec![AUDITOR.into()],
        criteria_hash: Bytes32([0xcc; 32]),
        merkle_root: Bytes32::ZERO,
        min_credentials: 1,
        expiry_time: 0,
    };

    let mut none = base.clone();
    none.required_credentials.clear();
    assert!(matches!(
        world.protocol.create_proof_request(&c, none).unwrap_err(),
        VerificationError::NoCredentialsSpecified
    ));

    let mut blank = base.clone();
    blank.required_credentials.push(String::new());
    assert!(matches!(
        world.protocol.create_proof_request(&c, blank).unwrap_err(),
        VerificationError::EmptyCredentialType
    ));

    let mut zero_min = base;
    zero_min.min_credentials = 0;
    assert!(matches!(
        world.protocol.create_proof_request(&c, zero_min).unwrap_err(),
        VerificationError::InvalidMinCredentials
    ));

    assert_eq!(world.protocol.request_count(), 0);
    assert!(world.protocol.events().is_empty());
}

// =========================================================================
// Request lifetime
// =========================================================================

#[test]
fn test_expiry_is_inclusive() {
    let mut world = World::new();
    world.mint(alice(), AUDITOR, GENESIS + 10);
    world.mint(bob(), AUDITOR, GENESIS + 11);
    let id = world.request(verifier_org(), &[AUDITOR], 1, GENESIS + 20, GENESIS + 100);

    let on_time = world.payload(&alice(), &id, GENESIS + 100);
    world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 100), on_time)
        .unwrap();

    let late = world.payload(&bob(), &id, GENESIS + 100);
    let err = world
        .protocol
        .submit_noir_zk_proof(&ctx(bob(), GENESIS + 101), late)
        .unwrap_err();
    assert!(matches!(
        err,
        VerificationError::RequestInactiveOrExpired {
            state: RequestState::Expired,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::State);

    let view = world.protocol.get_proof_request(&id, GENESIS + 101).unwrap();
    assert_eq!(view.state, RequestState::Expired);
    assert!(!view.is_active);
}

#[test]
fn test_request_created_already_expired() {
    let mut world = World::new();
    world.mint(alice(), AUDITOR, GENESIS + 10);
    let id = world.request(verifier_org(), &[AUDITOR], 1, GENESIS + 20, GENESIS + 5);

    let view = world.protocol.get_proof_request(&id, GENESIS + 20).unwrap();
    assert_eq!(view.state, RequestState::Expired);

    let payload = world.payload(&alice(), &id, GENESIS + 20);
    let err = world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 20), payload)
        .unwrap_err();
    assert!(matches!(
        err,
        VerificationError::RequestInactiveOrExpired {
            state: RequestState::Expired,
            ..
        }
    ));
    assert_eq!(world.protocol.submission_count(), 0);
    assert!(world.protocol.get_request_submissions(&id).unwrap().is_empty());
}

#[test]
fn test_default_expiry_elapses() {
    let mut world = World::new();
    world.mint(alice(), AUDITOR, GENESIS + 10);
    world.mint(bob(), AUDITOR, GENESIS + 11);
    let id = world.request(verifier_org(), &[AUDITOR], 1, GENESIS + 20, 0);
    let deadline = GENESIS + 20 + DEFAULT_EXPIRY_SECS;

    let last_second = world.payload(&alice(), &id, deadline);
    world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), deadline), last_second)
        .unwrap();

    let late = world.payload(&bob(), &id, deadline + 1);
    let err = world
        .protocol
        .submit_noir_zk_proof(&ctx(bob(), deadline + 1), late)
        .unwrap_err();
    assert!(matches!(
        err,
        VerificationError::RequestInactiveOrExpired {
            state: RequestState::Expired,
            ..
        }
    ));
    assert_eq!(world.protocol.submission_count(), 1);
    assert_eq!(world.protocol.get_request_submissions(&id).unwrap().len(), 1);
}

#[test]
fn test_deactivation() {
    let mut world = World::new();
    let id = auditor_request(&mut world);
    let payload = world.payload(&alice(), &id, GENESIS + 30);

    // Strangers may not close someone else's request.
    let err = world
        .protocol
        .deactivate_request(&ctx(bob(), GENESIS + 25), &id)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);

    world
        .protocol
        .deactivate_request(&ctx(verifier_org(), GENESIS + 25), &id)
        .unwrap();
    assert_eq!(
        world.protocol.get_proof_request(&id, GENESIS + 30).unwrap().state,
        RequestState::Deactivated
    );

    let err = world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 30), payload)
        .unwrap_err();
    assert!(matches!(
        err,
        VerificationError::RequestInactiveOrExpired {
            state: RequestState::Deactivated,
            ..
        }
    ));

    // Closing twice is a state error.
    let err = world
        .protocol
        .deactivate_request(&ctx(admin(), GENESIS + 40), &id)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);
}

#[test]
fn test_admin_can_deactivate_but_not_after_expiry() {
    let mut world = World::new();
    let open = world.request(verifier_org(), &[AUDITOR], 1, GENESIS + 20, GENESIS + 1_000);
    let expiring = world.request(verifier_org(), &[AUDITOR], 1, GENESIS + 20, GENESIS + 50);

    world
        .protocol
        .deactivate_request(&ctx(admin(), GENESIS + 60), &open)
        .unwrap();
    let err = world
        .protocol
        .deactivate_request(&ctx(admin(), GENESIS + 60), &expiring)
        .unwrap_err();
    assert!(matches!(
        err,
        VerificationError::RequestInactiveOrExpired {
            state: RequestState::Expired,
            ..
        }
    ));
}

#[test]
fn test_unknown_request() {
    let mut world = World::new();
    let unknown = Bytes32([0x42; 32]);
    assert_eq!(
        world.protocol.get_proof_request(&unknown, GENESIS).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        world
            .protocol
            .deactivate_request(&ctx(admin(), GENESIS), &unknown)
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );
    assert!(world.protocol.get_request_submissions(&unknown).is_err());
    assert!(world.protocol.get_proof_submission(&unknown).is_err());
}

// =========================================================================
// Submission checks
// =========================================================================

#[test]
fn test_disabled_verification_rejects_everything() {
    let mut world = World::new();
    let id = auditor_request(&mut world);
    let payload = world.payload(&alice(), &id, GENESIS + 30);

    world
        .protocol
        .set_verification_enabled(&ctx(admin(), GENESIS + 25), false)
        .unwrap();
    assert!(!world.protocol.verification_enabled());
    let err = world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 30), payload.clone())
        .unwrap_err();
    assert!(matches!(err, VerificationError::VerificationDisabled));
    assert!(!world.protocol.is_proof_used(&id, &payload.proof_hash));

    world
        .protocol
        .set_verification_enabled(&ctx(admin(), GENESIS + 35), true)
        .unwrap();
    world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 40), payload)
        .unwrap();
}

#[test]
fn test_zero_proof_hash_rejected() {
    let mut world = World::new();
    let id = auditor_request(&mut world);
    let mut payload = world.payload(&alice(), &id, GENESIS + 30);
    payload.proof_hash = Bytes32::ZERO;

    let err = world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 30), payload)
        .unwrap_err();
    assert!(matches!(err, VerificationError::InvalidProofHash));
}

#[test]
fn test_tampered_proof_rejected() {
    let mut world = World::new();
    let id = auditor_request(&mut world);
    let mut payload = world.payload(&alice(), &id, GENESIS + 30);
    payload.proof.a.swap(0, 1);

    let err = world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 30), payload.clone())
        .unwrap_err();
    assert!(matches!(err, VerificationError::HashMismatch("proof")));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(!world.protocol.is_proof_used(&id, &payload.proof_hash));
    assert_eq!(world.protocol.submission_count(), 0);
}

#[test]
fn test_tampered_binding_rejected() {
    let mut world = World::new();
    let id = auditor_request(&mut world);
    let mut payload = world.payload(&alice(), &id, GENESIS + 30);
    payload.public_inputs[3] = "0x01".into();

    let err = world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 30), payload)
        .unwrap_err();
    assert!(matches!(err, VerificationError::HashMismatch("public inputs")));
}

#[test]
fn test_inputs_must_echo_the_request() {
    let mut world = World::new();
    let id = auditor_request(&mut world);
    let mut payload = world.payload(&alice(), &id, GENESIS + 30);
    payload.public_inputs[1] = "0x02".into();

    let err = world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 30), payload)
        .unwrap_err();
    assert!(matches!(
        err,
        VerificationError::Proof(ProofError::PublicInputMismatch {
            index: 1,
            name: "min_credentials"
        })
    ));
}

#[test]
fn test_malformed_payload_rejected() {
    let mut world = World::new();
    let id = auditor_request(&mut world);

    let mut short_inputs = world.payload(&alice(), &id, GENESIS + 30);
    short_inputs.public_inputs.truncate(2);
    let err = world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 30), short_inputs)
        .unwrap_err();
    assert!(matches!(
        err,
        VerificationError::Proof(ProofError::InsufficientPublicInputs { .. })
    ));

    let mut bad_proof = world.payload(&alice(), &id, GENESIS + 30);
    bad_proof.proof.c.pop();
    let err = world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 30), bad_proof)
        .unwrap_err();
    assert!(matches!(
        err,
        VerificationError::Proof(ProofError::MalformedProof(_))
    ));
}

// =========================================================================
// Outcomes and replay protection
// =========================================================================

#[test]
fn test_replay_rejected() {
    let mut world = World::new();
    let id = auditor_request(&mut world);
    let payload = world.payload(&alice(), &id, GENESIS + 30);

    world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 30), payload.clone())
        .unwrap();

    // Anyone replaying the same proof hash is refused.
    let err = world
        .protocol
        .submit_noir_zk_proof(&ctx(bob(), GENESIS + 31), payload)
        .unwrap_err();
    assert!(matches!(err, VerificationError::ProofAlreadyUsed));
    assert_eq!(world.protocol.submission_count(), 1);
}

#[test]
fn test_rejected_proofs_are_recorded_and_consumed() {
    let mut world = World::new();
    world.protocol =
        VerificationProtocol::with_verifier(admin(), &ProtocolConfig::default(), Arc::new(RejectAll));
    let id = auditor_request(&mut world);
    let payload = world.payload(&alice(), &id, GENESIS + 30);

    let proof_id = world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 30), payload.clone())
        .unwrap();
    let sub = world.protocol.get_proof_submission(&proof_id).unwrap();
    assert!(!sub.is_verified);
    assert_eq!(sub.result, RESULT_REJECTED);
    assert!(world.protocol.is_proof_used(&id, &payload.proof_hash));

    let last = world.protocol.events().last().unwrap();
    assert!(matches!(
        &last.event,
        VerificationEvent::ProofVerified { success: false, .. }
    ));

    let err = world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 31), payload)
        .unwrap_err();
    assert!(matches!(err, VerificationError::ProofAlreadyUsed));
}

#[test]
fn test_replay_scope_per_request() {
    let mut world = World::new();
    world.mint(alice(), AUDITOR, GENESIS + 10);
    let first = world.request(verifier_org(), &[AUDITOR], 1, GENESIS + 20, 0);
    let second = world.request(verifier_org(), &[AUDITOR], 1, GENESIS + 21, 0);

    // The same proof presented to a second request with identical criteria.
    let payload = world.payload(&alice(), &first, GENESIS + 30);
    let mut reused = payload.clone();
    reused.request_id = second;

    world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 30), payload)
        .unwrap();
    let proof_id = world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 31), reused)
        .unwrap();
    assert_eq!(
        world.protocol.get_proof_submission(&proof_id).unwrap().result,
        RESULT_VERIFIED
    );
}

#[test]
fn test_replay_scope_global() {
    let config = ProtocolConfig {
        replay_scope: ReplayScope::Global,
        ..ProtocolConfig::default()
    };
    let mut world = World::with_config(&config);
    assert_eq!(world.protocol.replay_scope(), ReplayScope::Global);
    world.mint(alice(), AUDITOR, GENESIS + 10);
    let first = world.request(verifier_org(), &[AUDITOR], 1, GENESIS + 20, 0);
    let second = world.request(verifier_org(), &[AUDITOR], 1, GENESIS + 21, 0);

    let payload = world.payload(&alice(), &first, GENESIS + 30);
    let mut reused = payload.clone();
    reused.request_id = second;

    world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 30), payload.clone())
        .unwrap();
    let err = world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 31), reused)
        .unwrap_err();
    assert!(matches!(err, VerificationError::ProofAlreadyUsed));
    assert!(world.protocol.is_proof_used(&second, &payload.proof_hash));
}

// =========================================================================
// Administration
// =========================================================================

#[test]
fn test_admin_operations_require_owner() {
    let mut world = World::new();
    let c = ctx(alice(), GENESIS + 10);
    assert!(world.protocol.set_verification_enabled(&c, false).is_err());
    assert!(world.protocol.set_default_expiry_time(&c, 60).is_err());
    assert!(world.protocol.transfer_ownership(&c, alice()).is_err());
    assert!(world.protocol.verification_enabled());

    let err = world
        .protocol
        .set_default_expiry_time(&ctx(admin(), GENESIS + 10), 0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(world.protocol.default_expiry_secs(), 7 * 24 * 60 * 60);

    world
        .protocol
        .transfer_ownership(&ctx(admin(), GENESIS + 20), bob())
        .unwrap();
    assert_eq!(world.protocol.owner(), bob());
    assert!(world
        .protocol
        .set_verification_enabled(&ctx(admin(), GENESIS + 30), false)
        .is_err());
}

#[test]
fn test_verification_key_install() {
    let mut world = World::new();
    let pair = || vec!["0x01".to_string(), "0x02".to_string()];
    let key = RawVerificationKey {
        alpha: pair(),
        beta: vec![pair(), pair()],
        gamma: vec![pair(), pair()],
        delta: vec![pair(), pair()],
        ic: vec![pair(); 5],
    };

    assert!(world
        .protocol
        .set_verification_key(&ctx(alice(), GENESIS + 10), &key)
        .is_err());
    let key_hash = world
        .protocol
        .set_verification_key(&ctx(admin(), GENESIS + 10), &key)
        .unwrap();
    assert!(!key_hash.is_zero());
    assert_eq!(
        world.protocol.verification_key().unwrap().content_hash(),
        key_hash
    );
}

// =========================================================================
// Event stream
// =========================================================================

#[test]
fn test_event_stream_for_a_request() {
    let mut world = World::new();
    let id = auditor_request(&mut world);
    let payload = world.payload(&alice(), &id, GENESIS + 30);
    let proof_id = world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 30), payload)
        .unwrap();
    world
        .protocol
        .deactivate_request(&ctx(verifier_org(), GENESIS + 40), &id)
        .unwrap();

    let kinds: Vec<_> = world
        .protocol
        .events()
        .by_topic(&Topic::Id(id))
        .iter()
        .map(|e| match &e.event {
            VerificationEvent::ProofRequestCreated { .. } => "created",
            VerificationEvent::ProofVerified { .. } => "verified",
            VerificationEvent::ProofRequestDeactivated { .. } => "deactivated",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["created", "verified", "deactivated"]);

    let subs = world.protocol.get_request_submissions(&id).unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].proof_id, proof_id);
}

#[test]
fn test_events_cross_the_wire() {
    let mut world = World::new();
    let id = auditor_request(&mut world);
    let payload = world.payload(&alice(), &id, GENESIS + 30);
    world
        .protocol
        .submit_noir_zk_proof(&ctx(alice(), GENESIS + 30), payload)
        .unwrap();

    for entry in world.protocol.events().entries() {
        let envelope = EventEnvelope::wrap("protocol", entry).unwrap();
        let decoded = EventEnvelope::from_bytes(&envelope.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, envelope);
        assert!(decoded.topics.contains(&id.to_hex()));

        let back = decoded.unwrap_entry::<VerificationEvent>().unwrap();
        assert_eq!(&back, entry);
    }

    let issued = world.registry.events().entries().last().unwrap();
    let envelope = EventEnvelope::wrap("registry", issued).unwrap();
    assert_eq!(envelope.kind, "CredentialIssued");
    assert!(envelope.topics.contains(&"1".to_string()));
    assert!(envelope.topics.contains(&alice().to_hex()));
}
