//! Integration test: soulbound guarantees of the credential registry.

use veritas_core::{Address, Bytes32, CredentialStatus, ErrorKind, Topic};
use veritas_credentials::{CredentialError, CredentialRegistry, NewCredential, RegistryEvent};

use veritas_integration_tests::*;

fn new_credential(recipient: Address, credential_type: &str) -> NewCredential {
    NewCredential {
        recipient,
        credential_type: credential_type.to_string(),
        issuer_name: "Veritas Academy".into(),
        metadata_hash: Bytes32([0x11; 32]),
        metadata_uri: "ipfs://credential".into(),
    }
}

// =========================================================================
// Non-transferability
// =========================================================================

#[test]
fn test_transfers_always_fail() {
    let mut world = World::new();
    let id = world.mint(alice(), AUDITOR, GENESIS + 10);
    let events_before = world.registry.events().len();

    // Even the owner moving their own token is refused.
    let err = world
        .registry
        .transfer_from(&ctx(alice(), GENESIS + 20), alice(), bob(), id)
        .unwrap_err();
    assert!(matches!(err, CredentialError::SoulboundTransfer));
    assert_eq!(err.kind(), ErrorKind::Authorization);

    assert!(world
        .registry
        .safe_transfer_from(&ctx(admin(), GENESIS + 20), alice(), bob(), id)
        .is_err());

    // A token that does not exist is refused the same way.
    assert!(world
        .registry
        .transfer_from(&ctx(alice(), GENESIS + 20), alice(), bob(), 999)
        .is_err());

    assert_eq!(world.registry.owner_of(id).unwrap(), alice());
    assert_eq!(world.registry.balance_of(&bob()), 0);
    assert_eq!(world.registry.events().len(), events_before);
}

#[test]
fn test_approvals_always_fail() {
    let mut world = World::new();
    let id = world.mint(alice(), AUDITOR, GENESIS + 10);

    let err = world
        .registry
        .approve(&ctx(alice(), GENESIS + 20), bob(), id)
        .unwrap_err();
    assert!(matches!(err, CredentialError::SoulboundApproval));
    assert!(world
        .registry
        .set_approval_for_all(&ctx(alice(), GENESIS + 20), bob(), true)
        .is_err());

    assert_eq!(world.registry.get_approved(id).unwrap(), None);
    assert!(!world.registry.is_approved_for_all(&alice(), &bob()));
}

// =========================================================================
// Issuer whitelist
// =========================================================================

#[test]
fn test_only_whitelisted_issuers_mint() {
    let mut world = World::new();
    let stranger = Address::from_low_u64(0x5e);

    let err = world
        .registry
        .mint_credential(&ctx(stranger, GENESIS + 10), new_credential(alice(), AUDITOR))
        .unwrap_err();
    assert!(matches!(err, CredentialError::NotWhitelistedIssuer(a) if a == stranger));
    assert_eq!(world.registry.total_supply(), 0);

    world
        .registry
        .set_issuer_whitelist(&ctx(admin(), GENESIS + 20), stranger, true)
        .unwrap();
    let id = world
        .registry
        .mint_credential(&ctx(stranger, GENESIS + 30), new_credential(alice(), AUDITOR))
        .unwrap();
    assert_eq!(world.registry.get_credential(id).unwrap().issuer, stranger);

    // Delisting stops further minting but leaves issued tokens alone.
    world
        .registry
        .set_issuer_whitelist(&ctx(admin(), GENESIS + 40), stranger, false)
        .unwrap();
    assert!(world
        .registry
        .mint_credential(&ctx(stranger, GENESIS + 50), new_credential(bob(), AUDITOR))
        .is_err());
    assert!(world.registry.is_credential_valid(id).unwrap());
}

#[test]
fn test_whitelist_is_admin_only() {
    let mut world = World::new();
    let err = world
        .registry
        .set_issuer_whitelist(&ctx(issuer(), GENESIS + 10), bob(), true)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert!(!world.registry.is_whitelisted(&bob()));

    let err = world
        .registry
        .set_issuer_whitelist(&ctx(admin(), GENESIS + 10), Address::ZERO, true)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let changes = world
        .registry
        .events()
        .entries()
        .iter()
        .filter(|e| matches!(e.event, RegistryEvent::IssuerWhitelisted { .. }))
        .count();
    assert_eq!(changes, 1);
}

#[test]
fn test_mint_validation() {
    let mut world = World::new();
    let c = ctx(issuer(), GENESIS + 10);

    let err = world
        .registry
        .mint_credential(&c, new_credential(Address::ZERO, AUDITOR))
        .unwrap_err();
    assert!(matches!(err, CredentialError::InvalidRecipient));

    let mut zero_hash = new_credential(alice(), AUDITOR);
    zero_hash.metadata_hash = Bytes32::ZERO;
    let err = world.registry.mint_credential(&c, zero_hash).unwrap_err();
    assert!(matches!(err, CredentialError::InvalidMetadataHash));

    let err = world
        .registry
        .mint_credential(&c, new_credential(alice(), "   "))
        .unwrap_err();
    assert!(matches!(err, CredentialError::EmptyCredentialType));

    // Failed mints consume no token ids.
    assert_eq!(world.registry.mint_credential(&c, new_credential(alice(), AUDITOR)).unwrap(), 1);
}

// =========================================================================
// Token ids, holdings and counts
// =========================================================================

#[test]
fn test_token_ids_are_sequential_from_one() {
    let mut world = World::new();
    let ids: Vec<_> = [alice(), bob(), alice()]
        .into_iter()
        .enumerate()
        .map(|(i, to)| world.mint(to, AUDITOR, GENESIS + 10 + i as u64))
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(world.registry.total_supply(), 3);
    assert_eq!(world.registry.get_user_credentials(&alice()), &[1, 3]);
    assert_eq!(world.registry.get_user_credentials(&bob()), &[2]);
    assert!(world.registry.get_user_credentials(&verifier_org()).is_empty());
    assert!(world.registry.get_credential(4).is_err());
}

#[test]
fn test_type_counts() {
    let mut world = World::new();
    world.mint(alice(), AUDITOR, GENESIS + 10);
    world.mint(bob(), AUDITOR, GENESIS + 11);
    world.mint(bob(), DEFI_EXPERT, GENESIS + 12);

    assert_eq!(world.registry.credential_type_count(AUDITOR), 2);
    assert_eq!(world.registry.credential_type_count(DEFI_EXPERT), 1);
    assert_eq!(world.registry.credential_type_count(HACKATHON_WINNER), 0);
}

#[test]
fn test_registry_identity() {
    let registry = CredentialRegistry::new(admin());
    assert_eq!(registry.name(), "Veritas Soulbound Token");
    assert_eq!(registry.symbol(), "VSBT");
    assert_eq!(registry.owner(), admin());
    assert_eq!(registry.total_supply(), 0);
}

// =========================================================================
// Revocation
// =========================================================================

#[test]
fn test_revocation_is_permanent() {
    let mut world = World::new();
    let id = world.mint(alice(), AUDITOR, GENESIS + 10);

    // Issuers cannot revoke; only the administrator can.
    let err = world
        .registry
        .revoke_credential(&ctx(issuer(), GENESIS + 20), id, "mistake")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);

    world
        .registry
        .revoke_credential(&ctx(admin(), GENESIS + 30), id, "fraud")
        .unwrap();
    let c = world.registry.get_credential(id).unwrap();
    assert_eq!(c.status, CredentialStatus::Revoked);
    assert!(!c.is_valid());

    let err = world
        .registry
        .revoke_credential(&ctx(admin(), GENESIS + 40), id, "again")
        .unwrap_err();
    assert!(matches!(err, CredentialError::AlreadyRevoked(t) if t == id));
    assert_eq!(err.kind(), ErrorKind::State);

    // Still owned and still listed; only its validity changed.
    assert_eq!(world.registry.owner_of(id).unwrap(), alice());
    assert_eq!(world.registry.get_user_credentials(&alice()), &[id]);

    let revocations = world.registry.events().by_topic(&Topic::Token(id));
    assert_eq!(revocations.len(), 2);
    assert!(matches!(
        &revocations[1].event,
        RegistryEvent::CredentialRevoked { reason, .. } if reason == "fraud"
    ));
}

#[test]
fn test_revoking_unknown_token() {
    let mut world = World::new();
    let err = world
        .registry
        .revoke_credential(&ctx(admin(), GENESIS + 10), 42, "nope")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_registry_ownership_transfer() {
    let mut world = World::new();
    world
        .registry
        .transfer_ownership(&ctx(admin(), GENESIS + 10), bob())
        .unwrap();
    assert_eq!(world.registry.owner(), bob());

    // The previous administrator lost its powers.
    assert!(world
        .registry
        .set_issuer_whitelist(&ctx(admin(), GENESIS + 20), alice(), true)
        .is_err());
    assert!(world
        .registry
        .set_issuer_whitelist(&ctx(bob(), GENESIS + 20), alice(), true)
        .is_ok());
}
