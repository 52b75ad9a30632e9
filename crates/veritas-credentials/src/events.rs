use serde::{Deserialize, Serialize};

use veritas_core::{Address, Bytes32, IndexedEvent, Timestamp, TokenId, Topic};

/// Events published by the credential registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum RegistryEvent {
    CredentialIssued {
        token_id: TokenId,
        recipient: Address,
        issuer: Address,
        credential_type: String,
        issuer_name: String,
        timestamp: Timestamp,
        metadata_hash: Bytes32,
        metadata_uri: String,
    },
    CredentialRevoked {
        token_id: TokenId,
        reason: String,
    },
    IssuerWhitelisted {
        issuer: Address,
        status: bool,
    },
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
}

impl IndexedEvent for RegistryEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::CredentialIssued { .. } => "CredentialIssued",
            Self::CredentialRevoked { .. } => "CredentialRevoked",
            Self::IssuerWhitelisted { .. } => "IssuerWhitelisted",
            Self::OwnershipTransferred { .. } => "OwnershipTransferred",
        }
    }

    fn topics(&self) -> Vec<Topic> {
        match self {
            Self::CredentialIssued {
                token_id,
                recipient,
                issuer,
                ..
            } => vec![
                Topic::Token(*token_id),
                Topic::Address(*recipient),
                Topic::Address(*issuer),
            ],
            Self::CredentialRevoked { token_id, .. } => vec![Topic::Token(*token_id)],
            Self::IssuerWhitelisted { issuer, .. } => vec![Topic::Address(*issuer)],
            Self::OwnershipTransferred {
                previous_owner,
                new_owner,
            } => vec![Topic::Address(*previous_owner), Topic::Address(*new_owner)],
        }
    }
}
