use serde::{Deserialize, Serialize};

use veritas_core::{Address, Bytes32, CredentialStatus, Timestamp, TokenId};

/// A minted soulbound credential.
///
/// Every field except `status` is fixed at mint time. `owner` in particular
/// never changes: there is no transfer path in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub token_id: TokenId,
    pub owner: Address,
    /// Free-text category, e.g. "Smart Contract Auditor".
    pub credential_type: String,
    /// Display name the issuer supplied at mint time.
    pub issuer_name: String,
    /// Address that minted the token.
    pub issuer: Address,
    /// Mint time.
    pub timestamp: Timestamp,
    /// Content hash of the off-chain metadata document.
    pub metadata_hash: Bytes32,
    pub metadata_uri: String,
    pub status: CredentialStatus,
}

impl Credential {
    /// Whether the credential has not been revoked.
    pub fn is_valid(&self) -> bool {
        self.status.is_valid()
    }
}

/// Mint parameters supplied by an issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCredential {
    pub recipient: Address,
    pub credential_type: String,
    pub issuer_name: String,
    pub metadata_hash: Bytes32,
    pub metadata_uri: String,
}
