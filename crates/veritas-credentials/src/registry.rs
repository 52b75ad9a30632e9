use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use veritas_core::{
    Address, CallContext, CredentialEvent, CredentialStateMachine, CredentialStatus, EventLog,
    ProtocolConfig, TokenId,
};

use crate::credential::{Credential, NewCredential};
use crate::error::CredentialError;
use crate::events::RegistryEvent;

/// Registry of soulbound credentials.
///
/// Tokens are minted by whitelisted issuers, bound permanently to their
/// recipient, and may only ever move from valid to revoked. Every mutation
/// takes a [`CallContext`]; authorization and input checks all run before
/// any state is touched, so a rejected call leaves the registry unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRegistry {
    name: String,
    symbol: String,
    /// Registry administrator.
    owner: Address,
    next_token_id: TokenId,
    credentials: BTreeMap<TokenId, Credential>,
    user_credentials: BTreeMap<Address, Vec<TokenId>>,
    whitelisted_issuers: BTreeSet<Address>,
    type_counts: BTreeMap<String, u64>,
    /// Not part of the serialized form; persisted entry by entry and
    /// reattached with [`CredentialRegistry::replace_events`].
    #[serde(skip)]
    events: EventLog<RegistryEvent>,
}

impl CredentialRegistry {
    /// Create an empty registry administered by `owner`.
    pub fn new(owner: Address) -> Self {
        Self::with_config(owner, &ProtocolConfig::default())
    }

    /// Create an empty registry using the collection name and symbol from
    /// `config`.
    pub fn with_config(owner: Address, config: &ProtocolConfig) -> Self {
        Self {
            name: config.token_name.clone(),
            symbol: config.token_symbol.clone(),
            owner,
            next_token_id: 1,
            credentials: BTreeMap::new(),
            user_credentials: BTreeMap::new(),
            whitelisted_issuers: BTreeSet::new(),
            type_counts: BTreeMap::new(),
            events: EventLog::new(),
        }
    }

    fn require_admin(&self, ctx: &CallContext) -> Result<(), CredentialError> {
        if ctx.caller != self.owner {
            tracing::warn!(caller = %ctx.caller, "registry admin call rejected");
            return Err(CredentialError::NotAdmin(ctx.caller));
        }
        Ok(())
    }

    // --- Administration ---

    /// Add or remove an issuer from the whitelist.
    pub fn set_issuer_whitelist(
        &mut self,
        ctx: &CallContext,
        issuer: Address,
        status: bool,
    ) -> Result<(), CredentialError> {
        self.require_admin(ctx)?;
        if issuer.is_zero() {
            return Err(CredentialError::InvalidAddress("issuer is the zero address".into()));
        }

        if status {
            self.whitelisted_issuers.insert(issuer);
        } else {
            self.whitelisted_issuers.remove(&issuer);
        }
        self.events
            .append(ctx.timestamp, RegistryEvent::IssuerWhitelisted { issuer, status });

        tracing::info!(issuer = %issuer, status, "issuer whitelist updated");
        Ok(())
    }

    /// Hand the administrator role to `new_owner`.
    pub fn transfer_ownership(
        &mut self,
        ctx: &CallContext,
        new_owner: Address,
    ) -> Result<(), CredentialError> {
        self.require_admin(ctx)?;
        if new_owner.is_zero() {
            return Err(CredentialError::InvalidAddress("new owner is the zero address".into()));
        }

        let previous_owner = self.owner;
        self.owner = new_owner;
        self.events.append(
            ctx.timestamp,
            RegistryEvent::OwnershipTransferred {
                previous_owner,
                new_owner,
            },
        );

        tracing::info!(from = %previous_owner, to = %new_owner, "registry ownership transferred");
        Ok(())
    }

    // --- Issuance and revocation ---

    /// Mint a credential to `params.recipient`. Returns the new token id.
    pub fn mint_credential(
        &mut self,
        ctx: &CallContext,
        params: NewCredential,
    ) -> Result<TokenId, CredentialError> {
        if !self.is_whitelisted(&ctx.caller) {
            tracing::warn!(caller = %ctx.caller, "mint by non-whitelisted issuer rejected");
            return Err(CredentialError::NotWhitelistedIssuer(ctx.caller));
        }
        if params.recipient.is_zero() {
            return Err(CredentialError::InvalidRecipient);
        }
        if params.metadata_hash.is_zero() {
            return Err(CredentialError::InvalidMetadataHash);
        }
        if params.credential_type.trim().is_empty() {
            return Err(CredentialError::EmptyCredentialType);
        }

        let token_id = self.next_token_id;
        self.next_token_id += 1;

        let credential = Credential {
            token_id,
            owner: params.recipient,
            credential_type: params.credential_type,
            issuer_name: params.issuer_name,
            issuer: ctx.caller,
            timestamp: ctx.timestamp,
            metadata_hash: params.metadata_hash,
            metadata_uri: params.metadata_uri,
            status: CredentialStatus::Valid,
        };

        self.user_credentials
            .entry(credential.owner)
            .or_default()
            .push(token_id);
        *self
            .type_counts
            .entry(credential.credential_type.clone())
            .or_insert(0) += 1;

        self.events.append(
            ctx.timestamp,
            RegistryEvent::CredentialIssued {
                token_id,
                recipient: credential.owner,
                issuer: credential.issuer,
                credential_type: credential.credential_type.clone(),
                issuer_name: credential.issuer_name.clone(),
                timestamp: credential.timestamp,
                metadata_hash: credential.metadata_hash,
                metadata_uri: credential.metadata_uri.clone(),
            },
        );

        tracing::info!(
            token_id,
            recipient = %credential.owner,
            issuer = %credential.issuer,
            credential_type = %credential.credential_type,
            "credential minted"
        );

        self.credentials.insert(token_id, credential);
        Ok(token_id)
    }

    /// Permanently revoke a credential.
    pub fn revoke_credential(
        &mut self,
        ctx: &CallContext,
        token_id: TokenId,
        reason: impl Into<String>,
    ) -> Result<(), CredentialError> {
        self.require_admin(ctx)?;
        let credential = self
            .credentials
            .get_mut(&token_id)
            .ok_or(CredentialError::CredentialNotFound(token_id))?;

        let next = CredentialStateMachine::transition(credential.status, CredentialEvent::Revoke)
            .map_err(|_| CredentialError::AlreadyRevoked(token_id))?;
        credential.status = next;

        let reason = reason.into();
        tracing::info!(token_id, reason = %reason, "credential revoked");
        self.events
            .append(ctx.timestamp, RegistryEvent::CredentialRevoked { token_id, reason });
        Ok(())
    }

    // --- Soulbound guards ---

    /// Always fails: credentials cannot change hands.
    pub fn transfer_from(
        &self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> Result<(), CredentialError> {
        tracing::warn!(caller = %ctx.caller, from = %from, to = %to, token_id, "transfer of soulbound token rejected");
        Err(CredentialError::SoulboundTransfer)
    }

    /// Always fails: credentials cannot change hands.
    pub fn safe_transfer_from(
        &self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> Result<(), CredentialError> {
        self.transfer_from(ctx, from, to, token_id)
    }

    /// Always fails: no address may be approved to move a credential.
    pub fn approve(
        &self,
        ctx: &CallContext,
        to: Address,
        token_id: TokenId,
    ) -> Result<(), CredentialError> {
        tracing::warn!(caller = %ctx.caller, to = %to, token_id, "approval of soulbound token rejected");
        Err(CredentialError::SoulboundApproval)
    }

    /// Always fails: no operator may be approved for a holder's credentials.
    pub fn set_approval_for_all(
        &self,
        ctx: &CallContext,
        operator: Address,
        approved: bool,
    ) -> Result<(), CredentialError> {
        tracing::warn!(caller = %ctx.caller, operator = %operator, approved, "operator approval rejected");
        Err(CredentialError::SoulboundApproval)
    }

    // --- Reads ---

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Current administrator.
    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_whitelisted(&self, issuer: &Address) -> bool {
        self.whitelisted_issuers.contains(issuer)
    }

    /// All whitelisted issuers in address order.
    pub fn whitelisted_issuers(&self) -> impl Iterator<Item = &Address> {
        self.whitelisted_issuers.iter()
    }

    /// Full record for a minted token.
    pub fn get_credential(&self, token_id: TokenId) -> Result<&Credential, CredentialError> {
        self.credentials
            .get(&token_id)
            .ok_or(CredentialError::CredentialNotFound(token_id))
    }

    /// Whether a minted token is still valid.
    pub fn is_credential_valid(&self, token_id: TokenId) -> Result<bool, CredentialError> {
        Ok(self.get_credential(token_id)?.is_valid())
    }

    /// Every token ever minted to `user`, revoked ones included, in mint order.
    pub fn get_user_credentials(&self, user: &Address) -> &[TokenId] {
        self.user_credentials
            .get(user)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn owner_of(&self, token_id: TokenId) -> Result<Address, CredentialError> {
        Ok(self.get_credential(token_id)?.owner)
    }

    /// Number of tokens held by `user`, revoked ones included.
    pub fn balance_of(&self, user: &Address) -> usize {
        self.get_user_credentials(user).len()
    }

    /// Metadata locator of a minted token.
    pub fn token_uri(&self, token_id: TokenId) -> Result<&str, CredentialError> {
        Ok(&self.get_credential(token_id)?.metadata_uri)
    }

    /// Number of tokens minted so far.
    pub fn total_supply(&self) -> u64 {
        self.next_token_id - 1
    }

    /// Always `None` for an existing token.
    pub fn get_approved(&self, token_id: TokenId) -> Result<Option<Address>, CredentialError> {
        self.get_credential(token_id)?;
        Ok(None)
    }

    /// Always `false`.
    pub fn is_approved_for_all(&self, _owner: &Address, _operator: &Address) -> bool {
        false
    }

    /// Number of tokens ever minted with `credential_type`.
    pub fn credential_type_count(&self, credential_type: &str) -> u64 {
        self.type_counts.get(credential_type).copied().unwrap_or(0)
    }

    /// The registry's event log.
    pub fn events(&self) -> &EventLog<RegistryEvent> {
        &self.events
    }

    /// Swap in a log read back from storage, returning the current one.
    pub fn replace_events(&mut self, events: EventLog<RegistryEvent>) -> EventLog<RegistryEvent> {
        std::mem::replace(&mut self.events, events)
    }
}
