//! The Veritas ledger node.
//!
//! Owns the ledger and its storage. HTTP handlers never touch the ledger
//! directly: they send [`NodeCommand`]s over a channel and the event loop
//! applies them one at a time, stamping each with the wall-clock second.
//! Every accepted mutation is persisted before its reply is sent; if the
//! write fails the ledger is rewound to the last committed snapshot.

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;

use veritas_core::{
    Address, CallContext, EventEnvelope, EventLog, IndexedEvent, LogEntry, RequestId, Timestamp,
    TokenId,
};
use veritas_credentials::NewCredential;
use veritas_proof::RawVerificationKey;
use veritas_verification::{NewProofRequest, ProofPayload, ProofSubmission, RequestView};

use crate::commands::{
    ApiError, CredentialView, IssuerResponse, KeyResponse, LedgerStatus, NodeCommand,
};
use crate::config::VeritasConfig;
use crate::ledger::{Ledger, PROTOCOL_STREAM, REGISTRY_STREAM};
use crate::state::NodeState;
use crate::storage::{PendingEvent, Storage};

/// Current ledger time: whole seconds since the Unix epoch.
pub fn ledger_time() -> Timestamp {
    chrono::Utc::now().timestamp().max(0) as Timestamp
}

/// Next sequence number to persist, per stream.
#[derive(Debug, Clone, Copy, Default)]
struct Persisted {
    registry: u64,
    protocol: u64,
}

/// The full Veritas node: ledger, storage, command loop and HTTP API.
pub struct VeritasFullNode {
    /// Node configuration.
    config: VeritasConfig,
    /// Registry and verification protocol.
    ledger: Ledger,
    /// Persistent storage.
    storage: Storage,
    persisted: Persisted,
    /// Snapshot bytes of the last successful commit.
    committed: Vec<u8>,
    /// Shared state accessible from HTTP handlers.
    node_state: Option<Arc<NodeState>>,
    /// Receives commands from the HTTP API.
    command_rx: Option<mpsc::Receiver<NodeCommand>>,
    /// Address the API server is bound to, once started.
    api_addr: Option<SocketAddr>,
}

impl VeritasFullNode {
    /// Open storage and load the ledger, creating it from the genesis
    /// section of `config` if the data directory is empty.
    pub fn new(config: VeritasConfig) -> Result<Self> {
        let storage = Storage::open(&config.storage.data_dir)?;
        tracing::info!(path = %config.storage.data_dir.display(), "storage initialized");

        let snapshot = storage.get_snapshot()?;
        let fresh = snapshot.is_none();
        let (ledger, committed) = match snapshot {
            Some(bytes) => {
                let mut ledger = Ledger::from_json(&bytes)?;
                ledger.attach_events(
                    load_events(&storage, REGISTRY_STREAM)?,
                    load_events(&storage, PROTOCOL_STREAM)?,
                );
                tracing::info!(
                    credentials = ledger.registry.total_supply(),
                    requests = ledger.protocol.request_count(),
                    registry_events = ledger.registry.events().len(),
                    protocol_events = ledger.protocol.events().len(),
                    "ledger restored"
                );
                (ledger, bytes)
            }
            None => {
                let ledger = Ledger::genesis(
                    config.protocol.admin,
                    &config.protocol.issuers,
                    &config.protocol.settings,
                    ledger_time(),
                )?;
                (ledger, Vec::new())
            }
        };

        let persisted = if fresh {
            Persisted::default()
        } else {
            Persisted {
                registry: ledger.registry.events().len() as u64,
                protocol: ledger.protocol.events().len() as u64,
            }
        };

        let mut node = Self {
            config,
            ledger,
            storage,
            persisted,
            committed,
            node_state: None,
            command_rx: None,
            api_addr: None,
        };
        if fresh {
            node.persist()?;
        }
        Ok(node)
    }

    /// Start the HTTP API and open the command channel.
    pub async fn start(&mut self) -> Result<()> {
        tracing::info!("starting Veritas node");

        let (command_tx, command_rx) = mpsc::channel::<NodeCommand>(256);
        let node_state = Arc::new(NodeState::new(command_tx));

        let api_addr: SocketAddr =
            format!("{}:{}", self.config.api.listen_addr, self.config.api.port).parse()?;
        let listener = tokio::net::TcpListener::bind(api_addr).await?;
        let bound = listener.local_addr()?;

        let api_state = node_state.clone();
        tokio::spawn(async move {
            if let Err(e) = crate::api::serve(listener, api_state).await {
                tracing::error!(error = %e, "HTTP API server error");
            }
        });
        tracing::info!(listen_addr = %bound, "HTTP API server started");

        self.node_state = Some(node_state);
        self.command_rx = Some(command_rx);
        self.api_addr = Some(bound);
        Ok(())
    }

    /// Run the node's main event loop until the command channel closes.
    pub async fn run(&mut self) -> Result<()> {
        let mut command_rx = self
            .command_rx
            .take()
            .ok_or_else(|| anyhow::anyhow!("node not started"))?;

        tracing::info!("entering main event loop");

        while let Some(cmd) = command_rx.recv().await {
            self.handle_command(cmd, ledger_time());
        }

        tracing::info!("API command channel closed");
        Ok(())
    }

    /// Gracefully shut down the node.
    pub async fn shutdown(&mut self) -> Result<()> {
        tracing::info!("shutting down Veritas node");

        self.node_state = None;
        self.command_rx = None;
        self.storage.flush()?;

        tracing::info!("Veritas node shut down");
        Ok(())
    }

    pub fn api_addr(&self) -> Option<SocketAddr> {
        self.api_addr
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    // --- Persistence ---

    /// Write the snapshot and every event not yet stored in one batch.
    fn persist(&mut self) -> Result<()> {
        let snapshot = self.ledger.to_json()?;
        let mut pending = encode_events(
            REGISTRY_STREAM,
            self.ledger.registry.events(),
            self.persisted.registry,
        )?;
        pending.extend(encode_events(
            PROTOCOL_STREAM,
            self.ledger.protocol.events(),
            self.persisted.protocol,
        )?);
        self.storage.commit(&snapshot, &pending)?;

        self.persisted = Persisted {
            registry: self.ledger.registry.events().len() as u64,
            protocol: self.ledger.protocol.events().len() as u64,
        };
        self.committed = snapshot;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), ApiError> {
        let Err(e) = self.persist() else {
            return Ok(());
        };
        tracing::error!(error = %e, "failed to persist ledger, rewinding");
        if let Err(rewind) = self.ledger.rewind(
            &self.committed,
            self.persisted.registry as usize,
            self.persisted.protocol as usize,
        ) {
            tracing::error!(error = %rewind, "failed to rewind ledger");
        }
        Err(ApiError::internal(format!("storage error: {}", e)))
    }

    // --- Command handling ---

    /// Apply one command at ledger time `now` and send its reply.
    pub fn handle_command(&mut self, cmd: NodeCommand, now: Timestamp) {
        match cmd {
            NodeCommand::Status { reply } => {
                let _ = reply.send(Ok(self.status()));
            }

            NodeCommand::SetIssuerWhitelist {
                caller,
                issuer,
                status,
                reply,
            } => {
                let _ = reply.send(self.set_issuer(CallContext::new(caller, now), issuer, status));
            }
            NodeCommand::IsWhitelisted { issuer, reply } => {
                let _ = reply.send(Ok(IssuerResponse {
                    issuer,
                    whitelisted: self.ledger.registry.is_whitelisted(&issuer),
                }));
            }
            NodeCommand::MintCredential {
                caller,
                params,
                reply,
            } => {
                let _ = reply.send(self.mint(CallContext::new(caller, now), params));
            }
            NodeCommand::GetCredential { token_id, reply } => {
                let _ = reply.send(self.credential_view(token_id));
            }
            NodeCommand::RevokeCredential {
                caller,
                token_id,
                reason,
                reply,
            } => {
                let _ = reply.send(self.revoke(CallContext::new(caller, now), token_id, reason));
            }
            NodeCommand::TransferCredential {
                caller,
                from,
                to,
                token_id,
                reply,
            } => {
                let ctx = CallContext::new(caller, now);
                let result = self
                    .ledger
                    .registry
                    .safe_transfer_from(&ctx, from, to, token_id)
                    .map_err(ApiError::from)
                    .and_then(|()| self.credential_view(token_id));
                let _ = reply.send(result);
            }
            NodeCommand::ApproveCredential {
                caller,
                to,
                token_id,
                reply,
            } => {
                let ctx = CallContext::new(caller, now);
                let result = self
                    .ledger
                    .registry
                    .approve(&ctx, to, token_id)
                    .map_err(ApiError::from)
                    .and_then(|()| self.credential_view(token_id));
                let _ = reply.send(result);
            }
            NodeCommand::UserCredentials { user, reply } => {
                let result = self
                    .ledger
                    .registry
                    .get_user_credentials(&user)
                    .iter()
                    .map(|id| self.credential_view(*id))
                    .collect();
                let _ = reply.send(result);
            }

            NodeCommand::CreateProofRequest {
                caller,
                params,
                reply,
            } => {
                let _ = reply.send(self.create_request(CallContext::new(caller, now), params));
            }
            NodeCommand::GetProofRequest { request_id, reply } => {
                let result = self
                    .ledger
                    .protocol
                    .get_proof_request(&request_id, now)
                    .map_err(ApiError::from);
                let _ = reply.send(result);
            }
            NodeCommand::DeactivateRequest {
                caller,
                request_id,
                reply,
            } => {
                let ctx = CallContext::new(caller, now);
                let _ = reply.send(self.deactivate_request(ctx, request_id));
            }
            NodeCommand::RequesterRequests { requester, reply } => {
                let protocol = &self.ledger.protocol;
                let result = protocol
                    .get_requester_requests(&requester)
                    .iter()
                    .map(|id| protocol.get_proof_request(id, now).map_err(ApiError::from))
                    .collect();
                let _ = reply.send(result);
            }
            NodeCommand::SubmitProof {
                caller,
                payload,
                reply,
            } => {
                let _ = reply.send(self.submit(CallContext::new(caller, now), payload));
            }
            NodeCommand::GetProofSubmission { proof_id, reply } => {
                let result = self
                    .ledger
                    .protocol
                    .get_proof_submission(&proof_id)
                    .cloned()
                    .map_err(ApiError::from);
                let _ = reply.send(result);
            }
            NodeCommand::RequestSubmissions { request_id, reply } => {
                let result = self
                    .ledger
                    .protocol
                    .get_request_submissions(&request_id)
                    .map(|subs| subs.into_iter().cloned().collect())
                    .map_err(ApiError::from);
                let _ = reply.send(result);
            }
            NodeCommand::SetVerificationEnabled {
                caller,
                enabled,
                reply,
            } => {
                let ctx = CallContext::new(caller, now);
                let result = self
                    .ledger
                    .protocol
                    .set_verification_enabled(&ctx, enabled)
                    .map_err(ApiError::from)
                    .and_then(|()| self.commit())
                    .map(|()| self.status());
                let _ = reply.send(result);
            }
            NodeCommand::SetDefaultExpiry {
                caller,
                seconds,
                reply,
            } => {
                let ctx = CallContext::new(caller, now);
                let result = self
                    .ledger
                    .protocol
                    .set_default_expiry_time(&ctx, seconds)
                    .map_err(ApiError::from)
                    .and_then(|()| self.commit())
                    .map(|()| self.status());
                let _ = reply.send(result);
            }
            NodeCommand::SetVerificationKey { caller, key, reply } => {
                let _ = reply.send(self.set_key(CallContext::new(caller, now), &key));
            }

            NodeCommand::RegistryEvents {
                since,
                limit,
                reply,
            } => {
                let _ = reply.send(Ok(page(self.ledger.registry.events(), since, limit)));
            }
            NodeCommand::ProtocolEvents {
                since,
                limit,
                reply,
            } => {
                let _ = reply.send(Ok(page(self.ledger.protocol.events(), since, limit)));
            }
        }
    }

    fn status(&self) -> LedgerStatus {
        let registry = &self.ledger.registry;
        let protocol = &self.ledger.protocol;
        LedgerStatus {
            name: registry.name().to_string(),
            symbol: registry.symbol().to_string(),
            admin: registry.owner(),
            total_supply: registry.total_supply(),
            issuer_count: registry.whitelisted_issuers().count(),
            verification_enabled: protocol.verification_enabled(),
            default_expiry_secs: protocol.default_expiry_secs(),
            replay_scope: protocol.replay_scope(),
            request_count: protocol.request_count(),
            submission_count: protocol.submission_count(),
            registry_events: registry.events().len(),
            protocol_events: protocol.events().len(),
        }
    }

    fn credential_view(&self, token_id: TokenId) -> Result<CredentialView, ApiError> {
        let credential = self.ledger.registry.get_credential(token_id)?;
        Ok(CredentialView::from(credential))
    }

    fn set_issuer(
        &mut self,
        ctx: CallContext,
        issuer: Address,
        status: bool,
    ) -> Result<IssuerResponse, ApiError> {
        self.ledger.registry.set_issuer_whitelist(&ctx, issuer, status)?;
        self.commit()?;
        Ok(IssuerResponse {
            issuer,
            whitelisted: status,
        })
    }

    fn mint(&mut self, ctx: CallContext, params: NewCredential) -> Result<CredentialView, ApiError> {
        let token_id = self.ledger.registry.mint_credential(&ctx, params)?;
        self.commit()?;
        self.credential_view(token_id)
    }

    fn revoke(
        &mut self,
        ctx: CallContext,
        token_id: TokenId,
        reason: String,
    ) -> Result<CredentialView, ApiError> {
        self.ledger.registry.revoke_credential(&ctx, token_id, reason)?;
        self.commit()?;
        self.credential_view(token_id)
    }

    fn create_request(
        &mut self,
        ctx: CallContext,
        params: NewProofRequest,
    ) -> Result<RequestView, ApiError> {
        let request_id = self.ledger.protocol.create_proof_request(&ctx, params)?;
        self.commit()?;
        Ok(self.ledger.protocol.get_proof_request(&request_id, ctx.timestamp)?)
    }

    fn deactivate_request(
        &mut self,
        ctx: CallContext,
        request_id: RequestId,
    ) -> Result<RequestView, ApiError> {
        self.ledger.protocol.deactivate_request(&ctx, &request_id)?;
        self.commit()?;
        Ok(self.ledger.protocol.get_proof_request(&request_id, ctx.timestamp)?)
    }

    fn submit(
        &mut self,
        ctx: CallContext,
        payload: ProofPayload,
    ) -> Result<ProofSubmission, ApiError> {
        let proof_id = self.ledger.protocol.submit_noir_zk_proof(&ctx, payload)?;
        self.commit()?;
        Ok(self.ledger.protocol.get_proof_submission(&proof_id)?.clone())
    }

    fn set_key(
        &mut self,
        ctx: CallContext,
        key: &RawVerificationKey,
    ) -> Result<KeyResponse, ApiError> {
        let key_hash = self.ledger.protocol.set_verification_key(&ctx, key)?;
        self.commit()?;
        Ok(KeyResponse { key_hash })
    }
}

/// Encode every entry of `log` from `from` on.
fn encode_events<E: IndexedEvent + Serialize>(
    stream: &'static str,
    log: &EventLog<E>,
    from: u64,
) -> Result<Vec<PendingEvent>> {
    log.since(from)
        .iter()
        .map(|entry| {
            Ok(PendingEvent {
                stream,
                seq: entry.seq,
                envelope: EventEnvelope::wrap(stream, entry)?.to_bytes()?,
            })
        })
        .collect()
}

fn load_events<E: DeserializeOwned>(storage: &Storage, stream: &str) -> Result<EventLog<E>> {
    let entries = storage
        .events(stream)?
        .iter()
        .map(|bytes| EventEnvelope::from_bytes(bytes)?.unwrap_entry())
        .collect::<Result<Vec<LogEntry<E>>, _>>()?;
    Ok(EventLog::from_entries(entries)?)
}

fn page<E: IndexedEvent + Clone>(
    log: &EventLog<E>,
    since: u64,
    limit: usize,
) -> Vec<LogEntry<E>> {
    log.since(since).iter().take(limit).cloned().collect()
}
