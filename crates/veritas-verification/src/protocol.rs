use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use veritas_core::{
    Address, Bytes32, CallContext, EventLog, ProofId, ProtocolConfig, ReplayScope, RequestEvent,
    RequestId, RequestState, RequestStateMachine, Timestamp,
};
use veritas_crypto::{derive_proof_id, derive_request_id};
use veritas_proof::{
    check_public_inputs, NoirProof, ProofVerifier, PublicInputs, RawVerificationKey,
    StructuralVerifier, VerificationKey,
};

use crate::error::VerificationError;
use crate::events::VerificationEvent;
use crate::request::{NewProofRequest, ProofRequest, RequestView};
use crate::submission::{ProofPayload, ProofSubmission};

pub const RESULT_VERIFIED: &str = "Proof verified successfully";
pub const RESULT_REJECTED: &str = "Proof verification failed";

/// Everything the protocol persists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolState {
    owner: Address,
    verification_enabled: bool,
    default_expiry_secs: u64,
    replay_scope: ReplayScope,
    verification_key: Option<VerificationKey>,
    /// Incremented on every request; never reused.
    request_nonce: u64,
    requests: BTreeMap<RequestId, ProofRequest>,
    requester_requests: BTreeMap<Address, Vec<RequestId>>,
    submissions: BTreeMap<ProofId, ProofSubmission>,
    request_submissions: BTreeMap<RequestId, Vec<ProofId>>,
    /// Consumed `(request, proof hash)` pairs.
    used_proofs: BTreeSet<(RequestId, Bytes32)>,
    /// Consumed proof hashes across all requests.
    used_proof_hashes: BTreeSet<Bytes32>,
    /// Persisted entry by entry, outside the serialized state.
    #[serde(skip)]
    events: EventLog<VerificationEvent>,
}

impl ProtocolState {
    pub fn new(owner: Address, config: &ProtocolConfig) -> Self {
        Self {
            owner,
            verification_enabled: config.verification_enabled,
            default_expiry_secs: config.default_expiry_secs,
            replay_scope: config.replay_scope,
            verification_key: None,
            request_nonce: 0,
            requests: BTreeMap::new(),
            requester_requests: BTreeMap::new(),
            submissions: BTreeMap::new(),
            request_submissions: BTreeMap::new(),
            used_proofs: BTreeSet::new(),
            used_proof_hashes: BTreeSet::new(),
            events: EventLog::new(),
        }
    }
}

/// The verification-request and proof-submission state machine.
///
/// Mutations take a [`CallContext`] and are all-or-nothing: every check
/// runs before the first write. Request expiry is evaluated lazily against
/// `ctx.timestamp`; there are no timers.
pub struct VerificationProtocol {
    state: ProtocolState,
    verifier: Arc<dyn ProofVerifier>,
}

impl fmt::Debug for VerificationProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationProtocol")
            .field("verifier", &self.verifier.name())
            .field("owner", &self.state.owner)
            .field("requests", &self.state.requests.len())
            .field("submissions", &self.state.submissions.len())
            .finish()
    }
}

impl VerificationProtocol {
    /// Create a protocol using the [`StructuralVerifier`].
    pub fn new(owner: Address, config: &ProtocolConfig) -> Self {
        Self::with_verifier(owner, config, Arc::new(StructuralVerifier))
    }

    pub fn with_verifier(
        owner: Address,
        config: &ProtocolConfig,
        verifier: Arc<dyn ProofVerifier>,
    ) -> Self {
        Self::from_state(ProtocolState::new(owner, config), verifier)
    }

    /// Resume from persisted state.
    pub fn from_state(state: ProtocolState, verifier: Arc<dyn ProofVerifier>) -> Self {
        Self { state, verifier }
    }

    /// Persistable state.
    pub fn state(&self) -> &ProtocolState {
        &self.state
    }

    fn require_admin(&self, ctx: &CallContext) -> Result<(), VerificationError> {
        if ctx.caller != self.state.owner {
            tracing::warn!(caller = %ctx.caller, "protocol admin call rejected");
            return Err(VerificationError::NotAdmin(ctx.caller));
        }
        Ok(())
    }

    fn request(&self, request_id: &RequestId) -> Result<&ProofRequest, VerificationError> {
        self.state
            .requests
            .get(request_id)
            .ok_or(VerificationError::RequestNotFound(*request_id))
    }

    // --- Requests ---

    /// Publish a verification request. Returns its id.
    pub fn create_proof_request(
        &mut self,
        ctx: &CallContext,
        params: NewProofRequest,
    ) -> Result<RequestId, VerificationError> {
        if params.required_credentials.is_empty() {
            return Err(VerificationError::NoCredentialsSpecified);
        }
        if params
            .required_credentials
            .iter()
            .any(|t| t.trim().is_empty())
        {
            return Err(VerificationError::EmptyCredentialType);
        }
        if params.min_credentials == 0 {
            return Err(VerificationError::InvalidMinCredentials);
        }

        let expiry_time = if params.expiry_time == 0 {
            ctx.timestamp.saturating_add(self.state.default_expiry_secs)
        } else {
            params.expiry_time
        };

        let nonce = self.state.request_nonce;
        let request_id = derive_request_id(&ctx.caller, nonce, ctx.timestamp);
        self.state.request_nonce += 1;

        let request = ProofRequest {
            request_id,
            requester: ctx.caller,
            required_credentials: params.required_credentials,
            criteria_hash: params.criteria_hash,
            merkle_root: params.merkle_root,
            min_credentials: params.min_credentials,
            timestamp: ctx.timestamp,
            expiry_time,
            deactivated_at: None,
        };

        self.state.events.append(
            ctx.timestamp,
            VerificationEvent::ProofRequestCreated {
                request_id,
                requester: ctx.caller,
                required_credentials: request.required_credentials.clone(),
                criteria_hash: request.criteria_hash,
                timestamp: ctx.timestamp,
                expiry_time,
            },
        );
        self.state
            .requester_requests
            .entry(ctx.caller)
            .or_default()
            .push(request_id);
        self.state.requests.insert(request_id, request);

        tracing::info!(
            request_id = %request_id,
            requester = %ctx.caller,
            expiry_time,
            nonce,
            "proof request created"
        );
        Ok(request_id)
    }

    /// Close an active request. Allowed for its requester and the
    /// administrator.
    pub fn deactivate_request(
        &mut self,
        ctx: &CallContext,
        request_id: &RequestId,
    ) -> Result<(), VerificationError> {
        let request = self.request(request_id)?;
        if ctx.caller != request.requester && ctx.caller != self.state.owner {
            tracing::warn!(caller = %ctx.caller, request_id = %request_id, "request deactivation rejected");
            return Err(VerificationError::NotRequester {
                caller: ctx.caller,
                request_id: *request_id,
            });
        }

        let current = request.state_at(ctx.timestamp);
        RequestStateMachine::transition(current, RequestEvent::Deactivate).map_err(|_| {
            VerificationError::RequestInactiveOrExpired {
                request_id: *request_id,
                state: current,
            }
        })?;

        if let Some(request) = self.state.requests.get_mut(request_id) {
            request.deactivated_at = Some(ctx.timestamp);
        }
        self.state.events.append(
            ctx.timestamp,
            VerificationEvent::ProofRequestDeactivated {
                request_id: *request_id,
                by: ctx.caller,
            },
        );

        tracing::info!(request_id = %request_id, by = %ctx.caller, "proof request deactivated");
        Ok(())
    }

    // --- Submissions ---

    /// Submit a proof against a request. Returns the submission id.
    ///
    /// Checks run in a fixed order and the first failure is reported:
    /// verification enabled, non-zero proof hash, request exists and is
    /// active, proof hash unused, proof shape, public inputs echo the
    /// request, declared hashes match the data. Only then is the pluggable
    /// verifier consulted. Its verdict is recorded either way, and either
    /// way the proof hash is consumed.
    pub fn submit_noir_zk_proof(
        &mut self,
        ctx: &CallContext,
        payload: ProofPayload,
    ) -> Result<ProofId, VerificationError> {
        if !self.state.verification_enabled {
            return Err(VerificationError::VerificationDisabled);
        }
        if payload.proof_hash.is_zero() {
            return Err(VerificationError::InvalidProofHash);
        }

        let request_id = payload.request_id;
        let request = self.request(&request_id)?;
        let state = request.state_at(ctx.timestamp);
        if state != RequestState::Active {
            return Err(VerificationError::RequestInactiveOrExpired { request_id, state });
        }
        if self.is_proof_used(&request_id, &payload.proof_hash) {
            tracing::warn!(request_id = %request_id, proof_hash = %payload.proof_hash, "proof replay rejected");
            return Err(VerificationError::ProofAlreadyUsed);
        }

        let proof = NoirProof::from_raw(&payload.proof)?;
        let inputs = PublicInputs::parse(&payload.public_inputs)?;
        check_public_inputs(&inputs, &request.commitments())?;
        if proof.content_hash() != payload.proof_hash {
            return Err(VerificationError::HashMismatch("proof"));
        }
        if inputs.content_hash() != payload.public_inputs_hash {
            return Err(VerificationError::HashMismatch("public inputs"));
        }

        let is_verified =
            self.verifier
                .verify(&proof, &inputs, self.state.verification_key.as_ref());
        let result = if is_verified {
            RESULT_VERIFIED
        } else {
            RESULT_REJECTED
        };

        let proof_id = derive_proof_id(&request_id, &ctx.caller, &payload.proof_hash);
        let submission = ProofSubmission {
            proof_id,
            request_id,
            prover: ctx.caller,
            proof_hash: payload.proof_hash,
            public_inputs_hash: payload.public_inputs_hash,
            timestamp: ctx.timestamp,
            is_verified,
            result: result.to_string(),
        };

        self.state
            .used_proofs
            .insert((request_id, payload.proof_hash));
        self.state.used_proof_hashes.insert(payload.proof_hash);
        self.state
            .request_submissions
            .entry(request_id)
            .or_default()
            .push(proof_id);
        self.state.submissions.insert(proof_id, submission);
        self.state.events.append(
            ctx.timestamp,
            VerificationEvent::ProofVerified {
                proof_id,
                request_id,
                prover: ctx.caller,
                proof_hash: payload.proof_hash,
                timestamp: ctx.timestamp,
                success: is_verified,
                result: result.to_string(),
            },
        );

        tracing::info!(
            proof_id = %proof_id,
            request_id = %request_id,
            prover = %ctx.caller,
            verifier = self.verifier.name(),
            success = is_verified,
            "proof submission recorded"
        );
        Ok(proof_id)
    }

    // --- Administration ---

    /// Global kill switch for submissions.
    pub fn set_verification_enabled(
        &mut self,
        ctx: &CallContext,
        enabled: bool,
    ) -> Result<(), VerificationError> {
        self.require_admin(ctx)?;
        self.state.verification_enabled = enabled;
        self.state
            .events
            .append(ctx.timestamp, VerificationEvent::VerificationToggled { enabled });
        tracing::info!(enabled, "verification toggled");
        Ok(())
    }

    /// Window applied to future requests created with `expiry_time == 0`.
    pub fn set_default_expiry_time(
        &mut self,
        ctx: &CallContext,
        seconds: u64,
    ) -> Result<(), VerificationError> {
        self.require_admin(ctx)?;
        if seconds == 0 {
            return Err(VerificationError::InvalidExpiryWindow(
                "default expiry must be positive".into(),
            ));
        }
        self.state.default_expiry_secs = seconds;
        self.state
            .events
            .append(ctx.timestamp, VerificationEvent::DefaultExpiryUpdated { seconds });
        tracing::info!(seconds, "default expiry updated");
        Ok(())
    }

    /// Install or replace the verification key handed to the verifier.
    pub fn set_verification_key(
        &mut self,
        ctx: &CallContext,
        key: &RawVerificationKey,
    ) -> Result<Bytes32, VerificationError> {
        self.require_admin(ctx)?;
        let key = VerificationKey::from_raw(key)?;
        let key_hash = key.content_hash();
        self.state.verification_key = Some(key);
        self.state
            .events
            .append(ctx.timestamp, VerificationEvent::VerificationKeyUpdated { key_hash });
        tracing::info!(key_hash = %key_hash, "verification key installed");
        Ok(key_hash)
    }

    pub fn transfer_ownership(
        &mut self,
        ctx: &CallContext,
        new_owner: Address,
    ) -> Result<(), VerificationError> {
        self.require_admin(ctx)?;
        if new_owner.is_zero() {
            return Err(VerificationError::InvalidAddress(
                "new owner is the zero address".into(),
            ));
        }
        let previous_owner = self.state.owner;
        self.state.owner = new_owner;
        self.state.events.append(
            ctx.timestamp,
            VerificationEvent::OwnershipTransferred {
                previous_owner,
                new_owner,
            },
        );
        tracing::info!(from = %previous_owner, to = %new_owner, "protocol ownership transferred");
        Ok(())
    }

    // --- Reads ---

    /// A request as seen at ledger time `now`.
    pub fn get_proof_request(
        &self,
        request_id: &RequestId,
        now: Timestamp,
    ) -> Result<RequestView, VerificationError> {
        Ok(RequestView::at(self.request(request_id)?, now))
    }

    pub fn get_proof_submission(
        &self,
        proof_id: &ProofId,
    ) -> Result<&ProofSubmission, VerificationError> {
        self.state
            .submissions
            .get(proof_id)
            .ok_or(VerificationError::SubmissionNotFound(*proof_id))
    }

    /// Ids of every request created by `requester`, oldest first.
    pub fn get_requester_requests(&self, requester: &Address) -> &[RequestId] {
        self.state
            .requester_requests
            .get(requester)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Submissions recorded against a request, oldest first.
    pub fn get_request_submissions(
        &self,
        request_id: &RequestId,
    ) -> Result<Vec<&ProofSubmission>, VerificationError> {
        self.request(request_id)?;
        Ok(self
            .state
            .request_submissions
            .get(request_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.state.submissions.get(id))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Whether `proof_hash` has been consumed for `request_id` under the
    /// configured replay scope.
    pub fn is_proof_used(&self, request_id: &RequestId, proof_hash: &Bytes32) -> bool {
        match self.state.replay_scope {
            ReplayScope::PerRequest => self
                .state
                .used_proofs
                .contains(&(*request_id, *proof_hash)),
            ReplayScope::Global => self.state.used_proof_hashes.contains(proof_hash),
        }
    }

    pub fn owner(&self) -> Address {
        self.state.owner
    }

    pub fn verification_enabled(&self) -> bool {
        self.state.verification_enabled
    }

    pub fn default_expiry_secs(&self) -> u64 {
        self.state.default_expiry_secs
    }

    pub fn replay_scope(&self) -> ReplayScope {
        self.state.replay_scope
    }

    pub fn verification_key(&self) -> Option<&VerificationKey> {
        self.state.verification_key.as_ref()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.len()
    }

    pub fn submission_count(&self) -> usize {
        self.state.submissions.len()
    }

    pub fn events(&self) -> &EventLog<VerificationEvent> {
        &self.state.events
    }

    /// Swap in a log read back from storage, returning the current one.
    pub fn replace_events(
        &mut self,
        events: EventLog<VerificationEvent>,
    ) -> EventLog<VerificationEvent> {
        std::mem::replace(&mut self.state.events, events)
    }
}
