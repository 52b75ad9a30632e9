//! HTTP API server for the Veritas node.
//!
//! Provides REST endpoints for node status, the credential registry, the
//! verification protocol, and the two event feeds. Every mutating request
//! names its `caller`; the node applies it as that address.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use veritas_core::{Address, Bytes32, ErrorKind, LogEntry, TokenId};
use veritas_credentials::{NewCredential, RegistryEvent};
use veritas_proof::RawVerificationKey;
use veritas_verification::{
    NewProofRequest, ProofPayload, ProofSubmission, RequestView, VerificationEvent,
};

use crate::commands::{
    ApiError, CredentialView, IssuerResponse, KeyResponse, LedgerStatus, NodeCommand,
};
use crate::state::NodeState;

/// Default and maximum page sizes for the event feeds.
const DEFAULT_EVENT_LIMIT: usize = 100;
const MAX_EVENT_LIMIT: usize = 1000;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

// --- Request / response types ---

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub uptime_secs: u64,
    #[serde(flatten)]
    pub ledger: LedgerStatus,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Error class, absent for node-side failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

#[derive(Deserialize)]
pub struct SetIssuerRequest {
    pub caller: Address,
    pub issuer: Address,
    pub status: bool,
}

#[derive(Deserialize)]
pub struct MintRequest {
    pub caller: Address,
    #[serde(flatten)]
    pub credential: NewCredential,
}

#[derive(Deserialize)]
pub struct RevokeRequest {
    pub caller: Address,
    #[serde(default)]
    pub reason: String,
}

#[derive(Deserialize)]
pub struct TransferRequest {
    pub caller: Address,
    pub from: Address,
    pub to: Address,
}

#[derive(Deserialize)]
pub struct ApproveRequest {
    pub caller: Address,
    pub to: Address,
}

#[derive(Deserialize)]
pub struct CreateRequestRequest {
    pub caller: Address,
    #[serde(flatten)]
    pub request: NewProofRequest,
}

#[derive(Deserialize)]
pub struct CallerRequest {
    pub caller: Address,
}

#[derive(Deserialize)]
pub struct SubmitProofRequest {
    pub caller: Address,
    #[serde(flatten)]
    pub payload: ProofPayload,
}

#[derive(Deserialize)]
pub struct SetEnabledRequest {
    pub caller: Address,
    pub enabled: bool,
}

#[derive(Deserialize)]
pub struct SetExpiryRequest {
    pub caller: Address,
    pub seconds: u64,
}

#[derive(Deserialize)]
pub struct SetKeyRequest {
    pub caller: Address,
    pub key: RawVerificationKey,
}

#[derive(Deserialize)]
pub struct EventQuery {
    #[serde(default)]
    pub since: u64,
    pub limit: Option<usize>,
}

impl EventQuery {
    fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_EVENT_LIMIT)
            .min(MAX_EVENT_LIMIT)
    }
}

fn status_code(kind: Option<ErrorKind>) -> StatusCode {
    match kind {
        Some(ErrorKind::Authorization) => StatusCode::FORBIDDEN,
        Some(ErrorKind::NotFound) => StatusCode::NOT_FOUND,
        Some(ErrorKind::Validation) => StatusCode::BAD_REQUEST,
        Some(ErrorKind::State) => StatusCode::CONFLICT,
        None => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: ApiError) -> (StatusCode, Json<ErrorResponse>) {
    (
        status_code(err.kind),
        Json(ErrorResponse {
            error: err.message,
            kind: err.kind,
        }),
    )
}

/// Parse a hex path segment into an address or 32-byte id.
fn parse_path<T>(raw: &str) -> Result<T, (StatusCode, Json<ErrorResponse>)>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    T::from_str(raw).map_err(|e| {
        error_response(ApiError {
            kind: Some(ErrorKind::Validation),
            message: e.to_string(),
        })
    })
}

// --- Handlers ---

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}

async fn handle_status(State(state): State<Arc<NodeState>>) -> ApiResult<StatusResponse> {
    let (reply, rx) = oneshot::channel();
    let Json(ledger) = send_command_and_await(&state, NodeCommand::Status { reply }, rx).await?;
    Ok(Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
        ledger,
    }))
}

async fn handle_get_issuer(
    State(state): State<Arc<NodeState>>,
    Path(issuer): Path<String>,
) -> ApiResult<IssuerResponse> {
    let issuer = parse_path(&issuer)?;
    let (reply, rx) = oneshot::channel();
    send_command_and_await(&state, NodeCommand::IsWhitelisted { issuer, reply }, rx).await
}

async fn handle_set_issuer(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<SetIssuerRequest>,
) -> ApiResult<IssuerResponse> {
    let (reply, rx) = oneshot::channel();
    let cmd = NodeCommand::SetIssuerWhitelist {
        caller: req.caller,
        issuer: req.issuer,
        status: req.status,
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_mint(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<MintRequest>,
) -> ApiResult<CredentialView> {
    let (reply, rx) = oneshot::channel();
    let cmd = NodeCommand::MintCredential {
        caller: req.caller,
        params: req.credential,
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_get_credential(
    State(state): State<Arc<NodeState>>,
    Path(token_id): Path<TokenId>,
) -> ApiResult<CredentialView> {
    let (reply, rx) = oneshot::channel();
    send_command_and_await(&state, NodeCommand::GetCredential { token_id, reply }, rx).await
}

async fn handle_revoke(
    State(state): State<Arc<NodeState>>,
    Path(token_id): Path<TokenId>,
    Json(req): Json<RevokeRequest>,
) -> ApiResult<CredentialView> {
    let (reply, rx) = oneshot::channel();
    let cmd = NodeCommand::RevokeCredential {
        caller: req.caller,
        token_id,
        reason: req.reason,
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_transfer(
    State(state): State<Arc<NodeState>>,
    Path(token_id): Path<TokenId>,
    Json(req): Json<TransferRequest>,
) -> ApiResult<CredentialView> {
    let (reply, rx) = oneshot::channel();
    let cmd = NodeCommand::TransferCredential {
        caller: req.caller,
        from: req.from,
        to: req.to,
        token_id,
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_approve(
    State(state): State<Arc<NodeState>>,
    Path(token_id): Path<TokenId>,
    Json(req): Json<ApproveRequest>,
) -> ApiResult<CredentialView> {
    let (reply, rx) = oneshot::channel();
    let cmd = NodeCommand::ApproveCredential {
        caller: req.caller,
        to: req.to,
        token_id,
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_user_credentials(
    State(state): State<Arc<NodeState>>,
    Path(user): Path<String>,
) -> ApiResult<Vec<CredentialView>> {
    let user = parse_path(&user)?;
    let (reply, rx) = oneshot::channel();
    send_command_and_await(&state, NodeCommand::UserCredentials { user, reply }, rx).await
}

async fn handle_create_request(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<CreateRequestRequest>,
) -> ApiResult<RequestView> {
    let (reply, rx) = oneshot::channel();
    let cmd = NodeCommand::CreateProofRequest {
        caller: req.caller,
        params: req.request,
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_get_request(
    State(state): State<Arc<NodeState>>,
    Path(request_id): Path<String>,
) -> ApiResult<RequestView> {
    let request_id: Bytes32 = parse_path(&request_id)?;
    let (reply, rx) = oneshot::channel();
    send_command_and_await(&state, NodeCommand::GetProofRequest { request_id, reply }, rx).await
}

async fn handle_deactivate_request(
    State(state): State<Arc<NodeState>>,
    Path(request_id): Path<String>,
    Json(req): Json<CallerRequest>,
) -> ApiResult<RequestView> {
    let request_id: Bytes32 = parse_path(&request_id)?;
    let (reply, rx) = oneshot::channel();
    let cmd = NodeCommand::DeactivateRequest {
        caller: req.caller,
        request_id,
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_request_submissions(
    State(state): State<Arc<NodeState>>,
    Path(request_id): Path<String>,
) -> ApiResult<Vec<ProofSubmission>> {
    let request_id: Bytes32 = parse_path(&request_id)?;
    let (reply, rx) = oneshot::channel();
    send_command_and_await(&state, NodeCommand::RequestSubmissions { request_id, reply }, rx)
        .await
}

async fn handle_requester_requests(
    State(state): State<Arc<NodeState>>,
    Path(requester): Path<String>,
) -> ApiResult<Vec<RequestView>> {
    let requester = parse_path(&requester)?;
    let (reply, rx) = oneshot::channel();
    send_command_and_await(&state, NodeCommand::RequesterRequests { requester, reply }, rx).await
}

async fn handle_submit_proof(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<SubmitProofRequest>,
) -> ApiResult<ProofSubmission> {
    let (reply, rx) = oneshot::channel();
    let cmd = NodeCommand::SubmitProof {
        caller: req.caller,
        payload: req.payload,
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_get_submission(
    State(state): State<Arc<NodeState>>,
    Path(proof_id): Path<String>,
) -> ApiResult<ProofSubmission> {
    let proof_id: Bytes32 = parse_path(&proof_id)?;
    let (reply, rx) = oneshot::channel();
    send_command_and_await(&state, NodeCommand::GetProofSubmission { proof_id, reply }, rx).await
}

async fn handle_set_enabled(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<SetEnabledRequest>,
) -> ApiResult<LedgerStatus> {
    let (reply, rx) = oneshot::channel();
    let cmd = NodeCommand::SetVerificationEnabled {
        caller: req.caller,
        enabled: req.enabled,
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_set_expiry(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<SetExpiryRequest>,
) -> ApiResult<LedgerStatus> {
    let (reply, rx) = oneshot::channel();
    let cmd = NodeCommand::SetDefaultExpiry {
        caller: req.caller,
        seconds: req.seconds,
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_set_key(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<SetKeyRequest>,
) -> ApiResult<KeyResponse> {
    let (reply, rx) = oneshot::channel();
    let cmd = NodeCommand::SetVerificationKey {
        caller: req.caller,
        key: req.key,
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_registry_events(
    State(state): State<Arc<NodeState>>,
    Query(query): Query<EventQuery>,
) -> ApiResult<Vec<LogEntry<RegistryEvent>>> {
    let (reply, rx) = oneshot::channel();
    let cmd = NodeCommand::RegistryEvents {
        since: query.since,
        limit: query.limit(),
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

async fn handle_protocol_events(
    State(state): State<Arc<NodeState>>,
    Query(query): Query<EventQuery>,
) -> ApiResult<Vec<LogEntry<VerificationEvent>>> {
    let (reply, rx) = oneshot::channel();
    let cmd = NodeCommand::ProtocolEvents {
        since: query.since,
        limit: query.limit(),
        reply,
    };
    send_command_and_await(&state, cmd, rx).await
}

/// Helper to send a command and await the reply.
async fn send_command_and_await<T: Serialize>(
    state: &Arc<NodeState>,
    cmd: NodeCommand,
    reply_rx: oneshot::Receiver<Result<T, ApiError>>,
) -> ApiResult<T> {
    state.command_tx.send(cmd).await.map_err(|_| {
        error_response(ApiError::internal("node event loop not running"))
    })?;

    match reply_rx.await {
        Ok(Ok(resp)) => Ok(Json(resp)),
        Ok(Err(e)) => Err(error_response(e)),
        Err(_) => Err(error_response(ApiError::internal(
            "event loop dropped the reply channel",
        ))),
    }
}

// --- Server ---

pub fn build_router(state: Arc<NodeState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(handle_health))
        .route("/api/v1/status", get(handle_status))
        .route("/api/v1/issuers", post(handle_set_issuer))
        .route("/api/v1/issuers/{address}", get(handle_get_issuer))
        .route("/api/v1/credentials", post(handle_mint))
        .route("/api/v1/credentials/{token_id}", get(handle_get_credential))
        .route("/api/v1/credentials/{token_id}/revoke", post(handle_revoke))
        .route("/api/v1/credentials/{token_id}/transfer", post(handle_transfer))
        .route("/api/v1/credentials/{token_id}/approve", post(handle_approve))
        .route("/api/v1/users/{address}/credentials", get(handle_user_credentials))
        .route("/api/v1/requests", post(handle_create_request))
        .route("/api/v1/requests/{request_id}", get(handle_get_request))
        .route(
            "/api/v1/requests/{request_id}/deactivate",
            post(handle_deactivate_request),
        )
        .route(
            "/api/v1/requests/{request_id}/submissions",
            get(handle_request_submissions),
        )
        .route(
            "/api/v1/requesters/{address}/requests",
            get(handle_requester_requests),
        )
        .route("/api/v1/proofs", post(handle_submit_proof))
        .route("/api/v1/proofs/{proof_id}", get(handle_get_submission))
        .route("/api/v1/admin/verification", post(handle_set_enabled))
        .route("/api/v1/admin/default-expiry", post(handle_set_expiry))
        .route("/api/v1/admin/verification-key", post(handle_set_key))
        .route("/api/v1/events/registry", get(handle_registry_events))
        .route("/api/v1/events/protocol", get(handle_protocol_events))
        .with_state(state)
}

pub async fn serve(listener: TcpListener, state: Arc<NodeState>) -> anyhow::Result<()> {
    let app = build_router(state);
    axum::serve(listener, app).await?;
    Ok(())
}
