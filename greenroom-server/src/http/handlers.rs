use crate::http::app::AppState;
use crate::http::error::ApiError;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use greenroom_core::{
    BallotOutcome, CastBallotRequest, NewSignal, ParticipantId, ReceiveResponse,
    RequestSessionRequest, RequestSessionResponse, RoomId, SendSignalResponse, Session, SessionId,
    SessionKind, StopSessionRequest,
};
use std::sync::Arc;

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn send_signal(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<RoomId>,
    Json(signal): Json<NewSignal>,
) -> Result<Json<SendSignalResponse>, ApiError> {
    let envelope = state.relay.send(room_id, signal).await?;
    Ok(Json(SendSignalResponse {
        ok: true,
        envelope_id: envelope.id,
    }))
}

pub async fn receive_signals(
    State(state): State<Arc<AppState>>,
    Path((room_id, peer_id)): Path<(RoomId, ParticipantId)>,
) -> Json<ReceiveResponse> {
    let envelopes = state.relay.receive(&room_id, &peer_id).await;
    Json(ReceiveResponse { envelopes })
}

pub async fn request_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RequestSessionRequest>,
) -> Result<Json<RequestSessionResponse>, ApiError> {
    let response = state
        .coordinator
        .request_session(req.room_id, req.initiator_id, req.kind)
        .await?;
    Ok(Json(response))
}

pub async fn cast_ballot(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<SessionId>,
    Json(req): Json<CastBallotRequest>,
) -> Result<Json<BallotOutcome>, ApiError> {
    let outcome = state
        .coordinator
        .cast_ballot(&session_id, req.voter_id, req.granted)
        .await?;
    Ok(Json(outcome))
}

pub async fn stop_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<SessionId>,
    Json(req): Json<StopSessionRequest>,
) -> Result<Json<Session>, ApiError> {
    let session = state
        .coordinator
        .stop_session(&session_id, &req.requester_id, req.meta)
        .await?;
    Ok(Json(session))
}

pub async fn active_session(
    State(state): State<Arc<AppState>>,
    Path((room_id, kind)): Path<(RoomId, SessionKind)>,
) -> Response {
    match state.registry.active_session_of(&room_id, kind) {
        Some(session) => Json(session).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
