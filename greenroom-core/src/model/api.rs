use crate::error::ErrorCode;
use crate::model::ids::{EnvelopeId, ParticipantId, RoomId, SessionId};
use crate::model::session::SessionKind;
use crate::model::signal::SignalEnvelope;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SendSignalResponse {
    pub ok: bool,
    pub envelope_id: EnvelopeId,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveResponse {
    pub envelopes: Vec<SignalEnvelope>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RequestSessionRequest {
    pub room_id: RoomId,
    pub initiator_id: ParticipantId,
    pub kind: SessionKind,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RequestSessionResponse {
    pub session_id: SessionId,
    pub online_participants: Vec<ParticipantId>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CastBallotRequest {
    pub voter_id: ParticipantId,
    pub granted: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BallotStatus {
    Waiting,
    Active,
    Cancelled,
}

/// What a voter learns from casting: where the tally stands and whether the
/// session settled.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BallotOutcome {
    pub status: BallotStatus,
    pub responses_received: usize,
    pub total_participants: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum StopDisposition {
    Completed,
    Failed,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TerminationMeta {
    pub disposition: StopDisposition,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StopSessionRequest {
    pub requester_id: ParticipantId,
    #[serde(flatten)]
    pub meta: TerminationMeta,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
}
