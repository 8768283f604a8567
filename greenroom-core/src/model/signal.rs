use crate::model::ids::{EnvelopeId, ParticipantId, RoomId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
}

/// One addressed, TTL-bounded negotiation message. The payload is opaque to
/// the relay; only the addressed receiver interprets it, and it is consumed
/// exactly once or expires unread.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SignalEnvelope {
    pub id: EnvelopeId,
    pub room_id: RoomId,
    pub from_peer: ParticipantId,
    pub to_peer: ParticipantId,
    pub kind: SignalKind,
    pub payload: Value,
    pub created_at: u64,
    pub expires_at: u64,
}

/// Sender-side input to `relay.send`; the relay stamps id and timestamps.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewSignal {
    pub from_peer: ParticipantId,
    pub to_peer: ParticipantId,
    pub kind: SignalKind,
    pub payload: Value,
}
