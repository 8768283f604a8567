use crate::model::ids::{ParticipantId, RoomId, SessionId};
use crate::time::unix_ms_now;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum SessionKind {
    ScreenShare,
    Recording,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Requested,
    PendingPermission,
    Active,
    Cancelled,
    Completed,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Cancelled | SessionState::Completed | SessionState::Failed
        )
    }
}

/// A screen-share or recording activity with a lifecycle independent of any
/// single peer connection. Records are kept for history and never deleted.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub room_id: RoomId,
    pub kind: SessionKind,
    pub initiator_id: ParticipantId,
    pub state: SessionState,
    pub created_at: u64,
    pub ended_at: Option<u64>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Session {
    pub fn new(room_id: RoomId, kind: SessionKind, initiator_id: ParticipantId) -> Self {
        Self {
            id: SessionId::new(),
            room_id,
            kind,
            initiator_id,
            state: SessionState::Requested,
            created_at: unix_ms_now(),
            ended_at: None,
            metadata: Map::new(),
        }
    }

    /// Move to `to`, returning whether anything changed. Re-entering the
    /// current state is a no-op, which keeps concurrent completions of the
    /// same transition harmless.
    pub fn transition(&mut self, to: SessionState) -> bool {
        if self.state == to {
            return false;
        }
        self.state = to;
        true
    }
}
