use crate::model::ids::{ParticipantId, SessionId};
use crate::time::unix_ms_now;
use serde::{Deserialize, Serialize};

/// One participant's grant/deny vote on a pending session. Unique per
/// `(session_id, voter_id)`; a later cast overwrites an earlier one.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Ballot {
    pub session_id: SessionId,
    pub voter_id: ParticipantId,
    pub granted: bool,
    pub cast_at: u64,
}

impl Ballot {
    pub fn new(session_id: SessionId, voter_id: ParticipantId, granted: bool) -> Self {
        Self {
            session_id,
            voter_id,
            granted,
            cast_at: unix_ms_now(),
        }
    }
}
