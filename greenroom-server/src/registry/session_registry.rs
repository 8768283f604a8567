use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use dashmap::mapref::one::RefMut;
use greenroom_core::{Ballot, ParticipantId, RoomId, Session, SessionId, SessionKind, SessionState};
use std::collections::HashMap;

/// A session plus everything the consensus protocol needs to settle it: the
/// online snapshot taken at request time and the ballots cast against it.
pub struct SessionRecord {
    pub session: Session,
    pub snapshot: Vec<ParticipantId>,
    pub ballots: HashMap<ParticipantId, Ballot>,
}

impl SessionRecord {
    pub fn granted_count(&self) -> usize {
        self.ballots.values().filter(|b| b.granted).count()
    }
}

/// All session records plus a `(room, kind) → session` claim index. The
/// claim index is the mutual-exclusion primitive: its per-entry lock
/// serializes concurrent requests for the same room and kind.
///
/// Records are never deleted; sessions are kept for history, and the claim
/// logic relies on every claimed id resolving to a record.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, SessionRecord>,
    claims: DashMap<(RoomId, SessionKind), SessionId>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: SessionRecord) {
        self.sessions.insert(record.session.id.clone(), record);
    }

    /// Claim `(room, kind)` for `candidate`. Fails with the current holder
    /// while that holder is still pending or active; a settled holder is
    /// silently replaced. The candidate's record must already be inserted.
    pub fn try_claim(
        &self,
        room: &RoomId,
        kind: SessionKind,
        candidate: &SessionId,
    ) -> Result<(), SessionId> {
        match self.claims.entry((room.clone(), kind)) {
            Entry::Occupied(mut entry) => {
                let holder = entry.get().clone();
                let live = self
                    .sessions
                    .get(&holder)
                    .map(|r| {
                        matches!(
                            r.session.state,
                            SessionState::PendingPermission | SessionState::Active
                        )
                    })
                    .unwrap_or(false);
                if live {
                    return Err(holder);
                }
                entry.insert(candidate.clone());
                Ok(())
            }
            Entry::Vacant(entry) => {
                entry.insert(candidate.clone());
                Ok(())
            }
        }
    }

    /// Drop the claim, but only if `holder` still owns it. Callers must not
    /// hold a record reference while calling this.
    pub fn release_claim(&self, room: &RoomId, kind: SessionKind, holder: &SessionId) {
        self.claims
            .remove_if(&(room.clone(), kind), |_, claimed| claimed == holder);
    }

    /// The `Active` session of this kind in the room, if any. Late joiners
    /// use this to discover an in-progress session without having voted.
    pub fn active_session_of(&self, room: &RoomId, kind: SessionKind) -> Option<Session> {
        let holder = {
            let claimed = self.claims.get(&(room.clone(), kind))?;
            claimed.clone()
        };
        let record = self.sessions.get(&holder)?;
        (record.session.state == SessionState::Active).then(|| record.session.clone())
    }

    pub fn session(&self, id: &SessionId) -> Option<Session> {
        self.sessions.get(id).map(|r| r.session.clone())
    }

    /// Exclusive access to one record; every state transition goes through
    /// this lock. Do not touch the claim index while holding the result.
    pub(crate) fn record_mut(
        &self,
        id: &SessionId,
    ) -> Option<RefMut<'_, SessionId, SessionRecord>> {
        self.sessions.get_mut(id)
    }
}
