use crate::directory::RoomDirectory;
use crate::registry::{SessionRecord, SessionRegistry};
use greenroom_core::time::unix_ms_now;
use greenroom_core::{
    Ballot, BallotOutcome, BallotStatus, Error, ParticipantId, RequestSessionResponse, RoomId,
    Session, SessionId, SessionKind, SessionState, StopDisposition, TerminationMeta,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Whether requesting a session counts as the initiator's own grant.
/// The observed product behavior was inconsistent here, so it is explicit
/// configuration rather than an assumption.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InitiatorVote {
    /// The initiator's granted ballot is recorded at request time.
    Implicit,
    /// The initiator must cast a ballot like everyone else.
    Explicit,
}

#[derive(Debug, Clone, Copy)]
pub struct CoordinatorConfig {
    pub initiator_vote: InitiatorVote,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            initiator_vote: InitiatorVote::Implicit,
        }
    }
}

/// Drives the request → vote → activate/cancel lifecycle for sensitive
/// sessions. Unanimity from the online snapshot activates; a single deny
/// cancels immediately without waiting on the remaining voters. This is a
/// single authoritative tally under the registry's per-record locks, not a
/// distributed consensus protocol.
pub struct Coordinator {
    registry: Arc<SessionRegistry>,
    directory: Arc<dyn RoomDirectory>,
    config: CoordinatorConfig,
}

impl Coordinator {
    pub fn new(
        registry: Arc<SessionRegistry>,
        directory: Arc<dyn RoomDirectory>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            registry,
            directory,
            config,
        }
    }

    pub async fn request_session(
        &self,
        room_id: RoomId,
        initiator_id: ParticipantId,
        kind: SessionKind,
    ) -> Result<RequestSessionResponse, Error> {
        if !self.directory.room_exists(&room_id).await {
            return Err(Error::Validation(format!("unknown room {}", room_id)));
        }

        let snapshot = self.directory.online_participants(&room_id).await;
        if !snapshot.contains(&initiator_id) {
            return Err(Error::Validation(format!(
                "initiator {} is not online in room {}",
                initiator_id, room_id
            )));
        }

        // The record is inserted in `Requested` before claiming, so a racing
        // request that loses the claim leaves nothing pending behind.
        let session = Session::new(room_id.clone(), kind, initiator_id.clone());
        let session_id = session.id.clone();
        self.registry.insert(SessionRecord {
            session,
            snapshot: snapshot.clone(),
            ballots: HashMap::new(),
        });

        if self.registry.try_claim(&room_id, kind, &session_id).is_err() {
            if let Some(mut record) = self.registry.record_mut(&session_id) {
                record.session.transition(SessionState::Cancelled);
            }
            return Err(Error::Conflict(format!(
                "a {:?} session is already pending or active in room {}",
                kind, room_id
            )));
        }

        let outcome = {
            let mut record = self
                .registry
                .record_mut(&session_id)
                .ok_or_else(|| Error::NotFound(format!("session {}", session_id)))?;
            record.session.transition(SessionState::PendingPermission);
            info!(
                "Session {} ({:?}) awaiting permission from {} participants in room {}",
                session_id,
                kind,
                snapshot.len(),
                room_id
            );

            match self.config.initiator_vote {
                InitiatorVote::Implicit => {
                    Some(Self::tally(&mut record, initiator_id.clone(), true))
                }
                InitiatorVote::Explicit => None,
            }
        };

        // A one-participant room under the implicit policy activates at
        // request time; nothing to release in that case.
        if let Some(outcome) = outcome {
            debug_assert_ne!(outcome.status, BallotStatus::Cancelled);
        }

        Ok(RequestSessionResponse {
            session_id,
            online_participants: snapshot,
        })
    }

    pub async fn cast_ballot(
        &self,
        session_id: &SessionId,
        voter_id: ParticipantId,
        granted: bool,
    ) -> Result<BallotOutcome, Error> {
        let (outcome, room_id, kind) = {
            let mut record = self
                .registry
                .record_mut(session_id)
                .ok_or_else(|| Error::NotFound(format!("session {}", session_id)))?;

            if record.session.state != SessionState::PendingPermission {
                return Err(Error::InvalidState(format!(
                    "session {} is not awaiting permission",
                    session_id
                )));
            }
            if !record.snapshot.contains(&voter_id) {
                return Err(Error::Validation(format!(
                    "{} is not in the permission snapshot of session {}",
                    voter_id, session_id
                )));
            }

            let outcome = Self::tally(&mut record, voter_id, granted);
            (
                outcome,
                record.session.room_id.clone(),
                record.session.kind,
            )
        };

        // The record lock is released before touching the claim index.
        if outcome.status == BallotStatus::Cancelled {
            self.registry.release_claim(&room_id, kind, session_id);
        }
        Ok(outcome)
    }

    pub async fn stop_session(
        &self,
        session_id: &SessionId,
        requester_id: &ParticipantId,
        meta: TerminationMeta,
    ) -> Result<Session, Error> {
        let current = self
            .registry
            .session(session_id)
            .ok_or_else(|| Error::NotFound(format!("session {}", session_id)))?;

        if *requester_id != current.initiator_id
            && !self.directory.is_host(&current.room_id, requester_id).await
        {
            return Err(Error::PermissionDenied(format!(
                "{} is neither the initiator nor a host of room {}",
                requester_id, current.room_id
            )));
        }

        let stopped = {
            let mut record = self
                .registry
                .record_mut(session_id)
                .ok_or_else(|| Error::NotFound(format!("session {}", session_id)))?;

            if record.session.state != SessionState::Active {
                return Err(Error::InvalidState(format!(
                    "session {} is not active",
                    session_id
                )));
            }

            record.session.ended_at = Some(unix_ms_now());
            if let Some(reason) = meta.reason {
                record
                    .session
                    .metadata
                    .insert("stopReason".into(), reason.into());
            }
            let target = match meta.disposition {
                StopDisposition::Completed => SessionState::Completed,
                StopDisposition::Failed => SessionState::Failed,
            };
            record.session.transition(target);
            info!(
                "Session {} stopped by {} as {:?}",
                session_id, requester_id, target
            );
            record.session.clone()
        };

        self.registry
            .release_claim(&stopped.room_id, stopped.kind, session_id);
        Ok(stopped)
    }

    /// Upsert the ballot and settle the session if the tally is decisive.
    /// Transitions are no-ops when the session is already settled, so two
    /// callers completing the count concurrently cannot double-fire.
    fn tally(record: &mut SessionRecord, voter_id: ParticipantId, granted: bool) -> BallotOutcome {
        let session_id = record.session.id.clone();
        record.ballots.insert(
            voter_id.clone(),
            Ballot::new(session_id.clone(), voter_id, granted),
        );

        let status = if !granted {
            if record.session.transition(SessionState::Cancelled) {
                record.session.ended_at = Some(unix_ms_now());
                info!("Session {} cancelled by a denied ballot", session_id);
            }
            BallotStatus::Cancelled
        } else if record.granted_count() == record.snapshot.len() {
            if record.session.transition(SessionState::Active) {
                info!(
                    "Session {} active: all {} participants granted",
                    session_id,
                    record.snapshot.len()
                );
            }
            BallotStatus::Active
        } else {
            BallotStatus::Waiting
        };

        BallotOutcome {
            status,
            responses_received: record.ballots.len(),
            total_participants: record.snapshot.len(),
        }
    }
}
