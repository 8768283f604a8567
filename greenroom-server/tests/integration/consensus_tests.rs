use greenroom_core::{
    BallotStatus, Error, ParticipantId, RoomId, SessionKind, SessionState, StopDisposition,
    TerminationMeta,
};
use greenroom_server::{
    Coordinator, CoordinatorConfig, InitiatorVote, SessionRegistry, StaticDirectory,
};
use std::sync::Arc;

use crate::integration::init_tracing;
use crate::utils::TestStack;

fn completed() -> TerminationMeta {
    TerminationMeta {
        disposition: StopDisposition::Completed,
        reason: None,
    }
}

#[tokio::test]
async fn unanimity_activates_after_every_grant() {
    init_tracing();
    let stack = TestStack::new(InitiatorVote::Implicit);

    let response = stack
        .coordinator
        .request_session(
            stack.room.clone(),
            stack.peer_a.clone(),
            SessionKind::ScreenShare,
        )
        .await
        .expect("request should succeed");
    assert_eq!(response.online_participants.len(), 3);

    let session_id = response.session_id;
    let outcome = stack
        .coordinator
        .cast_ballot(&session_id, stack.host.clone(), true)
        .await
        .expect("host ballot should be accepted");
    assert_eq!(outcome.status, BallotStatus::Waiting);
    assert_eq!(outcome.responses_received, 2);
    assert_eq!(outcome.total_participants, 3);

    // still pending, so late joiners see no active session yet
    assert!(
        stack
            .registry
            .active_session_of(&stack.room, SessionKind::ScreenShare)
            .is_none()
    );

    let outcome = stack
        .coordinator
        .cast_ballot(&session_id, stack.peer_b.clone(), true)
        .await
        .expect("final ballot should be accepted");
    assert_eq!(outcome.status, BallotStatus::Active);

    let active = stack
        .registry
        .active_session_of(&stack.room, SessionKind::ScreenShare)
        .expect("session should be discoverable once active");
    assert_eq!(active.id, session_id);
    assert_eq!(active.state, SessionState::Active);
}

#[tokio::test]
async fn single_deny_cancels_without_waiting() {
    init_tracing();
    let stack = TestStack::new(InitiatorVote::Implicit);

    let response = stack
        .coordinator
        .request_session(
            stack.room.clone(),
            stack.peer_a.clone(),
            SessionKind::ScreenShare,
        )
        .await
        .expect("request should succeed");
    let session_id = response.session_id;

    stack
        .coordinator
        .cast_ballot(&session_id, stack.host.clone(), true)
        .await
        .expect("grant should be accepted");

    // peer_b denies; the session settles immediately, host's grant and the
    // missing votes notwithstanding
    let outcome = stack
        .coordinator
        .cast_ballot(&session_id, stack.peer_b.clone(), false)
        .await
        .expect("deny should be accepted");
    assert_eq!(outcome.status, BallotStatus::Cancelled);

    let session = stack.registry.session(&session_id).expect("session exists");
    assert_eq!(session.state, SessionState::Cancelled);
    assert!(session.ended_at.is_some());

    // no further ballots are accepted
    let err = stack
        .coordinator
        .cast_ballot(&session_id, stack.host.clone(), true)
        .await
        .expect_err("ballot on a settled session must fail");
    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn concurrent_requests_admit_exactly_one() {
    init_tracing();
    let stack = TestStack::new(InitiatorVote::Implicit);

    let (first, second) = tokio::join!(
        stack.coordinator.request_session(
            stack.room.clone(),
            stack.peer_a.clone(),
            SessionKind::Recording,
        ),
        stack.coordinator.request_session(
            stack.room.clone(),
            stack.peer_b.clone(),
            SessionKind::Recording,
        ),
    );

    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one request may win the claim");
    let conflict = if first.is_err() { first } else { second };
    assert!(matches!(conflict, Err(Error::Conflict(_))));
}

#[tokio::test]
async fn different_kinds_do_not_conflict() {
    init_tracing();
    let stack = TestStack::new(InitiatorVote::Implicit);

    stack
        .coordinator
        .request_session(
            stack.room.clone(),
            stack.peer_a.clone(),
            SessionKind::ScreenShare,
        )
        .await
        .expect("screen share request should succeed");
    stack
        .coordinator
        .request_session(
            stack.room.clone(),
            stack.peer_a.clone(),
            SessionKind::Recording,
        )
        .await
        .expect("a recording may be requested while a screen share is pending");
}

#[tokio::test]
async fn repeated_ballots_do_not_double_count() {
    init_tracing();
    let stack = TestStack::new(InitiatorVote::Implicit);

    let session_id = stack
        .coordinator
        .request_session(
            stack.room.clone(),
            stack.peer_a.clone(),
            SessionKind::ScreenShare,
        )
        .await
        .expect("request should succeed")
        .session_id;

    let first = stack
        .coordinator
        .cast_ballot(&session_id, stack.host.clone(), true)
        .await
        .expect("ballot should be accepted");
    let second = stack
        .coordinator
        .cast_ballot(&session_id, stack.host.clone(), true)
        .await
        .expect("re-cast should be accepted");

    assert_eq!(first.status, BallotStatus::Waiting);
    assert_eq!(second.status, BallotStatus::Waiting);
    assert_eq!(
        first.responses_received, second.responses_received,
        "re-casting must not move the tally"
    );

    let outcome = stack
        .coordinator
        .cast_ballot(&session_id, stack.peer_b.clone(), true)
        .await
        .expect("final ballot should be accepted");
    assert_eq!(outcome.status, BallotStatus::Active);
}

#[tokio::test]
async fn voter_outside_snapshot_is_rejected() {
    init_tracing();
    let stack = TestStack::new(InitiatorVote::Implicit);

    let session_id = stack
        .coordinator
        .request_session(
            stack.room.clone(),
            stack.peer_a.clone(),
            SessionKind::ScreenShare,
        )
        .await
        .expect("request should succeed")
        .session_id;

    let outsider = ParticipantId::new();
    let err = stack
        .coordinator
        .cast_ballot(&session_id, outsider, true)
        .await
        .expect_err("a voter outside the snapshot must be rejected");
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn ballot_on_unknown_session_is_not_found() {
    init_tracing();
    let stack = TestStack::new(InitiatorVote::Implicit);

    let err = stack
        .coordinator
        .cast_ballot(
            &greenroom_core::SessionId::new(),
            stack.peer_a.clone(),
            true,
        )
        .await
        .expect_err("unknown session must fail");
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn request_from_unknown_room_is_rejected() {
    init_tracing();
    let stack = TestStack::new(InitiatorVote::Implicit);

    let err = stack
        .coordinator
        .request_session(RoomId::new(), stack.peer_a.clone(), SessionKind::ScreenShare)
        .await
        .expect_err("unknown room must fail");
    assert!(matches!(err, Error::Validation(_)));
}

/// Two-participant Recording, the initiator's request counting as a grant:
/// the other participant's single grant activates the session.
#[tokio::test]
async fn two_party_recording_activates_on_single_grant_under_implicit_policy() {
    init_tracing();
    let (coordinator, registry, room, initiator, other) = two_party(InitiatorVote::Implicit);

    let session_id = coordinator
        .request_session(room.clone(), initiator, SessionKind::Recording)
        .await
        .expect("request should succeed")
        .session_id;

    let outcome = coordinator
        .cast_ballot(&session_id, other, true)
        .await
        .expect("ballot should be accepted");
    assert_eq!(outcome.status, BallotStatus::Active);
    assert!(
        registry
            .active_session_of(&room, SessionKind::Recording)
            .is_some()
    );
}

/// Under the explicit policy the initiator must vote too.
#[tokio::test]
async fn two_party_recording_waits_for_initiator_under_explicit_policy() {
    init_tracing();
    let (coordinator, _registry, room, initiator, other) = two_party(InitiatorVote::Explicit);

    let session_id = coordinator
        .request_session(room.clone(), initiator.clone(), SessionKind::Recording)
        .await
        .expect("request should succeed")
        .session_id;

    let outcome = coordinator
        .cast_ballot(&session_id, other, true)
        .await
        .expect("ballot should be accepted");
    assert_eq!(outcome.status, BallotStatus::Waiting);

    let outcome = coordinator
        .cast_ballot(&session_id, initiator, true)
        .await
        .expect("initiator ballot should be accepted");
    assert_eq!(outcome.status, BallotStatus::Active);
}

#[tokio::test]
async fn lone_participant_activates_at_request_time_under_implicit_policy() {
    init_tracing();
    let directory = Arc::new(StaticDirectory::new());
    let room = RoomId::new();
    directory.add_room(room.clone());
    let only = ParticipantId::new();
    directory.set_online(&room, only.clone(), true);

    let registry = Arc::new(SessionRegistry::new());
    let coordinator = Coordinator::new(
        registry.clone(),
        directory,
        CoordinatorConfig {
            initiator_vote: InitiatorVote::Implicit,
        },
    );

    let session_id = coordinator
        .request_session(room.clone(), only, SessionKind::ScreenShare)
        .await
        .expect("request should succeed")
        .session_id;

    let session = registry.session(&session_id).expect("session exists");
    assert_eq!(session.state, SessionState::Active);
}

#[tokio::test]
async fn stop_is_limited_to_initiator_and_host() {
    init_tracing();
    let stack = TestStack::new(InitiatorVote::Implicit);
    let session_id = activated_session(&stack, SessionKind::Recording).await;

    let err = stack
        .coordinator
        .stop_session(&session_id, &stack.peer_b, completed())
        .await
        .expect_err("a plain participant must not stop the session");
    assert!(matches!(err, Error::PermissionDenied(_)));

    // the host did not initiate, but may stop
    let session = stack
        .coordinator
        .stop_session(&session_id, &stack.host, completed())
        .await
        .expect("host stop should succeed");
    assert_eq!(session.state, SessionState::Completed);
    assert!(session.ended_at.is_some());
}

#[tokio::test]
async fn stop_records_disposition_and_reason() {
    init_tracing();
    let stack = TestStack::new(InitiatorVote::Implicit);
    let session_id = activated_session(&stack, SessionKind::Recording).await;

    let session = stack
        .coordinator
        .stop_session(
            &session_id,
            &stack.peer_a,
            TerminationMeta {
                disposition: StopDisposition::Failed,
                reason: Some("disk full".into()),
            },
        )
        .await
        .expect("initiator stop should succeed");
    assert_eq!(session.state, SessionState::Failed);
    assert_eq!(
        session.metadata.get("stopReason").and_then(|v| v.as_str()),
        Some("disk full")
    );

    let err = stack
        .coordinator
        .stop_session(&session_id, &stack.peer_a, completed())
        .await
        .expect_err("stopping twice must fail");
    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn room_is_free_again_after_cancel_and_after_stop() {
    init_tracing();
    let stack = TestStack::new(InitiatorVote::Implicit);

    // denied request releases the room
    let session_id = stack
        .coordinator
        .request_session(
            stack.room.clone(),
            stack.peer_a.clone(),
            SessionKind::ScreenShare,
        )
        .await
        .expect("request should succeed")
        .session_id;
    stack
        .coordinator
        .cast_ballot(&session_id, stack.host.clone(), false)
        .await
        .expect("deny should be accepted");

    let session_id = activated_session(&stack, SessionKind::ScreenShare).await;
    stack
        .coordinator
        .stop_session(&session_id, &stack.peer_a, completed())
        .await
        .expect("stop should succeed");

    stack
        .coordinator
        .request_session(
            stack.room.clone(),
            stack.peer_b.clone(),
            SessionKind::ScreenShare,
        )
        .await
        .expect("the room must be requestable again after a stop");
}

/// Request as peer_a and collect every remaining grant.
async fn activated_session(stack: &TestStack, kind: SessionKind) -> greenroom_core::SessionId {
    let session_id = stack
        .coordinator
        .request_session(stack.room.clone(), stack.peer_a.clone(), kind)
        .await
        .expect("request should succeed")
        .session_id;
    for voter in [&stack.host, &stack.peer_b] {
        stack
            .coordinator
            .cast_ballot(&session_id, voter.clone(), true)
            .await
            .expect("grant should be accepted");
    }
    let session = stack.registry.session(&session_id).expect("session exists");
    assert_eq!(session.state, SessionState::Active);
    session_id
}

fn two_party(
    policy: InitiatorVote,
) -> (
    Coordinator,
    Arc<SessionRegistry>,
    RoomId,
    ParticipantId,
    ParticipantId,
) {
    let directory = Arc::new(StaticDirectory::new());
    let room = RoomId::new();
    directory.add_room(room.clone());
    let initiator = ParticipantId::new();
    let other = ParticipantId::new();
    directory.set_online(&room, initiator.clone(), true);
    directory.set_online(&room, other.clone(), true);

    let registry = Arc::new(SessionRegistry::new());
    let coordinator = Coordinator::new(
        registry.clone(),
        directory,
        CoordinatorConfig {
            initiator_vote: policy,
        },
    );
    (coordinator, registry, room, initiator, other)
}
