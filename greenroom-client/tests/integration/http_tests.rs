use greenroom_client::transport::{HttpRelayTransport, SessionApi};
use greenroom_client::{SignalTransport, TransportError};
use greenroom_core::{
    BallotStatus, CastBallotRequest, Error, NewSignal, ParticipantId, RequestSessionRequest,
    RoomId, SessionKind, SessionState, SignalKind, StopDisposition, StopSessionRequest,
    TerminationMeta,
};
use greenroom_server::{
    AppState, Coordinator, CoordinatorConfig, InitiatorVote, MemoryEnvelopeStore, RelayConfig,
    SessionRegistry, SignalingRelay, StaticDirectory, router,
};
use serde_json::json;
use std::sync::Arc;

use crate::integration::init_tracing;

struct Server {
    base: String,
    room: RoomId,
    peer_a: ParticipantId,
    peer_b: ParticipantId,
}

/// Serve the real router on an ephemeral port, with a two-participant room
/// where `peer_a` is the host.
async fn spawn_server(initiator_vote: InitiatorVote) -> Server {
    let directory = Arc::new(StaticDirectory::new());
    let room = RoomId::new();
    directory.add_room(room.clone());
    let peer_a = ParticipantId::new();
    let peer_b = ParticipantId::new();
    directory.set_host(&room, peer_a.clone());
    directory.set_online(&room, peer_a.clone(), true);
    directory.set_online(&room, peer_b.clone(), true);

    let store = Arc::new(MemoryEnvelopeStore::new());
    let registry = Arc::new(SessionRegistry::new());
    let relay = SignalingRelay::new(store, directory.clone(), RelayConfig::default());
    let coordinator = Coordinator::new(
        registry.clone(),
        directory,
        CoordinatorConfig { initiator_vote },
    );

    let app = router(Arc::new(AppState {
        relay,
        coordinator,
        registry,
    }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral bind should succeed");
    let addr = listener.local_addr().expect("listener has an address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Server {
        base: format!("http://{addr}"),
        room,
        peer_a,
        peer_b,
    }
}

#[tokio::test]
async fn full_session_lifecycle_over_http() {
    init_tracing();
    let server = spawn_server(InitiatorVote::Implicit).await;
    let sessions = SessionApi::new(server.base.clone());

    // request: pending, snapshot of both participants
    let response = sessions
        .request_session(&RequestSessionRequest {
            room_id: server.room.clone(),
            initiator_id: server.peer_a.clone(),
            kind: SessionKind::Recording,
        })
        .await
        .expect("request should succeed");
    assert_eq!(response.online_participants.len(), 2);

    assert!(
        sessions
            .active_session(&server.room, SessionKind::Recording)
            .await
            .expect("lookup should succeed")
            .is_none(),
        "a pending session is not discoverable"
    );

    // a second request conflicts
    let err = sessions
        .request_session(&RequestSessionRequest {
            room_id: server.room.clone(),
            initiator_id: server.peer_b.clone(),
            kind: SessionKind::Recording,
        })
        .await
        .expect_err("conflicting request must fail");
    assert!(matches!(err, TransportError::Api(Error::Conflict(_))));

    // peer_b grants; implicit initiator vote completes unanimity
    let outcome = sessions
        .cast_ballot(
            &response.session_id,
            &CastBallotRequest {
                voter_id: server.peer_b.clone(),
                granted: true,
            },
        )
        .await
        .expect("ballot should be accepted");
    assert_eq!(outcome.status, BallotStatus::Active);
    assert_eq!(outcome.total_participants, 2);

    let active = sessions
        .active_session(&server.room, SessionKind::Recording)
        .await
        .expect("lookup should succeed")
        .expect("the session is now discoverable");
    assert_eq!(active.id, response.session_id);

    // only initiator or host may stop; peer_b is neither
    let err = sessions
        .stop_session(
            &response.session_id,
            &StopSessionRequest {
                requester_id: server.peer_b.clone(),
                meta: TerminationMeta {
                    disposition: StopDisposition::Completed,
                    reason: None,
                },
            },
        )
        .await
        .expect_err("peer_b must not stop the session");
    assert!(matches!(
        err,
        TransportError::Api(Error::PermissionDenied(_))
    ));

    let stopped = sessions
        .stop_session(
            &response.session_id,
            &StopSessionRequest {
                requester_id: server.peer_a.clone(),
                meta: TerminationMeta {
                    disposition: StopDisposition::Completed,
                    reason: Some("done".into()),
                },
            },
        )
        .await
        .expect("initiator stop should succeed");
    assert_eq!(stopped.state, SessionState::Completed);
    assert!(stopped.ended_at.is_some());
}

#[tokio::test]
async fn relay_round_trip_over_http() {
    init_tracing();
    let server = spawn_server(InitiatorVote::Implicit).await;
    let relay = HttpRelayTransport::new(server.base.clone());

    relay
        .send(
            &server.room,
            NewSignal {
                from_peer: server.peer_a.clone(),
                to_peer: server.peer_b.clone(),
                kind: SignalKind::Offer,
                payload: json!({ "sdp": "v=0" }),
            },
        )
        .await
        .expect("send should succeed");

    let envelopes = relay
        .receive(&server.room, &server.peer_b)
        .await
        .expect("receive should succeed");
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].kind, SignalKind::Offer);
    assert_eq!(envelopes[0].from_peer, server.peer_a);
    assert_eq!(
        envelopes[0].payload.get("sdp").and_then(|v| v.as_str()),
        Some("v=0")
    );

    // consumed: the second poll is empty
    assert!(
        relay
            .receive(&server.room, &server.peer_b)
            .await
            .expect("receive should succeed")
            .is_empty()
    );
}

#[tokio::test]
async fn relay_send_surfaces_validation_errors() {
    init_tracing();
    let server = spawn_server(InitiatorVote::Implicit).await;
    let relay = HttpRelayTransport::new(server.base.clone());

    let err = relay
        .send(
            &server.room,
            NewSignal {
                from_peer: server.peer_a.clone(),
                to_peer: server.peer_a.clone(),
                kind: SignalKind::Offer,
                payload: json!({}),
            },
        )
        .await
        .expect_err("self-addressed send must fail");
    assert!(matches!(err, TransportError::Api(Error::Validation(_))));
}
