use anyhow::{Context, Result};
use clap::Parser;
use greenroom_core::{ParticipantId, RoomId};
use greenroom_server::{
    AppState, Coordinator, CoordinatorConfig, InitiatorVote, MemoryEnvelopeStore, RelayConfig,
    RoomDirectory, SessionRegistry, SignalingRelay, StaticDirectory, router, spawn_sweeper,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "greenroom-server")]
#[command(about = "Consent-gated signaling server for room media sessions")]
struct Args {
    #[arg(long, default_value = "127.0.0.1:4000")]
    bind: SocketAddr,

    /// Envelope TTL in seconds.
    #[arg(long, default_value_t = 300)]
    envelope_ttl: u64,

    /// Expiry sweep interval in seconds.
    #[arg(long, default_value_t = 30)]
    sweep_interval: u64,

    /// Require the initiator to cast a ballot like everyone else instead of
    /// counting the request itself as a grant.
    #[arg(long)]
    explicit_initiator_vote: bool,

    /// Rooms to serve.
    #[arg(long = "room")]
    rooms: Vec<Uuid>,

    /// Online participants, as room-uuid:participant-uuid pairs. The first
    /// participant listed for a room becomes its host.
    #[arg(long = "participant", value_parser = parse_membership)]
    participants: Vec<(Uuid, Uuid)>,
}

fn parse_membership(raw: &str) -> Result<(Uuid, Uuid), String> {
    let (room, participant) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected room-uuid:participant-uuid, got {raw}"))?;
    let room = room.parse().map_err(|e| format!("bad room uuid: {e}"))?;
    let participant = participant
        .parse()
        .map_err(|e| format!("bad participant uuid: {e}"))?;
    Ok((room, participant))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let directory = Arc::new(StaticDirectory::new());
    for room in &args.rooms {
        directory.add_room(RoomId(*room));
    }
    for (room, participant) in &args.participants {
        let room = RoomId(*room);
        let participant = ParticipantId(*participant);
        if !directory.online_participants(&room).await.is_empty() {
            directory.set_online(&room, participant, true);
        } else {
            directory.set_host(&room, participant.clone());
            directory.set_online(&room, participant, true);
        }
    }

    let store = Arc::new(MemoryEnvelopeStore::new());
    let _sweeper = spawn_sweeper(store.clone(), Duration::from_secs(args.sweep_interval));

    let registry = Arc::new(SessionRegistry::new());
    let relay = SignalingRelay::new(
        store,
        directory.clone(),
        RelayConfig {
            envelope_ttl: Duration::from_secs(args.envelope_ttl),
        },
    );
    let coordinator = Coordinator::new(
        registry.clone(),
        directory,
        CoordinatorConfig {
            initiator_vote: if args.explicit_initiator_vote {
                InitiatorVote::Explicit
            } else {
                InitiatorVote::Implicit
            },
        },
    );

    let app = router(Arc::new(AppState {
        relay,
        coordinator,
        registry,
    }));

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!("Greenroom server listening on http://{}", args.bind);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
