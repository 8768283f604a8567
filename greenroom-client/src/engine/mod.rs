mod webrtc_engine;

pub use webrtc_engine::{EngineSettings, WebRtcEngine};

use async_trait::async_trait;
use greenroom_core::ParticipantId;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Capture-permission failures are terminal; only an explicit user
    /// action retries them.
    #[error("media permission denied: {0}")]
    PermissionDenied(String),

    /// Transient negotiation failures, subject to the reconnect policy.
    #[error("negotiation failed: {0}")]
    Negotiation(String),
}

/// What the engine reports back about one remote peer.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A live media path was established.
    PathLive(ParticipantId),
    /// The media path dropped or the remote track ended.
    PathLost(ParticipantId),
    /// A local ICE candidate to forward to the remote peer.
    Candidate(ParticipantId, String),
}

/// One negotiation handle per remote peer.
#[async_trait]
pub trait MediaSession: Send + Sync {
    async fn create_offer(&self) -> Result<String, EngineError>;

    /// Apply a remote offer and produce the local answer.
    async fn accept_offer(&self, sdp: String) -> Result<String, EngineError>;

    async fn accept_answer(&self, sdp: String) -> Result<(), EngineError>;

    async fn add_remote_candidate(&self, candidate: String) -> Result<(), EngineError>;

    /// Stop local media for this peer and release the connection.
    async fn close(&self);
}

/// The underlying media-negotiation engine. The manager treats it as a black
/// box that consumes offers/answers/candidates and reports path liveness.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    async fn open_session(
        &self,
        remote: ParticipantId,
        events: mpsc::Sender<EngineEvent>,
    ) -> Result<Arc<dyn MediaSession>, EngineError>;
}
