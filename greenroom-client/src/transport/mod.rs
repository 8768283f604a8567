mod http;

pub use http::{HttpRelayTransport, SessionApi};

use async_trait::async_trait;
use greenroom_core::{NewSignal, ParticipantId, RoomId, SignalEnvelope};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// The relay rejected the operation; never retried.
    #[error("api error: {0}")]
    Api(#[from] greenroom_core::Error),

    /// The transport itself failed (connection refused, bad body, ...).
    #[error("transport failure: {0}")]
    Io(String),
}

/// How a manager reaches the signaling relay. The reference transport is
/// JSON over HTTP; a push-based one may replace it as long as at-most-once
/// delivery and TTL expiry hold.
#[async_trait]
pub trait SignalTransport: Send + Sync {
    async fn send(&self, room: &RoomId, signal: NewSignal) -> Result<(), TransportError>;

    /// Consuming poll of the local participant's mailbox.
    async fn receive(
        &self,
        room: &RoomId,
        peer: &ParticipantId,
    ) -> Result<Vec<SignalEnvelope>, TransportError>;
}
