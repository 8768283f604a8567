use crate::directory::RoomDirectory;
use crate::store::EnvelopeStore;
use greenroom_core::time::unix_ms_now;
use greenroom_core::{EnvelopeId, Error, NewSignal, ParticipantId, RoomId, SignalEnvelope};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct RelayConfig {
    pub envelope_ttl: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            envelope_ttl: Duration::from_secs(300),
        }
    }
}

/// Store-and-forward exchange of negotiation envelopes between peers that
/// have no direct channel yet. Delivery is at-most-once: an envelope that is
/// not polled before its TTL is gone, indistinguishable from never sent.
/// Negotiation retries, not relay redelivery, are the recovery mechanism.
pub struct SignalingRelay {
    store: Arc<dyn EnvelopeStore>,
    directory: Arc<dyn RoomDirectory>,
    config: RelayConfig,
}

impl SignalingRelay {
    pub fn new(
        store: Arc<dyn EnvelopeStore>,
        directory: Arc<dyn RoomDirectory>,
        config: RelayConfig,
    ) -> Self {
        Self {
            store,
            directory,
            config,
        }
    }

    pub async fn send(&self, room_id: RoomId, signal: NewSignal) -> Result<SignalEnvelope, Error> {
        if signal.from_peer == signal.to_peer {
            return Err(Error::Validation(
                "envelope addressed to its own sender".into(),
            ));
        }
        if !self.directory.room_exists(&room_id).await {
            return Err(Error::Validation(format!("unknown room {}", room_id)));
        }

        let created_at = unix_ms_now();
        let envelope = SignalEnvelope {
            id: EnvelopeId::new(),
            room_id,
            from_peer: signal.from_peer,
            to_peer: signal.to_peer,
            kind: signal.kind,
            payload: signal.payload,
            created_at,
            expires_at: created_at + self.config.envelope_ttl.as_millis() as u64,
        };

        debug!(
            "Relaying {:?} from {} to {}",
            envelope.kind, envelope.from_peer, envelope.to_peer
        );
        self.store
            .insert(envelope.clone(), self.config.envelope_ttl)
            .await;
        Ok(envelope)
    }

    /// Consuming poll: everything addressed to `peer_id`, oldest first, is
    /// returned once and deleted in the same operation.
    pub async fn receive(&self, room_id: &RoomId, peer_id: &ParticipantId) -> Vec<SignalEnvelope> {
        self.store.take_for(room_id, peer_id).await
    }
}
