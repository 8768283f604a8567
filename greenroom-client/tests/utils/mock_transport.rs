use async_trait::async_trait;
use greenroom_client::{SignalTransport, TransportError};
use greenroom_core::time::unix_ms_now;
use greenroom_core::{EnvelopeId, NewSignal, ParticipantId, RoomId, SignalEnvelope, SignalKind};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;

/// One captured outbound signal, stamped with the virtual send time.
pub struct SentSignal {
    pub at: Instant,
    pub signal: NewSignal,
}

/// In-memory stand-in for the relay: outbound signals go to a channel the
/// test reads, inbound envelopes are queued for the manager's next poll.
pub struct MockTransport {
    sent_tx: mpsc::UnboundedSender<SentSignal>,
    inbox: Mutex<VecDeque<SignalEnvelope>>,
}

impl MockTransport {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<SentSignal>) {
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                sent_tx,
                inbox: Mutex::new(VecDeque::new()),
            }),
            sent_rx,
        )
    }

    /// Queue an envelope for the manager's next poll.
    pub async fn push_inbound(
        &self,
        room: &RoomId,
        from: &ParticipantId,
        to: &ParticipantId,
        kind: SignalKind,
        payload: Value,
    ) {
        let created_at = unix_ms_now();
        self.inbox.lock().await.push_back(SignalEnvelope {
            id: EnvelopeId::new(),
            room_id: room.clone(),
            from_peer: from.clone(),
            to_peer: to.clone(),
            kind,
            payload,
            created_at,
            expires_at: created_at + 300_000,
        });
    }
}

#[async_trait]
impl SignalTransport for MockTransport {
    async fn send(&self, _room: &RoomId, signal: NewSignal) -> Result<(), TransportError> {
        let _ = self.sent_tx.send(SentSignal {
            at: Instant::now(),
            signal,
        });
        Ok(())
    }

    async fn receive(
        &self,
        _room: &RoomId,
        _peer: &ParticipantId,
    ) -> Result<Vec<SignalEnvelope>, TransportError> {
        Ok(self.inbox.lock().await.drain(..).collect())
    }
}
