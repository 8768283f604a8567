use crate::store::EnvelopeStore;
use async_trait::async_trait;
use dashmap::DashMap;
use greenroom_core::{ParticipantId, RoomId, SignalEnvelope};
use std::time::Duration;
use tokio::time::Instant;

struct StoredEnvelope {
    envelope: SignalEnvelope,
    expires: Instant,
}

/// In-memory store over one mailbox per `(room, addressee)`. Mailbox vectors
/// preserve insertion order, which is the FIFO the relay promises. A durable
/// backend would implement the same trait; persistence is out of scope here.
#[derive(Default)]
pub struct MemoryEnvelopeStore {
    mailboxes: DashMap<(RoomId, ParticipantId), Vec<StoredEnvelope>>,
}

impl MemoryEnvelopeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EnvelopeStore for MemoryEnvelopeStore {
    async fn insert(&self, envelope: SignalEnvelope, ttl: Duration) {
        let key = (envelope.room_id.clone(), envelope.to_peer.clone());
        self.mailboxes.entry(key).or_default().push(StoredEnvelope {
            envelope,
            expires: Instant::now() + ttl,
        });
    }

    async fn take_for(&self, room: &RoomId, peer: &ParticipantId) -> Vec<SignalEnvelope> {
        // remove() detaches the whole mailbox under the shard lock, so a
        // concurrent poll for the same peer sees either everything or nothing.
        let Some((_, stored)) = self.mailboxes.remove(&(room.clone(), peer.clone())) else {
            return Vec::new();
        };

        let now = Instant::now();
        stored
            .into_iter()
            .filter(|s| s.expires > now)
            .map(|s| s.envelope)
            .collect()
    }

    async fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut purged = 0;

        for mut entry in self.mailboxes.iter_mut() {
            let before = entry.len();
            entry.retain(|s| s.expires > now);
            purged += before - entry.len();
        }
        self.mailboxes.retain(|_, mailbox| !mailbox.is_empty());

        purged
    }
}
