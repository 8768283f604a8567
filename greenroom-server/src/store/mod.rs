mod memory;

pub use memory::MemoryEnvelopeStore;

use async_trait::async_trait;
use greenroom_core::{ParticipantId, RoomId, SignalEnvelope};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Keyed envelope storage with TTL expiry. Relay correctness rests on
/// `insert` and `take_for` being atomic per mailbox; there is no outer lock.
#[async_trait]
pub trait EnvelopeStore: Send + Sync {
    /// Append an envelope to its addressee's mailbox.
    async fn insert(&self, envelope: SignalEnvelope, ttl: Duration);

    /// Remove and return every live envelope addressed to `peer` in `room`,
    /// oldest first, as one atomic step. Envelopes past their TTL are
    /// dropped, not returned.
    async fn take_for(&self, room: &RoomId, peer: &ParticipantId) -> Vec<SignalEnvelope>;

    /// Purge envelopes past their TTL. Returns how many were dropped.
    async fn sweep_expired(&self) -> usize;
}

/// Periodic expiry sweep. `take_for` already filters expired rows; the sweep
/// only bounds storage for mailboxes nobody polls anymore.
pub fn spawn_sweeper(store: Arc<dyn EnvelopeStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(every);
        loop {
            tick.tick().await;
            let purged = store.sweep_expired().await;
            if purged > 0 {
                debug!("Sweeper purged {} expired envelopes", purged);
            }
        }
    })
}
