use crate::engine::MediaSession;
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LinkState {
    Idle,
    Negotiating,
    Connected,
    Reconnecting,
    Failed,
}

/// Client-local negotiation state for one remote peer. Owned exclusively by
/// one manager instance; nothing here is shared across rooms or processes.
pub(crate) struct PeerLink {
    pub state: LinkState,
    pub session: Option<Arc<dyn MediaSession>>,
    pub reconnect_attempts: u32,
    pub pending_retry: Option<JoinHandle<()>>,
    pub failure_notified: bool,
}

impl PeerLink {
    pub fn new() -> Self {
        Self {
            state: LinkState::Idle,
            session: None,
            reconnect_attempts: 0,
            pending_retry: None,
            failure_notified: false,
        }
    }

    /// Abort a scheduled reconnect, if any.
    pub fn cancel_retry(&mut self) {
        if let Some(handle) = self.pending_retry.take() {
            handle.abort();
        }
    }
}
