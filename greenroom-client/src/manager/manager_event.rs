use crate::manager::peer_link::LinkState;
use greenroom_core::ParticipantId;

/// Notifications for the embedding UI.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ManagerEvent {
    LinkStateChanged {
        remote: ParticipantId,
        state: LinkState,
    },

    /// Reconnection was exhausted, or a terminal failure occurred. Emitted
    /// once per failure, not once per attempt.
    LinkFailed { remote: ParticipantId },

    /// All links torn down after a user stop.
    Stopped,
}
