use greenroom_core::ParticipantId;

/// Commands accepted by a running peer manager.
#[derive(Debug)]
pub enum ManagerCommand {
    /// Begin negotiating with each remote (initiator role).
    Start { remotes: Vec<ParticipantId> },

    /// The local user stopped sharing. Cancels any pending reconnects and
    /// tears every link down.
    Stop,

    /// A scheduled reconnect attempt came due. Sent by the manager's own
    /// retry timers, not by embedders.
    Retry { remote: ParticipantId },
}
