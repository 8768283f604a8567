use crate::engine::{EngineError, EngineEvent, MediaEngine};
use crate::manager::manager_command::ManagerCommand;
use crate::manager::manager_config::ManagerConfig;
use crate::manager::manager_event::ManagerEvent;
use crate::manager::peer_link::{LinkState, PeerLink};
use crate::transport::SignalTransport;
use futures::future::join_all;
use greenroom_core::{NewSignal, ParticipantId, RoomId, SignalEnvelope, SignalKind};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Control surface for a spawned manager.
pub struct PeerManagerHandle {
    commands: mpsc::Sender<ManagerCommand>,
    pub events: mpsc::UnboundedReceiver<ManagerEvent>,
}

impl PeerManagerHandle {
    pub async fn start(&self, remotes: Vec<ParticipantId>) {
        let _ = self.commands.send(ManagerCommand::Start { remotes }).await;
    }

    pub async fn stop(&self) {
        let _ = self.commands.send(ManagerCommand::Stop).await;
    }
}

/// Per-local-participant owner of the negotiation state machines, one per
/// remote peer. Runs as an event loop over commands, engine events, and a
/// fixed relay poll; envelopes from one poll batch are handled sequentially
/// before the next tick, which serializes negotiation per remote peer.
pub struct PeerManager {
    local_id: ParticipantId,
    room_id: RoomId,
    transport: Arc<dyn SignalTransport>,
    engine: Arc<dyn MediaEngine>,
    config: ManagerConfig,
    links: HashMap<ParticipantId, PeerLink>,
    command_rx: mpsc::Receiver<ManagerCommand>,
    command_tx: mpsc::Sender<ManagerCommand>,
    engine_rx: mpsc::Receiver<EngineEvent>,
    engine_tx: mpsc::Sender<EngineEvent>,
    events: mpsc::UnboundedSender<ManagerEvent>,
    stopped_by_user: bool,
}

impl PeerManager {
    pub fn new(
        local_id: ParticipantId,
        room_id: RoomId,
        transport: Arc<dyn SignalTransport>,
        engine: Arc<dyn MediaEngine>,
        config: ManagerConfig,
    ) -> (Self, PeerManagerHandle) {
        let (command_tx, command_rx) = mpsc::channel(64);
        let (engine_tx, engine_rx) = mpsc::channel(256);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let manager = Self {
            local_id,
            room_id,
            transport,
            engine,
            config,
            links: HashMap::new(),
            command_rx,
            command_tx: command_tx.clone(),
            engine_rx,
            engine_tx,
            events: event_tx,
            stopped_by_user: false,
        };
        let handle = PeerManagerHandle {
            commands: command_tx,
            events: event_rx,
        };
        (manager, handle)
    }

    /// The manager's event loop. Run via `tokio::spawn`.
    pub async fn run(mut self) {
        info!("Peer manager for {} started", self.local_id);

        let mut poll = tokio::time::interval(self.config.poll_interval);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(ManagerCommand::Start { remotes }) => self.handle_start(remotes).await,
                        Some(ManagerCommand::Retry { remote }) => self.handle_retry(remote).await,
                        Some(ManagerCommand::Stop) => {
                            self.handle_stop().await;
                            break;
                        }
                        None => {
                            info!("Command channel closed. Shutting down manager.");
                            self.handle_stop().await;
                            break;
                        }
                    }
                }

                evt = self.engine_rx.recv() => {
                    if let Some(evt) = evt {
                        self.handle_engine_event(evt).await;
                    }
                }

                _ = poll.tick() => self.poll_relay().await,
            }
        }

        info!("Peer manager for {} finished", self.local_id);
    }

    async fn handle_start(&mut self, remotes: Vec<ParticipantId>) {
        for remote in remotes {
            if remote == self.local_id {
                continue;
            }
            self.initiate(remote).await;
        }
    }

    /// Open a fresh engine session toward `remote` and send an offer.
    async fn initiate(&mut self, remote: ParticipantId) {
        if self.stopped_by_user {
            return;
        }

        let session = match self
            .engine
            .open_session(remote.clone(), self.engine_tx.clone())
            .await
        {
            Ok(session) => session,
            Err(e) => {
                self.handle_negotiation_failure(remote, e).await;
                return;
            }
        };

        let offer = match session.create_offer().await {
            Ok(sdp) => sdp,
            Err(e) => {
                session.close().await;
                self.handle_negotiation_failure(remote, e).await;
                return;
            }
        };

        self.links
            .entry(remote.clone())
            .or_insert_with(PeerLink::new)
            .session = Some(session);
        self.send_signal(remote.clone(), SignalKind::Offer, json!({ "sdp": offer }))
            .await;
        self.set_link_state(&remote, LinkState::Negotiating);
    }

    async fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::PathLive(remote) => {
                if let Some(link) = self.links.get_mut(&remote) {
                    link.reconnect_attempts = 0;
                    link.failure_notified = false;
                }
                self.set_link_state(&remote, LinkState::Connected);
            }

            EngineEvent::PathLost(remote) => {
                // A stop that already happened wins over reconnection.
                if self.stopped_by_user {
                    return;
                }
                debug!("Media path lost to {}", remote);
                self.schedule_reconnect(remote).await;
            }

            EngineEvent::Candidate(remote, candidate) => {
                self.send_signal(
                    remote,
                    SignalKind::IceCandidate,
                    json!({ "candidate": candidate }),
                )
                .await;
            }
        }
    }

    /// Linear backoff: `reconnect_step × attempt`, up to the configured
    /// maximum, then the link fails for good.
    async fn schedule_reconnect(&mut self, remote: ParticipantId) {
        let (closing, next_attempt) = {
            let link = self
                .links
                .entry(remote.clone())
                .or_insert_with(PeerLink::new);
            if link.state == LinkState::Failed {
                return;
            }
            link.cancel_retry();
            let closing = link.session.take();

            if link.reconnect_attempts >= self.config.max_reconnect_attempts {
                (closing, None)
            } else {
                link.reconnect_attempts += 1;
                (closing, Some(link.reconnect_attempts))
            }
        };

        if let Some(session) = closing {
            session.close().await;
        }

        let Some(attempt) = next_attempt else {
            self.fail_link(&remote).await;
            return;
        };

        let delay = self.config.reconnect_step * attempt;
        info!(
            "Reconnect attempt {} to {} scheduled in {:?}",
            attempt, remote, delay
        );

        let tx = self.command_tx.clone();
        let retry_remote = remote.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(ManagerCommand::Retry { remote: retry_remote }).await;
        });
        if let Some(link) = self.links.get_mut(&remote) {
            link.pending_retry = Some(handle);
        }
        self.set_link_state(&remote, LinkState::Reconnecting);
    }

    async fn handle_retry(&mut self, remote: ParticipantId) {
        if self.stopped_by_user {
            return;
        }
        let due = self
            .links
            .get(&remote)
            .is_some_and(|l| l.state == LinkState::Reconnecting);
        if due {
            self.initiate(remote).await;
        }
    }

    async fn handle_negotiation_failure(&mut self, remote: ParticipantId, error: EngineError) {
        match error {
            EngineError::PermissionDenied(msg) => {
                // Terminal: only an explicit user action retries capture.
                warn!("Media permission denied for {}: {}", remote, msg);
                self.fail_link(&remote).await;
            }
            EngineError::Negotiation(msg) => {
                warn!("Negotiation with {} failed: {}", remote, msg);
                self.schedule_reconnect(remote).await;
            }
        }
    }

    async fn fail_link(&mut self, remote: &ParticipantId) {
        let (closing, notify) = {
            let link = self
                .links
                .entry(remote.clone())
                .or_insert_with(PeerLink::new);
            link.cancel_retry();
            let closing = link.session.take();
            let notify = !link.failure_notified;
            link.failure_notified = true;
            (closing, notify)
        };

        if let Some(session) = closing {
            session.close().await;
        }
        self.set_link_state(remote, LinkState::Failed);
        if notify {
            warn!("Link to {} failed permanently", remote);
            let _ = self.events.send(ManagerEvent::LinkFailed {
                remote: remote.clone(),
            });
        }
    }

    /// Manual stop: cancels every pending retry, stops local media, and ends
    /// the event loop. Always takes precedence over in-flight reconnection.
    async fn handle_stop(&mut self) {
        self.stopped_by_user = true;

        let mut closing = Vec::new();
        for link in self.links.values_mut() {
            link.cancel_retry();
            if let Some(session) = link.session.take() {
                closing.push(session);
            }
            link.state = LinkState::Idle;
        }
        join_all(closing.iter().map(|s| s.close())).await;

        let _ = self.events.send(ManagerEvent::Stopped);
        info!("Peer manager for {} stopped by user", self.local_id);
    }

    async fn poll_relay(&mut self) {
        let envelopes = match self
            .transport
            .receive(&self.room_id, &self.local_id)
            .await
        {
            Ok(envelopes) => envelopes,
            Err(e) => {
                warn!("Relay poll failed: {}", e);
                return;
            }
        };

        for envelope in envelopes {
            self.handle_envelope(envelope).await;
        }
    }

    async fn handle_envelope(&mut self, envelope: SignalEnvelope) {
        let from = envelope.from_peer.clone();
        match envelope.kind {
            SignalKind::Offer => {
                let Some(sdp) = envelope.payload.get("sdp").and_then(|v| v.as_str()) else {
                    warn!("Malformed offer from {}", from);
                    return;
                };
                self.handle_offer(from, sdp.to_owned()).await;
            }

            SignalKind::Answer => {
                let Some(sdp) = envelope.payload.get("sdp").and_then(|v| v.as_str()) else {
                    warn!("Malformed answer from {}", from);
                    return;
                };
                let session = self.links.get(&from).and_then(|l| l.session.clone());
                match session {
                    Some(session) => {
                        if let Err(e) = session.accept_answer(sdp.to_owned()).await {
                            self.handle_negotiation_failure(from, e).await;
                        }
                    }
                    None => warn!("Answer from {} without a pending offer", from),
                }
            }

            SignalKind::IceCandidate => {
                let Some(candidate) = envelope.payload.get("candidate").and_then(|v| v.as_str())
                else {
                    warn!("Malformed ICE candidate from {}", from);
                    return;
                };
                match self.links.get(&from).and_then(|l| l.session.clone()) {
                    Some(session) => {
                        if let Err(e) = session.add_remote_candidate(candidate.to_owned()).await {
                            warn!("Failed to add ICE candidate from {}: {}", from, e);
                        }
                    }
                    None => debug!("Dropping ICE candidate from {} with no session", from),
                }
            }
        }
    }

    /// Answering side. A fresh offer supersedes whatever session existed
    /// with that peer, including the first contact from an unknown one.
    async fn handle_offer(&mut self, from: ParticipantId, sdp: String) {
        if self.stopped_by_user {
            return;
        }

        if let Some(old) = self.links.get_mut(&from).and_then(|l| l.session.take()) {
            old.close().await;
        }

        let session = match self
            .engine
            .open_session(from.clone(), self.engine_tx.clone())
            .await
        {
            Ok(session) => session,
            Err(e) => {
                self.handle_negotiation_failure(from, e).await;
                return;
            }
        };
        self.links
            .entry(from.clone())
            .or_insert_with(PeerLink::new)
            .session = Some(session.clone());

        match session.accept_offer(sdp).await {
            Ok(answer) => {
                self.send_signal(from.clone(), SignalKind::Answer, json!({ "sdp": answer }))
                    .await;
                self.set_link_state(&from, LinkState::Negotiating);
            }
            Err(e) => self.handle_negotiation_failure(from, e).await,
        }
    }

    async fn send_signal(&self, to: ParticipantId, kind: SignalKind, payload: serde_json::Value) {
        let signal = NewSignal {
            from_peer: self.local_id.clone(),
            to_peer: to,
            kind,
            payload,
        };
        if let Err(e) = self.transport.send(&self.room_id, signal).await {
            warn!("Failed to send {:?} signal: {}", kind, e);
        }
    }

    fn set_link_state(&mut self, remote: &ParticipantId, state: LinkState) {
        let Some(link) = self.links.get_mut(remote) else {
            return;
        };
        if link.state == state {
            return;
        }
        link.state = state;
        let _ = self.events.send(ManagerEvent::LinkStateChanged {
            remote: remote.clone(),
            state,
        });
    }
}
