use crate::engine::{EngineError, EngineEvent, MediaEngine, MediaSession};
use async_trait::async_trait;
use greenroom_core::ParticipantId;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_VP8, MediaEngine as RtcMediaEngine};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

#[derive(Clone)]
pub struct EngineSettings {
    pub ice_servers: Vec<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            ice_servers: vec!["stun:stun.l.google.com:19302".to_owned()],
        }
    }
}

/// Negotiation engine over the `webrtc` crate: one `RTCPeerConnection` per
/// remote peer, with the local capture track attached to each.
pub struct WebRtcEngine {
    settings: EngineSettings,
    local_track: Arc<TrackLocalStaticSample>,
}

impl WebRtcEngine {
    pub fn new(settings: EngineSettings, local_track: Arc<TrackLocalStaticSample>) -> Self {
        Self {
            settings,
            local_track,
        }
    }

    /// A screen-capture-shaped track for embedders that feed samples in
    /// themselves rather than bringing their own `TrackLocal`.
    pub fn screen_track() -> Arc<TrackLocalStaticSample> {
        Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                ..Default::default()
            },
            "screen".to_owned(),
            "greenroom".to_owned(),
        ))
    }
}

fn negotiation_err(e: webrtc::Error) -> EngineError {
    EngineError::Negotiation(e.to_string())
}

#[async_trait]
impl MediaEngine for WebRtcEngine {
    async fn open_session(
        &self,
        remote: ParticipantId,
        events: mpsc::Sender<EngineEvent>,
    ) -> Result<Arc<dyn MediaSession>, EngineError> {
        let mut media = RtcMediaEngine::default();
        media.register_default_codecs().map_err(negotiation_err)?;
        let registry =
            register_default_interceptors(Registry::new(), &mut media).map_err(negotiation_err)?;

        let api = APIBuilder::new()
            .with_media_engine(media)
            .with_interceptor_registry(registry)
            .build();

        let config = RTCConfiguration {
            ice_servers: vec![RTCIceServer {
                urls: self.settings.ice_servers.clone(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let pc = Arc::new(
            api.new_peer_connection(config)
                .await
                .map_err(negotiation_err)?,
        );
        pc.add_track(Arc::clone(&self.local_track) as Arc<dyn TrackLocal + Send + Sync>)
            .await
            .map_err(negotiation_err)?;

        let state_tx = events.clone();
        let state_remote = remote.clone();
        pc.on_peer_connection_state_change(Box::new(move |s: RTCPeerConnectionState| {
            let tx = state_tx.clone();
            let remote = state_remote.clone();

            Box::pin(async move {
                info!("Peer connection state for {}: {:?}", remote, s);
                match s {
                    RTCPeerConnectionState::Connected => {
                        let _ = tx.send(EngineEvent::PathLive(remote)).await;
                    }
                    RTCPeerConnectionState::Disconnected
                    | RTCPeerConnectionState::Failed
                    | RTCPeerConnectionState::Closed => {
                        let _ = tx.send(EngineEvent::PathLost(remote)).await;
                    }
                    _ => {}
                }
            })
        }));

        let ice_tx = events;
        let ice_remote = remote.clone();
        pc.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let remote = ice_remote.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(json_candidate) = candidate.to_json() else {
                    return;
                };
                let Ok(serialized) = serde_json::to_string(&json_candidate) else {
                    return;
                };
                let _ = tx.send(EngineEvent::Candidate(remote, serialized)).await;
            })
        }));

        debug!("Opened negotiation session with {}", remote);
        Ok(Arc::new(WebRtcSession { pc }))
    }
}

struct WebRtcSession {
    pc: Arc<RTCPeerConnection>,
}

#[async_trait]
impl MediaSession for WebRtcSession {
    async fn create_offer(&self) -> Result<String, EngineError> {
        let offer = self.pc.create_offer(None).await.map_err(negotiation_err)?;
        self.pc
            .set_local_description(offer.clone())
            .await
            .map_err(negotiation_err)?;
        Ok(offer.sdp)
    }

    async fn accept_offer(&self, sdp: String) -> Result<String, EngineError> {
        let desc = RTCSessionDescription::offer(sdp).map_err(negotiation_err)?;
        self.pc
            .set_remote_description(desc)
            .await
            .map_err(negotiation_err)?;

        let answer = self.pc.create_answer(None).await.map_err(negotiation_err)?;
        self.pc
            .set_local_description(answer.clone())
            .await
            .map_err(negotiation_err)?;
        Ok(answer.sdp)
    }

    async fn accept_answer(&self, sdp: String) -> Result<(), EngineError> {
        let desc = RTCSessionDescription::answer(sdp).map_err(negotiation_err)?;
        self.pc
            .set_remote_description(desc)
            .await
            .map_err(negotiation_err)
    }

    async fn add_remote_candidate(&self, candidate: String) -> Result<(), EngineError> {
        let init: RTCIceCandidateInit = serde_json::from_str(&candidate)
            .map_err(|e| EngineError::Negotiation(format!("bad ICE candidate: {e}")))?;
        self.pc
            .add_ice_candidate(init)
            .await
            .map_err(negotiation_err)
    }

    async fn close(&self) {
        let _ = self.pc.close().await;
    }
}
