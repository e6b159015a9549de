use crate::transport::engine_config::EngineConfig;
use anyhow::Context;
use async_trait::async_trait;
use duet_core::{
    EngineConnectionState, EngineError, EngineEvent, IceCandidate, PeerEngine, SdpKind,
    SessionDescription,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::setting_engine::SettingEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;

/// [`PeerEngine`] backed by a webrtc-rs peer connection.
///
/// Remote candidates that arrive before the remote description are held
/// back and applied right after it is set.
pub struct WebRtcEngine {
    config: EngineConfig,
    peer_connection: Arc<RTCPeerConnection>,
    /// `Some` until the remote description is applied.
    pending_candidates: Mutex<Option<Vec<IceCandidate>>>,
    closed: AtomicBool,
}

impl WebRtcEngine {
    pub async fn new(
        config: EngineConfig,
        event_tx: mpsc::Sender<EngineEvent>,
    ) -> Result<Self, EngineError> {
        let peer_connection = Arc::new(build_peer_connection(&config).await?);

        let state_tx = event_tx.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();

                Box::pin(async move {
                    let Some(state) = map_connection_state(s) else {
                        return;
                    };
                    debug!("Peer connection state changed: {:?}", s);
                    let _ = tx.send(EngineEvent::ConnectionStateChanged(state)).await;
                })
            },
        ));

        let ice_tx = event_tx;
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                // `None` marks the end of gathering.
                let Some(candidate) = c else {
                    debug!("ICE gathering complete");
                    return;
                };
                let Ok(init) = candidate.to_json() else {
                    warn!("Dropping local candidate that cannot be serialized");
                    return;
                };
                let _ = tx
                    .send(EngineEvent::LocalCandidate(from_candidate_init(init)))
                    .await;
            })
        }));

        info!("WebRTC engine ready with {} ICE server(s)", config.ice_servers.len());
        Ok(Self {
            config,
            peer_connection,
            pending_candidates: Mutex::new(Some(Vec::new())),
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self) -> Result<(), EngineError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(EngineError::Closed)
        } else {
            Ok(())
        }
    }

    /// Declares what this side wants to receive. Without any media section
    /// the offer would carry no transport, so a data channel stands in.
    async fn add_receivers(&self) -> Result<(), EngineError> {
        let wanted = [
            (self.config.offer_to_receive_video, RTPCodecType::Video),
            (self.config.offer_to_receive_audio, RTPCodecType::Audio),
        ];

        let mut added = false;
        for (enabled, kind) in wanted {
            if !enabled {
                continue;
            }
            let init = RTCRtpTransceiverInit {
                direction: RTCRtpTransceiverDirection::Recvonly,
                send_encodings: vec![],
            };
            self.peer_connection
                .add_transceiver_from_kind(kind, Some(init))
                .await
                .map_err(|e| EngineError::CreateDescription(e.to_string()))?;
            added = true;
        }

        if !added {
            self.peer_connection
                .create_data_channel("duet", None)
                .await
                .map_err(|e| EngineError::CreateDescription(e.to_string()))?;
        }
        Ok(())
    }

    async fn apply_candidate(&self, candidate: IceCandidate) -> Result<(), EngineError> {
        self.peer_connection
            .add_ice_candidate(to_candidate_init(candidate))
            .await
            .map_err(|e| EngineError::Candidate(e.to_string()))
    }
}

#[async_trait]
impl PeerEngine for WebRtcEngine {
    async fn create_local_offer(&self) -> Result<SessionDescription, EngineError> {
        self.ensure_open()?;
        if self.peer_connection.get_transceivers().await.is_empty() {
            self.add_receivers().await?;
        }

        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(|e| EngineError::CreateDescription(e.to_string()))?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await
            .map_err(|e| EngineError::ApplyDescription(e.to_string()))?;

        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_local_answer(&self) -> Result<SessionDescription, EngineError> {
        self.ensure_open()?;

        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(|e| EngineError::CreateDescription(e.to_string()))?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await
            .map_err(|e| EngineError::ApplyDescription(e.to_string()))?;

        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), EngineError> {
        self.ensure_open()?;

        let desc = match description.kind {
            SdpKind::Offer => RTCSessionDescription::offer(description.sdp),
            SdpKind::Answer => RTCSessionDescription::answer(description.sdp),
        }
        .map_err(|e| EngineError::ApplyDescription(e.to_string()))?;

        let mut pending = self.pending_candidates.lock().await;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .map_err(|e| EngineError::ApplyDescription(e.to_string()))?;

        let buffered = pending.take().unwrap_or_default();
        if !buffered.is_empty() {
            debug!("Applying {} buffered remote candidate(s)", buffered.len());
        }
        for candidate in buffered {
            if let Err(e) = self.apply_candidate(candidate).await {
                warn!("Buffered candidate rejected: {}", e);
            }
        }
        Ok(())
    }

    async fn add_candidate(&self, candidate: IceCandidate) -> Result<(), EngineError> {
        self.ensure_open()?;

        let mut pending = self.pending_candidates.lock().await;
        if let Some(buffer) = pending.as_mut() {
            debug!("Remote description not set yet, buffering candidate");
            buffer.push(candidate);
            return Ok(());
        }
        self.apply_candidate(candidate).await
    }

    async fn close(&self) -> Result<(), EngineError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        info!("Closing WebRTC engine");
        self.peer_connection
            .close()
            .await
            .context("Failed to close peer connection")?;
        Ok(())
    }
}

async fn build_peer_connection(config: &EngineConfig) -> anyhow::Result<RTCPeerConnection> {
    let mut m = MediaEngine::default();
    m.register_default_codecs()
        .context("Failed to register default codecs")?;
    let registry = register_default_interceptors(Registry::new(), &mut m)
        .context("Failed to register interceptors")?;

    let mut settings = SettingEngine::default();
    settings.set_include_loopback_candidate(config.include_loopback_candidates);

    let api = APIBuilder::new()
        .with_media_engine(m)
        .with_interceptor_registry(registry)
        .with_setting_engine(settings)
        .build();

    let rtc_config = RTCConfiguration {
        ice_servers: config
            .ice_servers
            .iter()
            .map(|server| RTCIceServer {
                urls: server.urls.clone(),
                username: server.username.clone(),
                credential: server.credential.clone(),
            })
            .collect(),
        ..Default::default()
    };

    api.new_peer_connection(rtc_config)
        .await
        .context("Failed to create peer connection")
}

fn map_connection_state(state: RTCPeerConnectionState) -> Option<EngineConnectionState> {
    match state {
        RTCPeerConnectionState::New => Some(EngineConnectionState::New),
        RTCPeerConnectionState::Connecting => Some(EngineConnectionState::Connecting),
        RTCPeerConnectionState::Connected => Some(EngineConnectionState::Connected),
        RTCPeerConnectionState::Disconnected => Some(EngineConnectionState::Disconnected),
        RTCPeerConnectionState::Failed => Some(EngineConnectionState::Failed),
        RTCPeerConnectionState::Closed => Some(EngineConnectionState::Closed),
        RTCPeerConnectionState::Unspecified => None,
    }
}

fn from_candidate_init(init: RTCIceCandidateInit) -> IceCandidate {
    IceCandidate {
        server_url: None,
        sdp_mid: init.sdp_mid.unwrap_or_default(),
        sdp_m_line_index: init.sdp_mline_index.unwrap_or(0),
        sdp: init.candidate,
    }
}

fn to_candidate_init(candidate: IceCandidate) -> RTCIceCandidateInit {
    RTCIceCandidateInit {
        candidate: candidate.sdp,
        sdp_mid: Some(candidate.sdp_mid),
        sdp_mline_index: Some(candidate.sdp_m_line_index),
        username_fragment: None,
    }
}
