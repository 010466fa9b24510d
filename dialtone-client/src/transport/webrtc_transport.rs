use crate::media::MediaStream;
use crate::transport::{PeerConnector, PeerTransport, TransportEvent, TransportState};
use anyhow::{Context, Result};
use async_trait::async_trait;
use dialtone_core::{IceCandidateInit, IceServerConfig, SdpKind, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::RTCIceCandidate;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::track::track_remote::TrackRemote;

/// ICE configuration for the production transport.
#[derive(Clone)]
pub struct WebrtcConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for WebrtcConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig {
                urls: vec!["stun:stun.l.google.com:19302".to_owned()],
                username: None,
                credential: None,
            }],
        }
    }
}

/// [`PeerConnector`] backed by the `webrtc` crate.
pub struct WebrtcConnector {
    config: WebrtcConfig,
}

impl WebrtcConnector {
    pub fn new(config: WebrtcConfig) -> Self {
        Self { config }
    }
}

impl Default for WebrtcConnector {
    fn default() -> Self {
        Self::new(WebrtcConfig::default())
    }
}

#[async_trait]
impl PeerConnector for WebrtcConnector {
    async fn connect(
        &self,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn PeerTransport>> {
        let transport = WebrtcTransport::new(self.config.clone(), events).await?;
        Ok(Box::new(transport))
    }
}

/// Remote media surfaced by `on_track`. Remote tracks stop delivering samples
/// once the peer connection closes; `stop` only marks the handle.
struct RemoteTrack {
    kind: RTPCodecType,
}

impl MediaStream for RemoteTrack {
    fn has_audio(&self) -> bool {
        self.kind == RTPCodecType::Audio
    }

    fn has_video(&self) -> bool {
        self.kind == RTPCodecType::Video
    }

    fn stop(&self) {
        debug!("remote {} track released", self.kind);
    }
}

pub struct WebrtcTransport {
    peer_connection: Arc<RTCPeerConnection>,
}

impl WebrtcTransport {
    async fn new(config: WebrtcConfig, events: mpsc::Sender<TransportEvent>) -> Result<Self> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .into_iter()
                .map(|server| RTCIceServer {
                    urls: server.urls,
                    username: server.username.unwrap_or_default(),
                    credential: server.credential.unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        // Callbacks clone the event sender; each must be 'static.
        let state_tx = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                Box::pin(async move {
                    info!("peer connection state changed: {:?}", s);
                    let state = match s {
                        RTCPeerConnectionState::Connecting => TransportState::Connecting,
                        RTCPeerConnectionState::Connected => TransportState::Connected,
                        RTCPeerConnectionState::Disconnected => TransportState::Disconnected,
                        RTCPeerConnectionState::Failed => TransportState::Failed,
                        RTCPeerConnectionState::Closed => TransportState::Closed,
                        _ => TransportState::New,
                    };
                    let _ = tx.send(TransportEvent::StateChanged(state)).await;
                })
            },
        ));

        // Trickle ICE: surface each local candidate as soon as it appears.
        let ice_tx = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let _ = tx
                    .send(TransportEvent::LocalCandidate(IceCandidateInit {
                        candidate: init.candidate,
                        sdp_mid: init.sdp_mid,
                        sdp_m_line_index: init.sdp_mline_index,
                    }))
                    .await;
            })
        }));

        let track_tx = events.clone();
        peer_connection.on_track(Box::new(move |track: Arc<TrackRemote>, _, _| {
            let tx = track_tx.clone();
            Box::pin(async move {
                debug!("remote track arrived: {:?}", track.kind());
                let stream: Arc<dyn MediaStream> = Arc::new(RemoteTrack { kind: track.kind() });
                let _ = tx.send(TransportEvent::RemoteStream(stream)).await;
            })
        }));

        Ok(Self { peer_connection })
    }
}

#[async_trait]
impl PeerTransport for WebrtcTransport {
    /// Negotiate send/receive lines for the kinds the local stream carries.
    async fn attach_media(&self, stream: Arc<dyn MediaStream>) -> Result<()> {
        if stream.has_audio() {
            self.peer_connection
                .add_transceiver_from_kind(RTPCodecType::Audio, None)
                .await
                .context("failed to add audio transceiver")?;
        }
        if stream.has_video() {
            self.peer_connection
                .add_transceiver_from_kind(RTPCodecType::Video, None)
                .await
                .context("failed to add video transceiver")?;
        }
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()> {
        let remote = match desc.kind {
            SdpKind::Offer => RTCSessionDescription::offer(desc.sdp)?,
            SdpKind::Answer => RTCSessionDescription::answer(desc.sdp)?,
        };
        self.peer_connection.set_remote_description(remote).await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidateInit) -> Result<()> {
        let init = webrtc::ice_transport::ice_candidate::RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: None,
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .context("failed to add remote ICE candidate")?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}
