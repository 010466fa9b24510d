mod webrtc_transport;

pub use webrtc_transport::{WebrtcConfig, WebrtcConnector};

use crate::media::MediaStream;
use async_trait::async_trait;
use dialtone_core::{IceCandidateInit, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Connection lifecycle reported by the peer transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl TransportState {
    /// Terminal states end the call; they are treated as normal call end,
    /// not as application errors.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransportState::Disconnected | TransportState::Failed | TransportState::Closed
        )
    }
}

/// Events the transport pushes into the controller's event loop.
pub enum TransportEvent {
    /// A new local ICE candidate to relay to the remote user.
    LocalCandidate(IceCandidateInit),
    /// The remote side's media arrived.
    RemoteStream(Arc<dyn MediaStream>),
    StateChanged(TransportState),
}

/// The external peer-transport primitive (the direct data path). `create_offer`
/// and `create_answer` also install the result as the local description.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn attach_media(&self, stream: Arc<dyn MediaStream>) -> anyhow::Result<()>;

    async fn create_offer(&self) -> anyhow::Result<SessionDescription>;

    async fn create_answer(&self) -> anyhow::Result<SessionDescription>;

    async fn set_remote_description(&self, desc: SessionDescription) -> anyhow::Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidateInit) -> anyhow::Result<()>;

    async fn close(&self) -> anyhow::Result<()>;
}

/// Factory for peer transports. `events` is the channel the new transport
/// reports into for the lifetime of its session; the receiving side closes
/// it on teardown, so events fired after release go nowhere.
#[async_trait]
pub trait PeerConnector: Send + Sync {
    async fn connect(
        &self,
        events: mpsc::Sender<TransportEvent>,
    ) -> anyhow::Result<Box<dyn PeerTransport>>;
}
