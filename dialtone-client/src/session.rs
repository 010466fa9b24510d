use crate::media::MediaStream;
use crate::transport::PeerTransport;
use dialtone_core::UserId;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallRole {
    Caller,
    Callee,
}

/// Observable call lifecycle. `Closed` is terminal but equivalent to `Idle`
/// for reuse: a fresh session may be created after a full teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    /// Caller sent OFFER, awaiting ANSWER.
    Offering,
    /// Callee received OFFER, awaiting the local accept/reject decision.
    Ringing,
    /// Descriptions exchanged, awaiting transport-level connect.
    Connecting,
    /// Media flowing.
    Active,
    Closed,
}

/// The controller's single mutable record of an in-progress call. Exactly one
/// may exist per controller; the peer transport is exclusively owned and
/// released on teardown.
pub struct CallSession {
    pub role: CallRole,
    pub state: CallState,
    pub remote_user: UserId,
    pub transport: Box<dyn PeerTransport>,
    pub local_media: Option<Arc<dyn MediaStream>>,
    pub remote_media: Option<Arc<dyn MediaStream>>,
}

impl CallSession {
    pub fn new(role: CallRole, remote_user: UserId, transport: Box<dyn PeerTransport>) -> Self {
        Self {
            role,
            state: CallState::Idle,
            remote_user,
            transport,
            local_media: None,
            remote_media: None,
        }
    }
}
