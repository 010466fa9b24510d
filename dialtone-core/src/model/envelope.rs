use crate::model::ice::IceCandidateInit;
use crate::model::sdp::SessionDescription;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

/// The unit of signaling traffic between clients. Carried as JSON text over
/// the relay channel:
///
/// `{ "type": "OFFER", "sender": "...", "target": "...", "sdp": {...} }`
///
/// The relay forwards envelopes opaquely; addressing is applied by the
/// receiving client. HANGUP may omit its target and is honored regardless of
/// addressing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Envelope {
    Offer {
        sender: UserId,
        target: UserId,
        sdp: SessionDescription,
    },
    Answer {
        sender: UserId,
        target: UserId,
        sdp: SessionDescription,
    },
    IceCandidate {
        sender: UserId,
        target: UserId,
        candidate: IceCandidateInit,
    },
    Hangup {
        sender: UserId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<UserId>,
    },
}

impl Envelope {
    pub fn sender(&self) -> &UserId {
        match self {
            Envelope::Offer { sender, .. }
            | Envelope::Answer { sender, .. }
            | Envelope::IceCandidate { sender, .. }
            | Envelope::Hangup { sender, .. } => sender,
        }
    }

    pub fn target(&self) -> Option<&UserId> {
        match self {
            Envelope::Offer { target, .. }
            | Envelope::Answer { target, .. }
            | Envelope::IceCandidate { target, .. } => Some(target),
            Envelope::Hangup { target, .. } => target.as_ref(),
        }
    }

    /// Client-side addressing rule: an envelope is for `user` when its target
    /// matches. HANGUP applies regardless of target (broadcast semantics).
    pub fn is_addressed_to(&self, user: &UserId) -> bool {
        match self {
            Envelope::Hangup { .. } => true,
            _ => self.target() == Some(user),
        }
    }
}
