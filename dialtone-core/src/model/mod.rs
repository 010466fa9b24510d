mod envelope;
mod ice;
mod sdp;
mod user;

pub use envelope::Envelope;
pub use ice::{IceCandidateInit, IceServerConfig};
pub use sdp::{SdpKind, SessionDescription};
pub use user::UserId;
