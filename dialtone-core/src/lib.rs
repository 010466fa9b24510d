pub mod model;

pub use model::{Envelope, IceCandidateInit, IceServerConfig, SdpKind, SessionDescription, UserId};
