pub mod config;
pub mod controller;
pub mod error;
pub mod link;
pub mod media;
pub mod session;
pub mod signal;
pub mod transport;
pub mod ui;

pub use config::CallConfig;
pub use controller::{CallCommand, CallController, CallHandle};
pub use error::CallError;
pub use link::RelayLink;
pub use media::{MediaConstraints, MediaSource, MediaStream, VideoSize};
pub use session::{CallRole, CallSession, CallState};
pub use signal::SignalSink;
pub use transport::{PeerConnector, PeerTransport, TransportEvent, TransportState};
pub use ui::CallUi;
