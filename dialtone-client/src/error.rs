use thiserror::Error;

/// Failure taxonomy for a call in progress. Every variant resolves to the
/// teardown path; none is fatal to the controller, which always returns to a
/// reusable idle state. Mistargeted envelopes are silently dropped and never
/// reach this type.
#[derive(Debug, Error)]
pub enum CallError {
    /// A call is already in progress; new placements and inbound offers are
    /// rejected until the current session is torn down.
    #[error("another call is already in progress")]
    Busy,

    /// Applying a description or candidate failed.
    #[error("negotiation failed")]
    Negotiation(#[source] anyhow::Error),

    /// Camera/microphone unavailable or denied.
    #[error("media acquisition failed")]
    MediaAcquisition(#[source] anyhow::Error),

    /// The outbound signaling channel is gone.
    #[error("signaling channel closed")]
    SignalingClosed,
}
