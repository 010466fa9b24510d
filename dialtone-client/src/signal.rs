use async_trait::async_trait;
use dialtone_core::Envelope;

/// Outbound signaling path towards the relay. Fire-and-forget: one envelope
/// per signaling event, no backpressure handling.
#[async_trait]
pub trait SignalSink: Send + Sync {
    async fn send(&self, envelope: Envelope) -> anyhow::Result<()>;
}
