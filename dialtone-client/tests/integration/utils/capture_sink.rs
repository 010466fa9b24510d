use anyhow::{Result, anyhow};
use async_trait::async_trait;
use dialtone_client::signal::SignalSink;
use dialtone_core::Envelope;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Signal sink that hands every outbound envelope to the test.
pub struct CaptureSink {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl CaptureSink {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Envelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl SignalSink for CaptureSink {
    async fn send(&self, envelope: Envelope) -> Result<()> {
        self.tx
            .send(envelope)
            .map_err(|_| anyhow!("capture channel closed"))
    }
}
