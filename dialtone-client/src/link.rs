use crate::controller::CallCommand;
use crate::signal::SignalSink;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use dialtone_core::Envelope;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

/// Persistent full-duplex channel to the relay. Outbound envelopes go through
/// an unbounded queue drained by a writer task; inbound frames are decoded and
/// forwarded into the controller's command channel. Frames that do not parse
/// as envelopes are logged and skipped.
pub struct RelayLink {
    out_tx: mpsc::UnboundedSender<Message>,
}

impl RelayLink {
    pub async fn connect(url: &str, commands: mpsc::Sender<CallCommand>) -> Result<Self> {
        let (socket, _) = connect_async(url)
            .await
            .with_context(|| format!("failed to connect to relay at {url}"))?;
        info!("connected to relay at {}", url);

        let (mut write, mut read) = socket.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();

        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                if write.send(msg).await.is_err() {
                    break;
                }
            }
        });

        tokio::spawn(async move {
            while let Some(Ok(msg)) = read.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<Envelope>(&text) {
                        Ok(envelope) => {
                            if commands.send(CallCommand::Signal(envelope)).await.is_err() {
                                debug!("controller gone, closing relay reader");
                                break;
                            }
                        }
                        Err(e) => warn!("invalid envelope from relay: {e}"),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            info!("relay connection closed");
        });

        Ok(Self { out_tx })
    }
}

#[async_trait]
impl SignalSink for RelayLink {
    async fn send(&self, envelope: Envelope) -> Result<()> {
        let json = serde_json::to_string(&envelope).context("failed to serialize envelope")?;
        self.out_tx
            .send(Message::Text(json))
            .map_err(|_| anyhow!("relay connection closed"))
    }
}
