use axum::extract::ws::Message;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

/// Relay-internal connection identifier. Unrelated to user identity, which
/// the relay never inspects.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct ConnId(Uuid);

impl ConnId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct RelayInner {
    conns: DashMap<ConnId, mpsc::UnboundedSender<Message>>,
}

/// Stateless fan-out: every inbound frame goes to all connections except its
/// sender. Payloads are opaque; addressing and call semantics live entirely
/// in the clients.
#[derive(Clone)]
pub struct RelayService {
    inner: Arc<RelayInner>,
}

impl RelayService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RelayInner {
                conns: DashMap::new(),
            }),
        }
    }

    pub fn add_conn(&self, id: ConnId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.conns.insert(id, tx);
    }

    pub fn remove_conn(&self, id: &ConnId) {
        self.inner.conns.remove(id);
    }

    pub fn conn_count(&self) -> usize {
        self.inner.conns.len()
    }

    /// Deliver `msg` to every connection except `from`. A failed send only
    /// loses that connection's copy; the peer is cleaned up when its socket
    /// task exits.
    pub fn broadcast(&self, from: ConnId, msg: Message) {
        for entry in self.inner.conns.iter() {
            if *entry.key() == from {
                continue;
            }
            if entry.value().send(msg.clone()).is_err() {
                warn!("dropping frame for disconnected conn {}", entry.key());
            }
        }
    }
}

impl Default for RelayService {
    fn default() -> Self {
        Self::new()
    }
}
