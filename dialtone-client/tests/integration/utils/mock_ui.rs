use async_trait::async_trait;
use dialtone_client::error::CallError;
use dialtone_client::media::MediaStream;
use dialtone_client::ui::CallUi;
use dialtone_core::UserId;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, mpsc};

/// Scripted UI. Either answers every accept prompt with a fixed decision, or
/// blocks until the test feeds one through the decision channel.
pub struct MockUi {
    auto_decision: Option<bool>,
    decisions: Mutex<mpsc::UnboundedReceiver<bool>>,
    pub prompts: StdMutex<Vec<UserId>>,
    pub failures: StdMutex<Vec<String>>,
    pub closed: AtomicUsize,
    pub local_rendered: AtomicBool,
    pub remote_rendered: AtomicBool,
}

impl MockUi {
    pub fn auto(decision: bool) -> Arc<Self> {
        let (_tx, rx) = mpsc::unbounded_channel();
        Arc::new(Self::with_parts(Some(decision), rx))
    }

    pub fn manual() -> (Arc<Self>, mpsc::UnboundedSender<bool>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self::with_parts(None, rx)), tx)
    }

    fn with_parts(auto_decision: Option<bool>, rx: mpsc::UnboundedReceiver<bool>) -> Self {
        Self {
            auto_decision,
            decisions: Mutex::new(rx),
            prompts: StdMutex::new(Vec::new()),
            failures: StdMutex::new(Vec::new()),
            closed: AtomicUsize::new(0),
            local_rendered: AtomicBool::new(false),
            remote_rendered: AtomicBool::new(false),
        }
    }

    pub fn prompted_by(&self, caller: &UserId) -> bool {
        self.prompts.lock().unwrap().contains(caller)
    }

    pub fn failure_count(&self) -> usize {
        self.failures.lock().unwrap().len()
    }
}

#[async_trait]
impl CallUi for MockUi {
    async fn prompt_accept(&self, caller: &UserId) -> bool {
        self.prompts.lock().unwrap().push(caller.clone());
        match self.auto_decision {
            Some(decision) => decision,
            // A dropped sender counts as a dismissed prompt.
            None => self.decisions.lock().await.recv().await.unwrap_or(false),
        }
    }

    fn render_local_stream(&self, _stream: Arc<dyn MediaStream>) {
        self.local_rendered.store(true, Ordering::SeqCst);
    }

    fn render_remote_stream(&self, _stream: Arc<dyn MediaStream>) {
        self.remote_rendered.store(true, Ordering::SeqCst);
    }

    fn call_closed(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }

    fn call_failed(&self, error: &CallError) {
        self.failures.lock().unwrap().push(error.to_string());
    }
}
