use anyhow::{Result, bail};
use async_trait::async_trait;
use dialtone_client::media::{MediaConstraints, MediaSource, MediaStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub struct MockStream {
    audio: bool,
    video: bool,
    pub stopped: AtomicBool,
}

impl MockStream {
    /// A free-standing stream, for injecting remote-media transport events.
    pub fn standalone() -> Arc<Self> {
        Arc::new(Self {
            audio: true,
            video: true,
            stopped: AtomicBool::new(false),
        })
    }
}

impl MediaStream for MockStream {
    fn has_audio(&self) -> bool {
        self.audio
    }

    fn has_video(&self) -> bool {
        self.video
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

/// Mock camera/microphone. Remembers every acquired stream so tests can check
/// that teardown stopped its tracks.
#[derive(Default)]
pub struct MockMedia {
    pub fail: AtomicBool,
    streams: Mutex<Vec<Arc<MockStream>>>,
}

impl MockMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquired(&self) -> usize {
        self.streams.lock().unwrap().len()
    }

    pub fn last_stream(&self) -> Arc<MockStream> {
        self.streams
            .lock()
            .unwrap()
            .last()
            .expect("no stream was acquired")
            .clone()
    }
}

#[async_trait]
impl MediaSource for MockMedia {
    async fn acquire(&self, constraints: &MediaConstraints) -> Result<Arc<dyn MediaStream>> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("camera unavailable");
        }

        let stream = Arc::new(MockStream {
            audio: constraints.audio,
            video: constraints.video.is_some(),
            stopped: AtomicBool::new(false),
        });
        self.streams.lock().unwrap().push(stream.clone());
        Ok(stream)
    }
}
