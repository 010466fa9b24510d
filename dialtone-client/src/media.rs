use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub struct VideoSize {
    pub width: u32,
    pub height: u32,
}

/// Capture constraints passed to [`MediaSource::acquire`].
#[derive(Debug, Clone)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: Option<VideoSize>,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            audio: true,
            video: Some(VideoSize {
                width: 1280,
                height: 720,
            }),
        }
    }
}

/// Handle to an acquired local stream or a surfaced remote stream.
pub trait MediaStream: Send + Sync {
    fn has_audio(&self) -> bool;

    fn has_video(&self) -> bool;

    /// Stop all tracks. Must be safe to call more than once.
    fn stop(&self);
}

/// Media-capture primitive (camera/microphone). Implemented by the embedding
/// shell; the controller only routes failures into teardown.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire(&self, constraints: &MediaConstraints) -> anyhow::Result<Arc<dyn MediaStream>>;
}
