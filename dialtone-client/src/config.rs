use crate::media::MediaConstraints;
use dialtone_core::UserId;

/// Controller configuration. The local identity is injected here rather than
/// read from ambient UI state, so a controller always knows who it is
/// filtering envelopes for.
#[derive(Debug, Clone)]
pub struct CallConfig {
    pub local_user: UserId,
    pub media: MediaConstraints,
}

impl CallConfig {
    pub fn new(local_user: impl Into<UserId>) -> Self {
        Self {
            local_user: local_user.into(),
            media: MediaConstraints::default(),
        }
    }

    pub fn with_media(mut self, media: MediaConstraints) -> Self {
        self.media = media;
        self
    }
}
