use crate::error::CallError;
use crate::media::MediaStream;
use async_trait::async_trait;
use dialtone_core::UserId;
use std::sync::Arc;

/// Surface the controller talks to for user decisions and rendering. The
/// accept prompt is an asynchronous yes/no; dismissal maps to `false` and is
/// never left pending.
#[async_trait]
pub trait CallUi: Send + Sync {
    async fn prompt_accept(&self, caller: &UserId) -> bool;

    fn render_local_stream(&self, stream: Arc<dyn MediaStream>);

    fn render_remote_stream(&self, stream: Arc<dyn MediaStream>);

    /// The current call was torn down (hang-up, rejection, or failure).
    fn call_closed(&self);

    /// A call attempt failed before or during negotiation.
    fn call_failed(&self, error: &CallError);
}
