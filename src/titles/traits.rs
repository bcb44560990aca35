// Per-topic title source: the unit of work the fan-out dispatches.

use async_trait::async_trait;

use crate::error::InvocationError;
use crate::topics::model::TopicTitles;

/// Produces titles for a single topic with exactly one outbound call.
///
/// The returned TopicTitles must carry the `topic` it was asked about.
#[async_trait]
pub trait TopicTitler: Send + Sync {
    async fn titles_for(&self, topic: &str) -> Result<TopicTitles, InvocationError>;
}
