// Topic extractor trait: swap-ready abstraction.
//
// The default implementation asks a language model for the topics, but the
// pipeline only depends on this trait, so a local keyword extractor or a
// test stub can stand in without touching the coordinator.

use async_trait::async_trait;

use super::model::{InputText, TopicList};
use crate::error::ExtractionError;

/// Turns free text into an ordered list of topics.
///
/// Implementations are stateless between calls: the same input against a
/// deterministic backend yields the same TopicList.
#[async_trait]
pub trait TopicExtractor: Send + Sync {
    async fn extract(&self, text: &InputText) -> Result<TopicList, ExtractionError>;
}
