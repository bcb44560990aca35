// Pipeline coordinator: the two-stage sequence behind every entry point.
//
// 1. Extract an ordered topic list from the input text (one model call)
// 2. Generate titles per topic under the concurrency cap (one call per topic)
//
// The coordinator is pass-through: it never retries and never recovers.
// Each run ends in exactly one AggregatedResult or one PipelineError.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use super::state::{RunState, RunTracker};
use crate::error::{ExtractionError, PipelineError};
use crate::llm::traits::ModelInvoker;
use crate::persona::Persona;
use crate::titles::fan_out;
use crate::titles::llm::LlmTopicTitler;
use crate::titles::traits::TopicTitler;
use crate::topics::extractor::LlmTopicExtractor;
use crate::topics::model::{AggregatedResult, InputText, TopicList};
use crate::topics::traits::TopicExtractor;

/// A configured two-stage pipeline. Cheap to clone; runs share nothing.
#[derive(Clone)]
pub struct Pipeline {
    extractor: Arc<dyn TopicExtractor>,
    titler: Arc<dyn TopicTitler>,
    max_concurrency: NonZeroUsize,
}

impl Pipeline {
    pub fn new(
        extractor: Arc<dyn TopicExtractor>,
        titler: Arc<dyn TopicTitler>,
        max_concurrency: NonZeroUsize,
    ) -> Self {
        Self {
            extractor,
            titler,
            max_concurrency,
        }
    }

    /// Both stages backed by the same model and persona.
    pub fn from_invoker(
        invoker: Arc<dyn ModelInvoker>,
        persona: Persona,
        max_concurrency: NonZeroUsize,
    ) -> Self {
        Self::new(
            Arc::new(LlmTopicExtractor::new(invoker.clone(), persona.clone())),
            Arc::new(LlmTopicTitler::new(invoker, persona)),
            max_concurrency,
        )
    }

    /// Same stages with a different concurrency cap.
    pub fn with_max_concurrency(&self, max_concurrency: NonZeroUsize) -> Self {
        Self {
            max_concurrency,
            ..self.clone()
        }
    }

    pub fn max_concurrency(&self) -> NonZeroUsize {
        self.max_concurrency
    }

    /// Run only the first stage.
    pub async fn extract_topics(&self, text: &InputText) -> Result<TopicList, ExtractionError> {
        self.extractor.extract(text).await
    }

    /// Run both stages once.
    pub async fn run(&self, text: &InputText) -> Result<AggregatedResult, PipelineError> {
        let mut tracker = RunTracker::new();

        tracker.advance(RunState::Extracting);
        let topics = match self.extractor.extract(text).await {
            Ok(topics) => {
                tracker.advance(RunState::Extracted);
                topics
            }
            Err(e) => {
                tracker.advance(RunState::ExtractFailed);
                error!(error = %e, "Topic extraction failed");
                return Err(e.into());
            }
        };

        tracker.advance(RunState::Generating);
        match fan_out::generate(&topics, self.max_concurrency, self.titler.as_ref()).await {
            Ok(result) => {
                tracker.advance(RunState::Completed);
                info!(
                    topics = result.len(),
                    titles = result.title_count(),
                    "Pipeline completed"
                );
                Ok(result)
            }
            Err(e) => {
                tracker.advance(RunState::GenerateFailed);
                error!(index = e.index(), topic = e.topic(), error = %e, "Title generation failed");
                Err(e.into())
            }
        }
    }

    /// Run both stages, abandoning everything if `deadline` elapses first.
    ///
    /// On timeout every in-flight call is dropped and no partial result is
    /// returned.
    pub async fn run_with_deadline(
        &self,
        text: &InputText,
        deadline: Option<Duration>,
    ) -> Result<AggregatedResult, PipelineError> {
        let Some(limit) = deadline else {
            return self.run(text).await;
        };

        match tokio::time::timeout(limit, self.run(text)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(deadline_ms = limit.as_millis() as u64, "Pipeline run timed out");
                Err(PipelineError::TimedOut(limit))
            }
        }
    }
}
