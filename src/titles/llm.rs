// Model-backed title generation for a single topic.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::traits::TopicTitler;
use crate::error::InvocationError;
use crate::llm::schema::SchemaDescriptor;
use crate::llm::traits::{invoke_typed, ModelInvoker};
use crate::persona::Persona;
use crate::topics::model::TopicTitles;

/// Asks the model for two catchy titles per topic.
pub struct LlmTopicTitler {
    invoker: Arc<dyn ModelInvoker>,
    persona: Persona,
}

impl LlmTopicTitler {
    pub fn new(invoker: Arc<dyn ModelInvoker>, persona: Persona) -> Self {
        Self { invoker, persona }
    }
}

/// Prompt asking for titles about `topic`.
pub fn titles_prompt(topic: &str) -> String {
    format!(
        "Generate exactly two catchy blog titles for the topic below.\n\
         Answer as {{\"topic\": \"...\", \"titles\": [\"...\", \"...\"]}}.\n\n\
         Topic: {topic}"
    )
}

/// The model may echo the topic back reworded; only `titles` is trusted.
#[derive(Deserialize)]
struct TitlesAnswer {
    titles: Vec<String>,
}

#[async_trait]
impl TopicTitler for LlmTopicTitler {
    async fn titles_for(&self, topic: &str) -> Result<TopicTitles, InvocationError> {
        let request = self.persona.request(titles_prompt(topic));
        let answer: TitlesAnswer = invoke_typed(
            self.invoker.as_ref(),
            &request,
            &SchemaDescriptor::topic_titles(),
        )
        .await?;

        let titles: Vec<String> = answer
            .titles
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        debug!(topic, count = titles.len(), "Titles generated");
        Ok(TopicTitles::new(topic, titles))
    }
}
