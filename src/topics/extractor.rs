// Model-backed topic extraction.
//
// One Model Invoker call per input text. The answer must parse as
// {"topics": [...]}; anything else surfaces as an ExtractionError without
// retrying here (retries belong to the invoker).

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::model::{InputText, TopicList};
use super::traits::TopicExtractor;
use crate::error::ExtractionError;
use crate::llm::schema::SchemaDescriptor;
use crate::llm::traits::{invoke_typed, ModelInvoker};
use crate::persona::Persona;

/// Extracts 1–3 key topics by asking the model.
pub struct LlmTopicExtractor {
    invoker: Arc<dyn ModelInvoker>,
    persona: Persona,
}

impl LlmTopicExtractor {
    pub fn new(invoker: Arc<dyn ModelInvoker>, persona: Persona) -> Self {
        Self { invoker, persona }
    }
}

/// Prompt asking for the key topics of `text`.
pub fn extraction_prompt(text: &str) -> String {
    format!(
        "Extract 1-3 key topics from the following text.\n\
         Answer as {{\"topics\": [\"...\"]}}.\n\n\
         Text:\n{text}"
    )
}

#[async_trait]
impl TopicExtractor for LlmTopicExtractor {
    async fn extract(&self, text: &InputText) -> Result<TopicList, ExtractionError> {
        debug!(chars = text.as_str().chars().count(), "Extracting topics");

        let request = self.persona.request(extraction_prompt(text.as_str()));
        let topics: TopicList =
            invoke_typed(self.invoker.as_ref(), &request, &SchemaDescriptor::topics()).await?;
        let topics = topics.normalized();

        info!(count = topics.len(), topics = ?topics.topics, "Topics extracted");
        Ok(topics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvocationError;
    use crate::llm::traits::StructuredValue;
    use crate::persona::ModelRequest;
    use serde_json::json;
    use std::sync::Mutex;

    /// Returns a fixed answer and records every prompt it sees.
    struct ScriptedInvoker {
        answer: Result<StructuredValue, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedInvoker {
        fn ok(answer: StructuredValue) -> Self {
            Self {
                answer: Ok(answer),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                answer: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ModelInvoker for ScriptedInvoker {
        async fn invoke(
            &self,
            request: &ModelRequest,
            _schema: &SchemaDescriptor,
        ) -> Result<StructuredValue, InvocationError> {
            self.prompts.lock().unwrap().push(request.user.clone());
            self.answer.clone().map_err(InvocationError::Transport)
        }
    }

    #[tokio::test]
    async fn extracts_topics_in_model_order() {
        let invoker = Arc::new(ScriptedInvoker::ok(json!({ "topics": ["launches", "roadmap"] })));
        let extractor = LlmTopicExtractor::new(invoker.clone(), Persona::default());

        let topics = extractor
            .extract(&InputText::new("product launches and roadmap"))
            .await
            .unwrap();

        assert_eq!(topics.topics, vec!["launches", "roadmap"]);
        let prompts = invoker.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1, "exactly one outbound call");
        assert!(prompts[0].contains("product launches and roadmap"));
    }

    #[tokio::test]
    async fn normalizes_whitespace_and_blank_topics() {
        let invoker = Arc::new(ScriptedInvoker::ok(json!({ "topics": ["  graphs ", "", "agents"] })));
        let extractor = LlmTopicExtractor::new(invoker, Persona::default());
        let topics = extractor.extract(&InputText::new("x")).await.unwrap();
        assert_eq!(topics.topics, vec!["graphs", "agents"]);
    }

    #[tokio::test]
    async fn invoker_failure_is_extraction_error() {
        let invoker = Arc::new(ScriptedInvoker::failing("connection reset"));
        let extractor = LlmTopicExtractor::new(invoker, Persona::default());
        let err = extractor.extract(&InputText::new("x")).await.unwrap_err();
        assert!(matches!(err.source, InvocationError::Transport(_)));
    }

    #[tokio::test]
    async fn wrong_shape_is_extraction_error() {
        let invoker = Arc::new(ScriptedInvoker::ok(json!({ "topics": [1, 2] })));
        let extractor = LlmTopicExtractor::new(invoker, Persona::default());
        let err = extractor.extract(&InputText::new("x")).await.unwrap_err();
        assert!(matches!(err.source, InvocationError::Schema { .. }));
    }
}
