// Shared test doubles: a scripted model that answers both pipeline prompts.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use titler::error::InvocationError;
use titler::llm::schema::SchemaDescriptor;
use titler::llm::traits::{ModelInvoker, StructuredValue};
use titler::persona::ModelRequest;

/// Answers the extraction prompt with fixed topics and each title prompt
/// with the titles registered for that topic.
#[derive(Default)]
pub struct StubModel {
    pub topics: Vec<String>,
    pub titles: HashMap<String, Vec<String>>,
    pub failing_topic: Option<String>,
    pub extraction_calls: AtomicUsize,
    pub title_calls: AtomicUsize,
    pub seen_topics: Mutex<Vec<String>>,
}

impl StubModel {
    pub fn new(topics: &[&str]) -> Self {
        Self {
            topics: topics.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_titles(mut self, topic: &str, titles: &[&str]) -> Self {
        self.titles.insert(
            topic.to_string(),
            titles.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    pub fn failing_on(mut self, topic: &str) -> Self {
        self.failing_topic = Some(topic.to_string());
        self
    }
}

/// The topic a title prompt asks about (the prompt ends with "Topic: <topic>").
pub fn topic_from_prompt(prompt: &str) -> String {
    prompt
        .rsplit("Topic: ")
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[async_trait]
impl ModelInvoker for StubModel {
    async fn invoke(
        &self,
        request: &ModelRequest,
        schema: &SchemaDescriptor,
    ) -> Result<StructuredValue, InvocationError> {
        match schema.name() {
            "topics" => {
                self.extraction_calls.fetch_add(1, Ordering::SeqCst);
                Ok(json!({ "topics": self.topics }))
            }
            "topic_titles" => {
                self.title_calls.fetch_add(1, Ordering::SeqCst);
                let topic = topic_from_prompt(&request.user);
                self.seen_topics.lock().unwrap().push(topic.clone());
                if self.failing_topic.as_deref() == Some(topic.as_str()) {
                    return Err(InvocationError::Status {
                        status: 500,
                        body: "upstream exploded".to_string(),
                    });
                }
                let titles = self.titles.get(&topic).cloned().unwrap_or_default();
                Ok(json!({ "topic": topic, "titles": titles }))
            }
            other => Err(InvocationError::schema(other, "unexpected schema")),
        }
    }
}
