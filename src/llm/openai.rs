// OpenAI-compatible chat-completions invoker.
//
// Works against api.openai.com and any server exposing the same
// /chat/completions shape (Ollama, vLLM, LM Studio, OpenRouter, ...).
// JSON mode is requested and the expected schema is appended to the system
// prompt; the answer is then parsed and checked by llm::schema.
//
// API docs: https://platform.openai.com/docs/api-reference/chat

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rate_limiter::RateLimiter;
use super::retry::{with_retry, RetryPolicy};
use super::schema::{parse_structured, SchemaDescriptor};
use super::traits::{ModelInvoker, StructuredValue};
use crate::error::InvocationError;
use crate::output::truncate_chars;
use crate::persona::ModelRequest;

/// Default endpoint for OpenAI-compatible providers.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// How much of a prompt or answer to show in debug logs.
const LOG_PREVIEW_CHARS: usize = 200;

/// Model Invoker backed by an OpenAI-compatible HTTP API.
pub struct OpenAiInvoker {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
    rate_limiter: Option<RateLimiter>,
}

impl OpenAiInvoker {
    /// Create an invoker for `base_url` (e.g. `https://api.openai.com/v1`).
    ///
    /// `request_timeout` bounds each HTTP attempt, not the whole retry loop.
    pub fn new(base_url: &str, api_key: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("titler/", env!("CARGO_PKG_VERSION")))
            .timeout(request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
            rate_limiter: None,
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_rate_limiter(mut self, rate_limiter: Option<RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One HTTP attempt: send, check status, parse the completion.
    async fn send_once(
        &self,
        body: &ChatRequest<'_>,
        schema: &SchemaDescriptor,
    ) -> Result<StructuredValue, InvocationError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.acquire().await;
        }

        let url = format!("{}/chat/completions", self.base_url);
        let mut request = self.client.post(&url).json(body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| InvocationError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(InvocationError::Status { status, body });
        }

        let completion: ChatResponse = response.json().await.map_err(|e| {
            InvocationError::Provider(format!("malformed chat completion response: {e}"))
        })?;

        if let Some(error) = completion.error {
            return Err(InvocationError::Provider(error.message));
        }

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| InvocationError::Provider("completion had no content".to_string()))?;

        debug!(
            schema = schema.name(),
            answer_preview = %truncate_chars(&content, LOG_PREVIEW_CHARS),
            "Model answered"
        );

        parse_structured(&content, schema)
    }
}

#[async_trait]
impl ModelInvoker for OpenAiInvoker {
    async fn invoke(
        &self,
        request: &ModelRequest,
        schema: &SchemaDescriptor,
    ) -> Result<StructuredValue, InvocationError> {
        let system = format!("{}\n\n{}", request.system, schema.instruction());
        let body = ChatRequest {
            model: &request.options.model,
            temperature: request.options.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        debug!(
            model = body.model,
            schema = schema.name(),
            prompt_preview = %truncate_chars(&request.user, LOG_PREVIEW_CHARS),
            "Invoking model"
        );

        let body = &body;
        with_retry(&self.retry, move || self.send_once(body, schema)).await
    }
}

// --- Chat completions request/response types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}
