// Error taxonomy for the title pipeline.
//
// Each stage has its own error type so callers can tell which stage failed
// without string matching. The Model Invoker only distinguishes success from
// failure; provider detail is carried as a message, never inspected.

use thiserror::Error;

/// A single Model Invoker call failed.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// Network failure or timeout.
    #[error("model request failed: {0}")]
    Transport(String),

    /// The provider returned a non-success HTTP status.
    #[error("model provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider answered but reported an error of its own.
    #[error("model provider error: {0}")]
    Provider(String),

    /// The response could not be parsed into the expected schema.
    #[error("response did not match schema `{schema}`: {reason}")]
    Schema { schema: String, reason: String },
}

impl InvocationError {
    pub fn schema(schema: &str, reason: impl Into<String>) -> Self {
        Self::Schema {
            schema: schema.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether another attempt could plausibly succeed: network failures,
    /// rate limiting (429) and server-side errors (5xx).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Provider(_) | Self::Schema { .. } => false,
        }
    }
}

/// The Topic Extractor's single call failed or returned unparseable output.
#[derive(Debug, Error)]
#[error("topic extraction failed: {source}")]
pub struct ExtractionError {
    #[from]
    pub source: InvocationError,
}

/// The fan-out stage failed. Wraps the first failure observed; every other
/// in-flight call was abandoned at that point.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("title generation failed for topic #{index} `{topic}`: {source}")]
    Topic {
        index: usize,
        topic: String,
        #[source]
        source: InvocationError,
    },
}

impl GenerationError {
    /// Position of the failing topic in the input list.
    pub fn index(&self) -> usize {
        match self {
            Self::Topic { index, .. } => *index,
        }
    }

    /// The failing topic string.
    pub fn topic(&self) -> &str {
        match self {
            Self::Topic { topic, .. } => topic,
        }
    }
}

/// Terminal error of one pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The caller's deadline elapsed; all in-flight calls were dropped.
    #[error("pipeline run exceeded its {0:?} deadline")]
    TimedOut(std::time::Duration),
}

impl PipelineError {
    /// Short stage label used by the caller-facing boundaries.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Extraction(_) => "extraction",
            Self::Generation(_) => "generation",
            Self::TimedOut(_) => "timeout",
        }
    }
}
