// Model invocation: the boundary between the pipeline and a language model.
//
// The ModelInvoker trait is the only thing the pipeline stages see. OpenAiInvoker
// implements it against any OpenAI-compatible chat-completions endpoint; tests
// swap in stubs without touching the stages.

pub mod openai;
pub mod rate_limiter;
pub mod retry;
pub mod schema;
pub mod traits;
