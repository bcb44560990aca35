// Title generation: one model call per topic, fanned out under a concurrency cap.

pub mod fan_out;
pub mod llm;
pub mod traits;
