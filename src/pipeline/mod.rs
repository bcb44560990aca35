// Pipeline coordination: extract topics, then fan out title generation.

pub mod coordinator;
pub mod state;
