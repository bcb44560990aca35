// titler: topic extraction and bounded fan-out title generation.
//
// This is the library root. The pipeline is two stages, each behind a
// trait: topics::traits::TopicExtractor, then titles::traits::TopicTitler
// fanned out by titles::fan_out. Both default implementations talk to a
// model through llm::traits::ModelInvoker.

pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod persona;
pub mod pipeline;
pub mod status;
pub mod titles;
pub mod topics;

#[cfg(feature = "web")]
pub mod web;
