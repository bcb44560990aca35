// Topic extraction: turn free text into an ordered list of topics.

pub mod extractor;
pub mod model;
pub mod traits;
