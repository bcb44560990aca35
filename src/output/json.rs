// JSON report for `titler generate --json`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::topics::model::{AggregatedResult, TopicTitles};

/// The aggregated result plus when and with which model it was produced.
#[derive(Debug, Serialize)]
pub struct TitleReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub model: &'a str,
    pub topic_titles: &'a [TopicTitles],
}

impl<'a> TitleReport<'a> {
    pub fn new(model: &'a str, result: &'a AggregatedResult) -> Self {
        Self {
            generated_at: Utc::now(),
            model,
            topic_titles: &result.topic_titles,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_keeps_topic_order_and_model() {
        let result = AggregatedResult::new(vec![
            TopicTitles::new("launches", vec!["Title A1".into(), "Title A2".into()]),
            TopicTitles::new("roadmap", vec!["Title B1".into(), "Title B2".into()]),
        ]);
        let json: serde_json::Value =
            serde_json::from_str(&TitleReport::new("gpt-4o-mini", &result).to_json_pretty().unwrap())
                .unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["topic_titles"][0]["topic"], "launches");
        assert_eq!(json["topic_titles"][1]["titles"][1], "Title B2");
        assert!(json["generated_at"].as_str().is_some());
    }
}
