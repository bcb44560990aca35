// Pipeline data model: input text, topic lists, and the aggregated result.
//
// Serde shapes match the wire format shared by the CLI's --json output and
// the HTTP endpoint: {"topics": [...]}, {"topic": ..., "titles": [...]},
// {"topic_titles": [...]}.

use serde::{Deserialize, Serialize};

/// Raw text to analyze. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputText(String);

impl InputText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the text has no non-whitespace content.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for InputText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for InputText {
    fn from(text: String) -> Self {
        Self(text)
    }
}

/// Ordered topics extracted from an InputText. Order decides output order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicList {
    pub topics: Vec<String>,
}

impl TopicList {
    pub fn new(topics: Vec<String>) -> Self {
        Self { topics }
    }

    /// Trim each topic and drop empty ones, keeping the order of the rest.
    /// Duplicates are kept: every entry is its own unit of work.
    pub fn normalized(self) -> Self {
        Self {
            topics: self
                .topics
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.topics.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for TopicList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Generated titles for one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicTitles {
    pub topic: String,
    pub titles: Vec<String>,
}

impl TopicTitles {
    pub fn new(topic: impl Into<String>, titles: Vec<String>) -> Self {
        Self {
            topic: topic.into(),
            titles,
        }
    }
}

/// One TopicTitles per input topic, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub topic_titles: Vec<TopicTitles>,
}

impl AggregatedResult {
    pub fn new(topic_titles: Vec<TopicTitles>) -> Self {
        Self { topic_titles }
    }

    pub fn len(&self) -> usize {
        self.topic_titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topic_titles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TopicTitles> {
        self.topic_titles.iter()
    }

    /// Topics in result order.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.topic_titles.iter().map(|t| t.topic.as_str())
    }

    /// Total number of titles across all topics.
    pub fn title_count(&self) -> usize {
        self.topic_titles.iter().map(|t| t.titles.len()).sum()
    }
}

impl IntoIterator for AggregatedResult {
    type Item = TopicTitles;
    type IntoIter = std::vec::IntoIter<TopicTitles>;

    fn into_iter(self) -> Self::IntoIter {
        self.topic_titles.into_iter()
    }
}

impl<'a> IntoIterator for &'a AggregatedResult {
    type Item = &'a TopicTitles;
    type IntoIter = std::slice::Iter<'a, TopicTitles>;

    fn into_iter(self) -> Self::IntoIter {
        self.topic_titles.iter()
    }
}
