// Output schemas and tolerant JSON parsing for model answers.
//
// Models asked for JSON sometimes wrap it in Markdown code fences or add a
// sentence before it. parse_structured strips the fence, parses the JSON, and
// checks the top-level required keys before anything is deserialized.

use std::sync::OnceLock;

use regex_lite::Regex;
use serde_json::{json, Value};

use super::traits::StructuredValue;
use crate::error::InvocationError;

/// Name plus JSON Schema for an expected model answer.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    name: String,
    json_schema: Value,
}

impl SchemaDescriptor {
    pub fn new(name: impl Into<String>, json_schema: Value) -> Self {
        Self {
            name: name.into(),
            json_schema,
        }
    }

    /// `{"topics": ["..."]}`
    pub fn topics() -> Self {
        Self::new(
            "topics",
            json!({
                "type": "object",
                "properties": {
                    "topics": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["topics"]
            }),
        )
    }

    /// `{"topic": "...", "titles": ["...", "..."]}`
    pub fn topic_titles() -> Self {
        Self::new(
            "topic_titles",
            json!({
                "type": "object",
                "properties": {
                    "topic": { "type": "string" },
                    "titles": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["titles"]
            }),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn json_schema(&self) -> &Value {
        &self.json_schema
    }

    /// Keys listed under the schema's top-level `required`.
    pub fn required_keys(&self) -> Vec<&str> {
        self.json_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|keys| keys.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Instruction appended to the system prompt so the model answers in shape.
    pub fn instruction(&self) -> String {
        format!(
            "Respond strictly as a single JSON object matching this JSON Schema, \
             with no surrounding prose:\n{}",
            self.json_schema
        )
    }
}

const FENCE_PATTERN: &str = r"(?s)```(?:[A-Za-z]+)?\s*(.*?)\s*```";

fn fence_regex() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(FENCE_PATTERN).ok()).as_ref()
}

/// Pull the JSON payload out of a model answer.
///
/// Order of attempts: a fenced block, then the span from the first `{` to
/// the last `}`, then the trimmed text as-is.
pub fn extract_json_payload(raw: &str) -> &str {
    if let Some(inner) = fence_regex()
        .and_then(|re| re.captures(raw))
        .and_then(|c| c.get(1))
    {
        return inner.as_str();
    }
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => raw.trim(),
    }
}

/// Parse a raw model answer into a JSON object carrying the schema's required keys.
pub fn parse_structured(
    raw: &str,
    schema: &SchemaDescriptor,
) -> Result<StructuredValue, InvocationError> {
    let payload = extract_json_payload(raw);
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| InvocationError::schema(schema.name(), format!("invalid JSON: {e}")))?;

    let object = value
        .as_object()
        .ok_or_else(|| InvocationError::schema(schema.name(), "expected a JSON object"))?;

    if let Some(missing) = schema
        .required_keys()
        .into_iter()
        .find(|key| !object.contains_key(*key))
    {
        return Err(InvocationError::schema(
            schema.name(),
            format!("missing required field `{missing}`"),
        ));
    }

    Ok(value)
}
