//! Stream chunk shapes
//!
//! Chunks reach the filter either as decoded JSON objects (frontend path) or
//! as raw protocol bytes straight from the API (e.g. SSE `data:` frames).

use serde_json::{Map, Value};
use std::borrow::Cow;

/// One unit of incremental generation output
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// JSON object, normally `{"choices":[{"delta":{"content":..}}]}`
    Structured(Map<String, Value>),
    /// Raw bytes, not necessarily valid UTF-8
    Raw(Vec<u8>),
    /// Any other JSON value
    Other(Value),
}

impl StreamEvent {
    /// Classify a decoded JSON value
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => StreamEvent::Structured(map),
            other => StreamEvent::Other(other),
        }
    }

    /// Delta carried by a structured chunk, if any. Non-string content is
    /// rendered as JSON; null and `""` count as no content.
    pub fn delta_content(map: &Map<String, Value>) -> Option<Cow<'_, str>> {
        let content = map
            .get("choices")
            .and_then(|v| v.as_array())
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("delta"))
            .and_then(|delta| delta.get("content"))?;

        match content {
            Value::Null => None,
            Value::String(text) if text.is_empty() => None,
            Value::String(text) => Some(Cow::Borrowed(text.as_str())),
            other => Some(Cow::Owned(other.to_string())),
        }
    }
}

/// JSON kind name used in unknown-shape entries
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
