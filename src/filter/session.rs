//! Last-seen request context
//!
//! Stream and outlet calls usually arrive without the user/model that started
//! the exchange, so the logger keeps what the latest inlet carried.

use serde_json::Value;

pub const UNKNOWN_MODEL: &str = "N/A";

#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub user: Value,
    pub model_id: String,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self {
            user: Value::Object(Default::default()),
            model_id: UNKNOWN_MODEL.to_string(),
        }
    }
}

impl SessionContext {
    /// Replace the stored context. Empty or null users are ignored.
    pub fn capture(&mut self, user: &Value, model: Option<&Value>) -> bool {
        if !is_present(user) {
            return false;
        }
        self.user = user.clone();
        self.model_id = model_id(model);
        true
    }
}

/// `id` of a model descriptor, or the placeholder
pub fn model_id(model: Option<&Value>) -> String {
    match model.and_then(|m| m.get("id")) {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Null) | None => UNKNOWN_MODEL.to_string(),
        Some(other) => other.to_string(),
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::String(s) => !s.is_empty(),
        Value::Bool(b) => *b,
        Value::Number(_) => true,
    }
}
