//! Bordered log entry formatting for INLET and OUTLET hooks

use serde_json::Value;
use std::borrow::Cow;

const BORDER: usize = 30;
const PLACEHOLDER: &str = "N/A";

/// Which hook produced an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Inlet,
    Outlet,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Inlet => "INLET",
            EntryKind::Outlet => "OUTLET",
        }
    }
}

/// A single bordered entry, rendered into console lines
pub struct LogEntry<'a> {
    pub kind: EntryKind,
    pub user: &'a Value,
    pub model_id: &'a str,
    pub message: &'a Value,
    pub truncate: usize,
    pub identity_detail: bool,
}

impl LogEntry<'_> {
    pub fn lines(&self) -> Vec<String> {
        let kind = self.kind.as_str();
        let mut lines = vec![
            String::new(),
            format!("{} [DEV_LOGGER | {}] {}", "-".repeat(BORDER), kind, "-".repeat(BORDER)),
            format!("USER: {} (Role: {})", display_name(self.user), str_field(self.user, "role")),
            format!("MODEL: {}", self.model_id),
            format!("MESSAGE (Role: {}):", str_field(self.message, "role")),
            truncate_content(&content_text(self.message), self.truncate).into_owned(),
        ];

        if self.kind == EntryKind::Inlet && self.identity_detail {
            match serde_json::to_string_pretty(self.user) {
                Ok(details) => {
                    lines.push("USER details:".to_string());
                    lines.push(details);
                }
                Err(e) => lines.push(format!("Failed to serialize user details: {}", e)),
            }
        }

        lines.push("-".repeat(2 * BORDER + 4 + kind.len()));
        lines.push(String::new());
        lines
    }
}

/// Cut `content` to `limit` characters and note how many were dropped.
/// A limit of 0 leaves the content alone.
pub fn truncate_content(content: &str, limit: usize) -> Cow<'_, str> {
    if limit == 0 {
        return Cow::Borrowed(content);
    }

    match content.char_indices().nth(limit) {
        Some((cut, _)) => {
            let omitted = content[cut..].chars().count();
            Cow::Owned(format!("{}... [truncated, {} chars omitted]", &content[..cut], omitted))
        }
        None => Cow::Borrowed(content),
    }
}

fn display_name(user: &Value) -> &str {
    user.get("email")
        .and_then(|v| v.as_str())
        .or_else(|| user.get("name").and_then(|v| v.as_str()))
        .unwrap_or(PLACEHOLDER)
}

fn str_field<'v>(value: &'v Value, key: &str) -> &'v str {
    value.get(key).and_then(|v| v.as_str()).unwrap_or(PLACEHOLDER)
}

fn content_text(message: &Value) -> Cow<'_, str> {
    match message.get("content") {
        Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(other) => Cow::Owned(other.to_string()),
    }
}
