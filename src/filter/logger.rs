//! Developer-mode request/response logger
//!
//! Prints every exchange that passes through the pipeline to the console.
//! It never touches the payloads: each hook returns exactly what it received,
//! and anything that goes wrong while printing is reported and swallowed.

use eyre::{Context, Result};
use serde_json::{Map, Value};

use super::entry::{EntryKind, LogEntry};
use super::event::{StreamEvent, kind_name};
use super::session::{SessionContext, model_id};
use super::{Filter, Hook, HookContext, Valves};
use crate::sink::ConsoleSink;

/// Characters of an unrecognised chunk that make it into the log
const UNKNOWN_PREVIEW: usize = 100;

pub struct DevLogger {
    valves: Valves,
    session: SessionContext,
    sink: Box<dyn ConsoleSink>,
}

impl DevLogger {
    pub fn new(valves: Valves, sink: Box<dyn ConsoleSink>) -> Self {
        Self {
            valves,
            session: SessionContext::default(),
            sink,
        }
    }

    pub fn valves(&self) -> &Valves {
        &self.valves
    }

    /// Operators may flip switches between calls
    pub fn valves_mut(&mut self) -> &mut Valves {
        &mut self.valves
    }

    fn emit(&self, line: &str) -> Result<()> {
        self.sink.write_line(line).context("Failed to write to console")
    }

    fn print_entry(&self, kind: EntryKind, user: &Value, model_id: &str, message: &Value) -> Result<()> {
        let entry = LogEntry {
            kind,
            user,
            model_id,
            message,
            truncate: self.valves.truncate_message,
            identity_detail: self.valves.log_identity_detail,
        };

        for line in entry.lines() {
            self.emit(&line)?;
        }
        Ok(())
    }

    fn log_inlet(&self, body: &Value) -> Result<()> {
        let empty = Value::Object(Map::new());
        let last = body
            .get("messages")
            .and_then(|v| v.as_array())
            .and_then(|messages| messages.last())
            .unwrap_or(&empty);

        self.print_entry(EntryKind::Inlet, &self.session.user, &self.session.model_id, last)
    }

    fn log_stream(&self, event: &StreamEvent) -> Result<()> {
        match event {
            StreamEvent::Structured(map) => {
                if let Some(content) = StreamEvent::delta_content(map) {
                    self.emit(&format!("[DEV_LOGGER | STREAM] (Dict) AI streaming: {}", content))?;
                }
            }
            StreamEvent::Raw(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => {
                    self.emit(&format!("[DEV_LOGGER | STREAM] (Bytes) AI streaming: {}", text.trim()))?;
                }
                Err(e) => {
                    log::debug!("Stream chunk is not UTF-8 ({}), printing raw bytes", e);
                    self.emit(&format!(
                        "[DEV_LOGGER | STREAM] (Bytes, raw) AI streaming: b\"{}\"",
                        bytes.escape_ascii()
                    ))?;
                }
            },
            StreamEvent::Other(value) => {
                let preview: String = match value {
                    Value::String(s) => s.chars().take(UNKNOWN_PREVIEW).collect(),
                    other => other.to_string().chars().take(UNKNOWN_PREVIEW).collect(),
                };
                self.emit(&format!(
                    "[DEV_LOGGER | STREAM] (Unknown Type: {}) Data: {}",
                    kind_name(value),
                    preview
                ))?;
            }
        }
        Ok(())
    }

    fn log_outlet(&self, body: &Value, model: Option<&Value>) -> Result<()> {
        let empty = Value::Object(Map::new());
        let last_reply = body
            .get("messages")
            .and_then(|v| v.as_array())
            .and_then(|messages| {
                messages
                    .iter()
                    .rev()
                    .find(|msg| msg.get("role").and_then(|r| r.as_str()) == Some("assistant"))
            })
            .unwrap_or(&empty);

        // OUTLET reports the user captured by the last inlet, not the one passed in
        self.print_entry(EntryKind::Outlet, &self.session.user, &model_id(model), last_reply)
    }

    /// Report a failure inside a hook without letting it escape
    fn report(&self, hook: Hook, err: eyre::Report) {
        let line = match hook {
            Hook::Stream => format!("[DEV_LOGGER] STREAM internal error: {:#}", err),
            other => format!("[DEV_LOGGER] Error while logging {}: {:#}", other.as_str(), err),
        };

        log::warn!("{}", line);
        if let Err(e) = self.sink.write_line(&line) {
            log::error!("Console sink unavailable, dropped diagnostic: {}", e);
        }
    }
}

impl Filter for DevLogger {
    fn priority(&self) -> i32 {
        self.valves.priority
    }

    async fn inlet(&mut self, body: Value, ctx: HookContext<'_>) -> Value {
        // Captured even while disabled so later stream/outlet calls have context
        if let Some(user) = ctx.user()
            && !self.session.capture(user, ctx.model)
        {
            log::debug!("Empty user descriptor, keeping the stored session context");
        }

        if !self.valves.enabled || !self.valves.log_inlet || ctx.user().is_none() {
            return body;
        }

        if let Err(e) = self.log_inlet(&body) {
            self.report(Hook::Inlet, e);
        }
        body
    }

    async fn stream(&self, event: StreamEvent, _ctx: HookContext<'_>) -> StreamEvent {
        if !self.valves.enabled || !self.valves.log_stream {
            return event;
        }

        if let Err(e) = self.log_stream(&event) {
            self.report(Hook::Stream, e);
        }
        event
    }

    async fn outlet(&self, body: Value, ctx: HookContext<'_>) -> Value {
        if !self.valves.enabled || !self.valves.log_outlet || ctx.user().is_none() {
            return body;
        }

        if let Err(e) = self.log_outlet(&body, ctx.model) {
            self.report(Hook::Outlet, e);
        }
        body
    }
}
