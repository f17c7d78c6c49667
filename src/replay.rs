//! Recorded pipeline traffic
//!
//! A transcript is JSONL, one hook call per line:
//!
//! ```text
//! {"hook":"inlet","body":{"messages":[..]},"user":{..},"model":{"id":".."}}
//! {"hook":"stream","event":{"choices":[{"delta":{"content":"Hi"}}]}}
//! {"hook":"stream","raw":"data: {..}\n\n"}
//! {"hook":"stream","raw_bytes":[255,0]}
//! {"hook":"outlet","body":{"messages":[..]},"user":{..},"model":{"id":".."}}
//! ```
//!
//! Keys the replayer does not read (timestamps, request ids) ride along with
//! the step and are written back unchanged.

use eyre::{Context, Result};
use serde_json::{Map, Value, json};

use crate::filter::{Filter, Hook, HookContext, StreamEvent};

/// How a stream chunk was written down in the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkForm {
    /// `"event"`: decoded JSON
    Event,
    /// `"raw"`: bytes given as a UTF-8 string
    Text,
    /// `"raw_bytes"`: bytes given as an array of numbers
    Bytes,
}

/// The hook a step calls and the payload it hands over
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Inlet(Value),
    Stream(StreamEvent, ChunkForm),
    Outlet(Value),
}

/// One recorded hook call
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub call: Call,
    pub user: Option<Value>,
    pub model: Option<Value>,
    /// Everything else on the line, `hook` included
    pub rest: Map<String, Value>,
}

impl Step {
    pub fn parse(line: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(line).context("Invalid JSON")?;
        let Value::Object(mut rest) = value else {
            eyre::bail!("Step must be a JSON object");
        };

        let hook = rest
            .get("hook")
            .and_then(|v| v.as_str())
            .ok_or_else(|| eyre::eyre!("Missing \"hook\" field"))?;
        let hook = Hook::from_str(hook).ok_or_else(|| eyre::eyre!("Unknown hook: {}", hook))?;

        let call = match hook {
            Hook::Inlet | Hook::Outlet => {
                let body = rest
                    .remove("body")
                    .ok_or_else(|| eyre::eyre!("Missing \"body\" for {} step", hook.as_str()))?;
                if hook == Hook::Inlet {
                    Call::Inlet(body)
                } else {
                    Call::Outlet(body)
                }
            }
            Hook::Stream => {
                let (event, form) = stream_event(&mut rest)?;
                Call::Stream(event, form)
            }
        };

        Ok(Step {
            call,
            user: rest.remove("user"),
            model: rest.remove("model"),
            rest,
        })
    }

    pub fn hook(&self) -> Hook {
        match self.call {
            Call::Inlet(_) => Hook::Inlet,
            Call::Stream(..) => Hook::Stream,
            Call::Outlet(_) => Hook::Outlet,
        }
    }

    /// Back to the transcript representation
    pub fn to_json(&self) -> Value {
        let mut record = self.rest.clone();
        match &self.call {
            Call::Inlet(body) | Call::Outlet(body) => {
                record.insert("body".into(), body.clone());
            }
            Call::Stream(event, form) => {
                let (key, value) = chunk_record(event, *form);
                record.insert(key.into(), value);
            }
        }

        if let Some(user) = &self.user {
            record.insert("user".into(), user.clone());
        }
        if let Some(model) = &self.model {
            record.insert("model".into(), model.clone());
        }
        Value::Object(record)
    }
}

fn stream_event(record: &mut Map<String, Value>) -> Result<(StreamEvent, ChunkForm)> {
    if let Some(bytes) = record.remove("raw_bytes") {
        let bytes: Vec<u8> = serde_json::from_value(bytes).context("\"raw_bytes\" must be an array of bytes")?;
        return Ok((StreamEvent::Raw(bytes), ChunkForm::Bytes));
    }
    if let Some(raw) = record.remove("raw") {
        let Value::String(text) = raw else {
            eyre::bail!("\"raw\" must be a string");
        };
        return Ok((StreamEvent::Raw(text.into_bytes()), ChunkForm::Text));
    }
    record
        .remove("event")
        .map(|event| (StreamEvent::from_value(event), ChunkForm::Event))
        .ok_or_else(|| eyre::eyre!("Stream step needs one of \"event\", \"raw\" or \"raw_bytes\""))
}

fn chunk_record(event: &StreamEvent, form: ChunkForm) -> (&'static str, Value) {
    match event {
        StreamEvent::Structured(map) => ("event", Value::Object(map.clone())),
        StreamEvent::Other(value) => ("event", value.clone()),
        StreamEvent::Raw(bytes) => match (form, std::str::from_utf8(bytes)) {
            (ChunkForm::Bytes, _) | (_, Err(_)) => ("raw_bytes", json!(bytes)),
            (_, Ok(text)) => ("raw", json!(text)),
        },
    }
}

/// Parse a whole transcript, skipping blank lines
pub fn parse_transcript(content: &str) -> Result<Vec<Step>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| Step::parse(line).with_context(|| format!("Invalid step on line {}", idx + 1)))
        .collect()
}

/// Feed one step through a filter and return it with the filter's output
pub async fn run_step<F: Filter>(filter: &mut F, step: Step) -> Step {
    let Step { call, user, model, rest } = step;
    let ctx = HookContext::new(user.as_ref(), model.as_ref());
    let call = match call {
        Call::Inlet(body) => Call::Inlet(filter.inlet(body, ctx).await),
        Call::Stream(event, form) => Call::Stream(filter.stream(event, ctx).await, form),
        Call::Outlet(body) => Call::Outlet(filter.outlet(body, ctx).await),
    };
    Step { call, user, model, rest }
}
