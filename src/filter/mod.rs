//! Pipeline filter hooks
//!
//! A host pipeline calls a filter at three points of a chat exchange: `inlet`
//! before the model runs, `stream` for every generated chunk, and `outlet` once
//! the response is complete. Filters observe; whatever they return is what the
//! pipeline continues with.

use serde_json::Value;

pub mod entry;
pub mod event;
pub mod logger;
pub mod session;
pub mod valves;

pub use event::StreamEvent;
pub use logger::DevLogger;
pub use valves::Valves;

/// Hook points a filter can be called at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Inlet,
    Stream,
    Outlet,
}

impl Hook {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "inlet" | "request" => Some(Self::Inlet),
            "stream" | "chunk" => Some(Self::Stream),
            "outlet" | "response" => Some(Self::Outlet),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Hook::Inlet => "INLET",
            Hook::Stream => "STREAM",
            Hook::Outlet => "OUTLET",
        }
    }
}

/// Per-call descriptors supplied by the host
#[derive(Debug, Clone, Copy, Default)]
pub struct HookContext<'a> {
    /// Identity of the requesting user (`email`, `name`, `role`, ...)
    pub user: Option<&'a Value>,
    /// Model descriptor, at least `{"id": ..}`
    pub model: Option<&'a Value>,
}

impl<'a> HookContext<'a> {
    pub fn new(user: Option<&'a Value>, model: Option<&'a Value>) -> Self {
        Self { user, model }
    }

    /// The user descriptor, treating JSON `null` as absent
    pub fn user(&self) -> Option<&'a Value> {
        self.user.filter(|u| !u.is_null())
    }
}

/// A pipeline filter. Every hook hands back what it was given, possibly
/// transformed; the host awaits each call before moving on.
pub trait Filter {
    /// Position among sibling filters, lower runs earlier
    fn priority(&self) -> i32;

    async fn inlet(&mut self, body: Value, ctx: HookContext<'_>) -> Value;

    async fn stream(&self, event: StreamEvent, ctx: HookContext<'_>) -> StreamEvent;

    async fn outlet(&self, body: Value, ctx: HookContext<'_>) -> Value;
}
