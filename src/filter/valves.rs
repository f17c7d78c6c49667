//! Operator-facing toggles for the dev logger

use serde::{Deserialize, Serialize};

/// Runtime switches for [`super::DevLogger`]
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Valves {
    /// Order relative to sibling filters, lower runs earlier
    pub priority: i32,
    /// Master switch; leave off outside of debugging sessions
    pub enabled: bool,
    pub log_inlet: bool,
    pub log_stream: bool,
    pub log_outlet: bool,
    /// Dump the full user descriptor in INLET entries
    #[serde(alias = "log_user_info")]
    pub log_identity_detail: bool,
    /// Max message characters to print, 0 prints everything
    pub truncate_message: usize,
}

impl Default for Valves {
    fn default() -> Self {
        Self {
            priority: 1,
            enabled: false,
            log_inlet: true,
            log_stream: true,
            log_outlet: true,
            log_identity_detail: true,
            truncate_message: 0,
        }
    }
}

impl Valves {
    /// Field names accepted by [`Valves::get`] and [`Valves::set`]
    pub const KEYS: [&'static str; 7] = [
        "priority",
        "enabled",
        "log_inlet",
        "log_stream",
        "log_outlet",
        "log_identity_detail",
        "truncate_message",
    ];

    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "priority" => self.priority.to_string(),
            "enabled" => self.enabled.to_string(),
            "log_inlet" => self.log_inlet.to_string(),
            "log_stream" => self.log_stream.to_string(),
            "log_outlet" => self.log_outlet.to_string(),
            "log_identity_detail" | "log_user_info" => self.log_identity_detail.to_string(),
            "truncate_message" => self.truncate_message.to_string(),
            _ => return None,
        };
        Some(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> eyre::Result<()> {
        use eyre::Context;

        let flag = || -> eyre::Result<bool> {
            value
                .parse::<bool>()
                .context("Invalid boolean value (use 'true' or 'false')")
        };

        match key {
            "priority" => self.priority = value.parse::<i32>().context("Invalid integer value")?,
            "enabled" => self.enabled = flag()?,
            "log_inlet" => self.log_inlet = flag()?,
            "log_stream" => self.log_stream = flag()?,
            "log_outlet" => self.log_outlet = flag()?,
            "log_identity_detail" | "log_user_info" => self.log_identity_detail = flag()?,
            "truncate_message" => {
                self.truncate_message = value
                    .parse::<usize>()
                    .context("Invalid length (use a non-negative integer)")?
            }
            _ => eyre::bail!("Unknown valve: {}", key),
        }
        Ok(())
    }
}
