use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::filter::Valves;
use crate::sink::ConsoleTarget;

const CONFIG_FILE: &str = "devlog.yaml";

/// Main devlog configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    /// Where console entries go
    pub sink: ConsoleTarget,
    pub valves: Valves,
}

/// Level for the tool's own log file
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            "off" => Some(Self::Off),
            _ => None,
        }
    }

    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // An explicit path must load
        if let Some(path) = config_path {
            let path = Self::expand_path(path);
            return Self::load_from_file(&path).context(format!("Failed to load config from {}", path.display()));
        }

        let mut candidates = Vec::new();
        if let Ok(env_path) = std::env::var("DEVLOG_CONFIG") {
            candidates.push(Self::expand_path(Path::new(&env_path)));
        }
        if let Ok(dir) = std::env::var("DEVLOG_DIR") {
            candidates.push(Self::expand_path(Path::new(&dir)).join(CONFIG_FILE));
        }
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("devlog").join(CONFIG_FILE));
        }
        // ./devlog.yaml for development
        candidates.push(PathBuf::from(CONFIG_FILE));

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return Ok(config),
                Err(e) => log::warn!("Failed to load config from {}: {:#}", path.display(), e),
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Directory `config set` writes to
    pub fn devlog_dir() -> PathBuf {
        std::env::var("DEVLOG_DIR")
            .map(|dir| Self::expand_path(Path::new(&dir)))
            .unwrap_or_else(|_| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("devlog"))
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::devlog_dir().join(CONFIG_FILE);
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let yaml_str = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(&config_path, yaml_str).context("Failed to write config file")?;
        Ok(config_path)
    }

    /// Read a value by dotted key
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "log_level" | "log-level" => Some(self.log_level.as_filter().to_string()),
            "sink" => Some(self.sink.as_str().to_string()),
            _ => key.strip_prefix("valves.").and_then(|field| self.valves.get(field)),
        }
    }

    /// Update a value by dotted key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "log_level" | "log-level" => {
                self.log_level = LogLevel::from_str(value)
                    .ok_or_else(|| eyre::eyre!("Invalid log level: {} (trace|debug|info|warn|error|off)", value))?;
            }
            "sink" => {
                self.sink = ConsoleTarget::from_str(value)
                    .ok_or_else(|| eyre::eyre!("Invalid sink: {} (stdout|stderr)", value))?;
            }
            _ => match key.strip_prefix("valves.") {
                Some(field) => self.valves.set(field, value)?,
                None => eyre::bail!("Unknown config key: {}", key),
            },
        }
        Ok(())
    }

    /// All keys accepted by [`Config::get`] and [`Config::set`]
    pub fn keys() -> Vec<String> {
        let mut keys = vec!["log_level".to_string(), "sink".to_string()];
        keys.extend(Valves::KEYS.iter().map(|k| format!("valves.{}", k)));
        keys
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}
