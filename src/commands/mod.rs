use eyre::{Context, Result};

use crate::config::Config;
use crate::filter::DevLogger;

pub mod completions;
pub mod config;
pub mod hook;
pub mod replay;

/// Logger wired to the configured console sink
pub fn build_logger(config: &Config, force_enable: bool) -> DevLogger {
    let mut logger = DevLogger::new(config.valves.clone(), config.sink.sink());
    if force_enable {
        logger.valves_mut().enabled = true;
    }
    logger
}

/// Hooks are async; the CLI drives them on a single-threaded runtime
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .context("Failed to create tokio runtime")
}
