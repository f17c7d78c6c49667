//! Replay a recorded transcript through the dev logger
//!
//! All steps share one logger, so the user captured by an inlet step shows up
//! in the stream and outlet entries that follow it.

use colored::*;
use eyre::{Context, Result};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use crate::commands::{build_logger, runtime};
use crate::config::Config;
use crate::replay::{parse_transcript, run_step};

pub fn run(input: &str, output: Option<&Path>, enable: bool, quiet: bool, config: &Config) -> Result<()> {
    let content = read_input(input)?;
    let steps = parse_transcript(&content).with_context(|| format!("Failed to parse transcript {}", input))?;

    log::info!("Replaying {} steps from {}", steps.len(), input);

    let mut writer = match output {
        Some(path) => Some(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => None,
    };

    let mut logger = build_logger(config, enable);
    let rt = runtime()?;
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();

    for step in steps {
        let returned = rt.block_on(run_step(&mut logger, step));
        *counts.entry(returned.hook().as_str()).or_default() += 1;

        if let Some(w) = writer.as_mut() {
            let line = serde_json::to_string(&returned.to_json()).context("Failed to serialize step")?;
            writeln!(w, "{}", line).context("Failed to write replay output")?;
        }
    }

    if let Some(mut w) = writer {
        w.flush().context("Failed to flush replay output")?;
    }

    if !quiet {
        let summary: Vec<String> = counts.iter().map(|(hook, n)| format!("{} {}", n, hook.to_lowercase())).collect();
        eprintln!("{} Replayed {}", "✓".green(), summary.join(", ").cyan());
        if let Some(path) = output {
            eprintln!("  Returned payloads written to {}", path.display());
        }
    }

    Ok(())
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read transcript from stdin")?;
        return Ok(buffer);
    }

    let path = Config::expand_path(Path::new(input));
    fs::read_to_string(&path).with_context(|| format!("Failed to read transcript {}", path.display()))
}
