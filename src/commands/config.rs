use colored::*;
use eyre::Result;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::Config;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Get { key } => get(&key, config),
        ConfigAction::Set { key, value } => set(&key, &value, config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "devlog Configuration".bold());
            println!();

            println!("  log_level: {}", config.log_level.as_filter());
            println!("  sink: {}", config.sink.as_str());
            println!();

            println!("{}:", "valves".cyan());
            for key in Config::keys().iter().filter_map(|k| k.strip_prefix("valves.")) {
                if let Some(value) = config.valves.get(key) {
                    println!("  {}: {}", key, value);
                }
            }
        }
    }

    Ok(())
}

fn get(key: &str, config: &Config) -> Result<()> {
    match config.get(key) {
        Some(v) => println!("{}", v),
        None => {
            eprintln!("{} Unknown config key: {}", "✗".red(), key);
            eprintln!("  Known keys: {}", Config::keys().join(", "));
            std::process::exit(1);
        }
    }

    Ok(())
}

fn set(key: &str, value: &str, config: &Config) -> Result<()> {
    println!("{} Setting {} = {}", "→".blue(), key.cyan(), value.green());

    let mut new_config = config.clone();
    new_config.set(key, value)?;
    let config_path = new_config.save()?;

    println!("  {} Saved to {}", "✓".green(), config_path.display());

    Ok(())
}
