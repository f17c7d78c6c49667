use colored::*;
use eyre::{Context, Result};
use serde_json::Value;
use std::io::{self, Read, Write};

use crate::cli::HookAction;
use crate::commands::{build_logger, runtime};
use crate::config::Config;
use crate::filter::{Filter, Hook, HookContext, StreamEvent, Valves};
use crate::sink::ConsoleTarget;

pub fn run(action: HookAction, config: &Config) -> Result<()> {
    match action {
        HookAction::Dispatch {
            hook,
            payload,
            user,
            model,
            raw,
            enable,
            echo,
        } => {
            let hook = Hook::from_str(&hook).ok_or_else(|| eyre::eyre!("Unknown hook: {} (inlet|stream|outlet)", hook))?;
            let user = parse_descriptor("--user", user.as_deref())?;
            let model = parse_descriptor("--model", model.as_deref())?;
            let payload = read_payload(payload)?;
            dispatch(hook, payload, user, model, raw, enable, echo, config)
        }
        HookAction::List { hook } => list(hook.as_deref(), config),
    }
}

#[allow(clippy::too_many_arguments)]
fn dispatch(
    hook: Hook,
    payload: Vec<u8>,
    user: Option<Value>,
    model: Option<Value>,
    raw: bool,
    enable: bool,
    echo: bool,
    config: &Config,
) -> Result<()> {
    if raw && hook != Hook::Stream {
        eyre::bail!("--raw only applies to the stream hook");
    }
    if echo && config.sink == ConsoleTarget::Stdout {
        log::warn!("--echo with the stdout sink interleaves log entries with the payload");
    }

    log::info!("Dispatching {} hook ({} bytes)", hook.as_str(), payload.len());

    let mut logger = build_logger(config, enable);
    let rt = runtime()?;
    let ctx = HookContext::new(user.as_ref(), model.as_ref());

    match hook {
        Hook::Inlet => {
            let body = parse_json(&payload)?;
            let body = rt.block_on(logger.inlet(body, ctx));
            if echo {
                print_json(&body)?;
            }
        }
        Hook::Outlet => {
            let body = parse_json(&payload)?;
            let body = rt.block_on(logger.outlet(body, ctx));
            if echo {
                print_json(&body)?;
            }
        }
        Hook::Stream => {
            let event = if raw {
                StreamEvent::Raw(payload)
            } else {
                StreamEvent::from_value(parse_json(&payload)?)
            };
            let event = rt.block_on(logger.stream(event, ctx));
            if echo {
                match event {
                    StreamEvent::Raw(bytes) => {
                        let mut out = io::stdout().lock();
                        out.write_all(&bytes).context("Failed to write payload")?;
                        out.flush()?;
                    }
                    StreamEvent::Structured(map) => print_json(&Value::Object(map))?,
                    StreamEvent::Other(value) => print_json(&value)?,
                }
            }
        }
    }

    Ok(())
}

fn list(hook_filter: Option<&str>, config: &Config) -> Result<()> {
    let hooks = match hook_filter {
        Some(name) => vec![Hook::from_str(name).ok_or_else(|| eyre::eyre!("Unknown hook: {}", name))?],
        None => vec![Hook::Inlet, Hook::Stream, Hook::Outlet],
    };

    let logger = build_logger(config, false);
    let valves = logger.valves();

    println!("{}", "Registered filters:".bold());
    println!();
    println!(
        "  {} (priority {}) {}",
        "dev_logger".cyan(),
        logger.priority(),
        if valves.enabled { "enabled".green() } else { "disabled".yellow() }
    );

    for hook in hooks {
        let state = if hook_enabled(valves, hook) { "on".green() } else { "off".dimmed() };
        println!("    {:<8} {}", hook.as_str(), state);
    }

    Ok(())
}

fn hook_enabled(valves: &Valves, hook: Hook) -> bool {
    match hook {
        Hook::Inlet => valves.log_inlet,
        Hook::Stream => valves.log_stream,
        Hook::Outlet => valves.log_outlet,
    }
}

fn read_payload(payload: Option<String>) -> Result<Vec<u8>> {
    match payload {
        Some(p) => Ok(p.into_bytes()),
        None => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .context("Failed to read payload from stdin")?;
            Ok(buffer)
        }
    }
}

fn parse_json(payload: &[u8]) -> Result<Value> {
    serde_json::from_slice(payload).context("Failed to parse payload JSON")
}

fn parse_descriptor(flag: &str, raw: Option<&str>) -> Result<Option<Value>> {
    raw.map(|s| serde_json::from_str(s).with_context(|| format!("Failed to parse {} JSON", flag)))
        .transpose()
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string(value).context("Failed to serialize payload")?);
    Ok(())
}
