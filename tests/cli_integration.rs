//! Integration tests for the devlog binary
//!
//! These tests drive the built binary the way a shell pipeline would:
//! - Single hook dispatch with payloads from flags and stdin
//! - Transcript replay with session context carried across steps
//! - Configuration get/set

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const USER: &str = r#"{"email":"dev@example.com","role":"admin","name":"Dev"}"#;
const MODEL: &str = r#"{"id":"llama3:8b"}"#;
const CHAT: &str = r#"{"messages":[{"role":"system","content":"be brief"},{"role":"user","content":"What is Rust?"}]}"#;

/// Helper to get the devlog binary path
fn devlog_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_devlog"))
}

fn command(devlog_dir: &Path) -> Command {
    let mut cmd = Command::new(devlog_binary());
    cmd.env("DEVLOG_DIR", devlog_dir)
        .env("XDG_DATA_HOME", devlog_dir.join("data"))
        .env_remove("DEVLOG_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to run devlog with an isolated config directory
fn run_devlog(devlog_dir: &Path, args: &[&str]) -> Output {
    command(devlog_dir).args(args).output().expect("Failed to execute devlog")
}

/// Helper to run devlog with bytes on stdin
fn run_devlog_stdin(devlog_dir: &Path, args: &[&str], stdin: &[u8]) -> Output {
    let mut child = command(devlog_dir)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn devlog");
    child.stdin.take().unwrap().write_all(stdin).unwrap();
    child.wait_with_output().expect("Failed to wait for devlog")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Helper to setup a test environment with a config file
fn setup_test_env(config: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("devlog.yaml"), config).unwrap();
    temp
}

// ============================================================================
// Hook dispatch
// ============================================================================

#[test]
fn test_inlet_prints_entry_when_enabled() {
    let temp = setup_test_env("valves:\n  enabled: true\n");
    let output = run_devlog(
        temp.path(),
        &["hook", "dispatch", "inlet", "--payload", CHAT, "--user", USER, "--model", MODEL],
    );

    assert!(output.status.success(), "inlet failed: {:?}", output);
    let out = stdout(&output);
    assert!(out.contains("[DEV_LOGGER | INLET]"), "{}", out);
    assert!(out.contains("USER: dev@example.com (Role: admin)"));
    assert!(out.contains("MODEL: llama3:8b"));
    assert!(out.contains("MESSAGE (Role: user):\nWhat is Rust?"));
    assert!(out.contains("USER details:"));
}

#[test]
fn test_disabled_by_default_prints_nothing() {
    let temp = setup_test_env("log_level: warn\n");
    for hook in ["inlet", "outlet", "stream"] {
        let output = run_devlog(
            temp.path(),
            &["hook", "dispatch", hook, "--payload", CHAT, "--user", USER],
        );
        assert!(output.status.success(), "{} failed: {:?}", hook, output);
        assert_eq!(stdout(&output), "", "{} printed output while disabled", hook);
    }
}

#[test]
fn test_enable_flag_overrides_config() {
    let temp = setup_test_env("valves:\n  enabled: false\n");
    let output = run_devlog(
        temp.path(),
        &["hook", "dispatch", "outlet", "--enable", "--payload", CHAT, "--user", USER],
    );

    assert!(output.status.success());
    assert!(stdout(&output).contains("[DEV_LOGGER | OUTLET]"));
}

#[test]
fn test_stream_raw_bytes_from_stdin() {
    let temp = setup_test_env("valves:\n  enabled: true\n");

    let output = run_devlog_stdin(
        temp.path(),
        &["hook", "dispatch", "stream", "--raw"],
        b"data: {\"choices\":[]}\n\n",
    );
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim_end(),
        "[DEV_LOGGER | STREAM] (Bytes) AI streaming: data: {\"choices\":[]}"
    );

    let output = run_devlog_stdin(temp.path(), &["hook", "dispatch", "stream", "--raw"], &[0xff, 0xfe, b'x']);
    assert!(output.status.success());
    assert!(stdout(&output).contains("(Bytes, raw) AI streaming: b\"\\xff\\xfex\""));
}

#[test]
fn test_echo_returns_payload_unchanged() {
    let temp = setup_test_env("sink: stderr\nvalves:\n  enabled: true\n  truncate_message: 4\n");
    let output = run_devlog_stdin(
        temp.path(),
        &["hook", "dispatch", "inlet", "--echo", "--user", USER],
        CHAT.as_bytes(),
    );

    assert!(output.status.success(), "{:?}", output);
    let echoed: serde_json::Value = serde_json::from_str(stdout(&output).trim()).unwrap();
    let original: serde_json::Value = serde_json::from_str(CHAT).unwrap();
    assert_eq!(echoed, original);

    let err = stderr(&output);
    assert!(err.contains("What... [truncated, 9 chars omitted]"), "{}", err);
}

#[test]
fn test_echo_raw_stream_is_byte_identical() {
    let temp = setup_test_env("sink: stderr\nvalves:\n  enabled: true\n");
    let chunk = [b'o', b'k', 0xc3, 0x28, b'\n'];
    let output = run_devlog_stdin(temp.path(), &["hook", "dispatch", "stream", "--raw", "--echo"], &chunk);

    assert!(output.status.success());
    assert_eq!(output.stdout, chunk);
}

#[test]
fn test_unknown_hook_fails() {
    let temp = setup_test_env("log_level: info\n");
    let output = run_devlog(temp.path(), &["hook", "dispatch", "pre-tool-use", "--payload", "{}"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unknown hook"));
}

#[test]
fn test_invalid_payload_fails() {
    let temp = setup_test_env("valves:\n  enabled: true\n");
    let output = run_devlog(temp.path(), &["hook", "dispatch", "inlet", "--payload", "{not json"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to parse payload JSON"));
}

#[test]
fn test_hook_list() {
    let temp = setup_test_env("valves:\n  priority: 7\n  log_stream: false\n");
    let output = run_devlog(temp.path(), &["hook", "list"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("dev_logger"));
    assert!(out.contains("priority 7"));
    assert!(out.contains("STREAM"));
}

// ============================================================================
// Replay
// ============================================================================

const TRANSCRIPT: &str = r#"{"hook":"inlet","body":{"messages":[{"role":"user","content":"hello"}]},"user":{"email":"first@example.com","role":"user"},"model":{"id":"llama3"}}
{"hook":"stream","event":{"choices":[{"delta":{"content":"Hel"}}]}}
{"hook":"stream","event":{"choices":[{"delta":{"content":"lo!"}}]}}
{"hook":"stream","raw_bytes":[255,0,1]}
{"hook":"stream","raw_bytes":[100,111,110,101],"ts":"2026-10-17T09:30:00Z"}
{"hook":"stream","event":42}
{"hook":"outlet","body":{"messages":[{"role":"user","content":"hello"},{"role":"assistant","content":"old"},{"role":"user","content":"again"},{"role":"assistant","content":"Hello!"}]},"user":{"email":"second@example.com"},"model":{"id":"llama3"}}
"#;

#[test]
fn test_replay_carries_session_context() {
    let temp = setup_test_env("valves:\n  enabled: true\n");
    let input = temp.path().join("session.jsonl");
    fs::write(&input, TRANSCRIPT).unwrap();

    let output = run_devlog(temp.path(), &["replay", input.to_str().unwrap()]);
    assert!(output.status.success(), "replay failed: {:?}", output);

    let out = stdout(&output);
    assert!(out.contains("(Dict) AI streaming: Hel"));
    assert!(out.contains("(Dict) AI streaming: lo!"));
    assert!(out.contains("(Bytes, raw) AI streaming: b\"\\xff\\x00\\x01\""));
    assert!(out.contains("(Bytes) AI streaming: done"));
    assert!(out.contains("(Unknown Type: number) Data: 42"));

    // OUTLET shows the user captured by the inlet step
    let outlet = out.split("[DEV_LOGGER | OUTLET]").nth(1).expect("no OUTLET entry");
    assert!(outlet.contains("USER: first@example.com (Role: user)"));
    assert!(!outlet.contains("second@example.com"));
    assert!(outlet.contains("MESSAGE (Role: assistant):\nHello!"));

    assert!(stderr(&output).contains("Replayed"));
}

#[test]
fn test_replay_output_matches_input() {
    let temp = setup_test_env("valves:\n  enabled: true\n  truncate_message: 2\n");
    let input = temp.path().join("session.jsonl");
    let returned = temp.path().join("returned.jsonl");
    fs::write(&input, TRANSCRIPT).unwrap();

    let output = run_devlog(
        temp.path(),
        &["replay", input.to_str().unwrap(), "--output", returned.to_str().unwrap(), "--quiet"],
    );
    assert!(output.status.success(), "replay failed: {:?}", output);
    assert_eq!(stderr(&output), "");

    let parse = |text: &str| -> Vec<serde_json::Value> {
        text.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    };
    assert_eq!(parse(&fs::read_to_string(&returned).unwrap()), parse(TRANSCRIPT));
}

#[test]
fn test_replay_from_stdin() {
    let temp = setup_test_env("valves:\n  enabled: true\n");
    let output = run_devlog_stdin(temp.path(), &["replay", "-"], TRANSCRIPT.as_bytes());
    assert!(output.status.success());
    assert!(stdout(&output).contains("[DEV_LOGGER | INLET]"));
}

#[test]
fn test_replay_rejects_bad_line() {
    let temp = setup_test_env("log_level: info\n");
    let input = temp.path().join("broken.jsonl");
    fs::write(&input, "{\"hook\":\"stream\",\"event\":1}\n{\"hook\":\"outlet\"}\n").unwrap();

    let output = run_devlog(temp.path(), &["replay", input.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("line 2"));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_set_then_get() {
    let temp = setup_test_env("log_level: info\n");

    let output = run_devlog(temp.path(), &["config", "set", "valves.truncate_message", "25"]);
    assert!(output.status.success(), "set failed: {:?}", output);

    let output = run_devlog(temp.path(), &["config", "get", "valves.truncate_message"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "25");

    let saved = fs::read_to_string(temp.path().join("devlog.yaml")).unwrap();
    assert!(saved.contains("truncate_message: 25"));
}

#[test]
fn test_config_set_rejects_bad_value() {
    let temp = setup_test_env("log_level: info\n");
    let output = run_devlog(temp.path(), &["config", "set", "valves.enabled", "maybe"]);
    assert!(!output.status.success());
}

#[test]
fn test_config_show_json() {
    let temp = setup_test_env("sink: stderr\n");
    let output = run_devlog(temp.path(), &["config", "show", "-o", "json"]);

    assert!(output.status.success());
    let shown: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(shown["sink"], "stderr");
    assert_eq!(shown["valves"]["enabled"], false);
    assert_eq!(shown["valves"]["priority"], 1);
}

#[test]
fn test_explicit_config_path() {
    let temp = setup_test_env("log_level: info\n");
    let custom = temp.path().join("custom.yaml");
    fs::write(&custom, "valves:\n  enabled: true\n  log_identity_detail: false\n").unwrap();

    let output = run_devlog(
        temp.path(),
        &["--config", custom.to_str().unwrap(), "hook", "dispatch", "inlet", "--payload", CHAT, "--user", USER],
    );
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("[DEV_LOGGER | INLET]"));
    assert!(!out.contains("USER details:"));
}
