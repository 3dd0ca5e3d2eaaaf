//! Integration tests for the `e2ebridge` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! offline commands and error handling, all without a live Bridge.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `e2ebridge` binary with env isolation.
///
/// Clears all `E2EBRIDGE_*` env vars and points config directories at
/// `home` so tests never touch the user's real configuration.
fn e2e_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("e2ebridge");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG")
        .env_remove("E2EBRIDGE_PROFILE")
        .env_remove("E2EBRIDGE_HOST")
        .env_remove("E2EBRIDGE_PORT")
        .env_remove("E2EBRIDGE_USER")
        .env_remove("E2EBRIDGE_PASSWORD")
        .env_remove("E2EBRIDGE_OUTPUT")
        .env_remove("E2EBRIDGE_INSECURE")
        .env_remove("E2EBRIDGE_TIMEOUT");
    cmd
}

/// Flags that describe an unreachable Bridge; enough to get past
/// credential resolution without any config.
const UNREACHABLE: [&str; 8] = [
    "--host",
    "127.0.0.1",
    "--port",
    "1",
    "--user",
    "admin",
    "--password",
    "secret",
];

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = e2e_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    e2e_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("E2E Bridge")
            .and(predicate::str::contains("services"))
            .and(predicate::str::contains("console"))
            .and(predicate::str::contains("pack")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    e2e_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("e2ebridge"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    e2e_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    let home = TempDir::new().unwrap();
    e2e_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let home = TempDir::new().unwrap();
    let output = e2e_cmd(home.path()).arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_unknown_service_kind_is_rejected() {
    let home = TempDir::new().unwrap();
    let output = e2e_cmd(home.path())
        .args(["services", "start", "python", "Ticker"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_assignment_without_equals_is_rejected() {
    let home = TempDir::new().unwrap();
    let output = e2e_cmd(home.path())
        .args(["preferences", "set", "xuml", "Ticker", "loglevel"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("KEY=VALUE"));
}

#[test]
fn test_invalid_output_format() {
    let home = TempDir::new().unwrap();
    let output = e2e_cmd(home.path())
        .args(["--output", "invalid", "services", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

// ── Errors before and at the network ────────────────────────────────

#[test]
fn test_services_list_without_credentials() {
    let home = TempDir::new().unwrap();
    let output = e2e_cmd(home.path())
        .args(["services", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3), "Expected auth exit code");
    assert!(combined_output(&output).contains("credentials"));
}

#[test]
fn test_unreachable_bridge_is_connection_error() {
    let home = TempDir::new().unwrap();
    let output = e2e_cmd(home.path())
        .args(UNREACHABLE)
        .args(["--timeout", "5", "services", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}

#[test]
fn test_kill_on_node_service_is_rejected_locally() {
    let home = TempDir::new().unwrap();
    let output = e2e_cmd(home.path())
        .args(UNREACHABLE)
        .args(["services", "kill", "node", "Ticker"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("not supported"));
}

#[test]
fn test_remove_requires_yes_without_terminal() {
    let home = TempDir::new().unwrap();
    e2e_cmd(home.path())
        .args(UNREACHABLE)
        .args(["services", "remove", "xuml", "Ticker"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

// ── Offline commands ────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    let home = TempDir::new().unwrap();
    e2e_cmd(home.path()).args(["config", "show"]).assert().success();
}

#[test]
fn test_config_set_then_show() {
    let home = TempDir::new().unwrap();
    e2e_cmd(home.path())
        .args(["config", "set", "host", "bridge.local"])
        .assert()
        .success();
    e2e_cmd(home.path())
        .args(["config", "set", "port", "11186"])
        .assert()
        .success();

    e2e_cmd(home.path())
        .args(["--output", "json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bridge.local").and(predicate::str::contains("11186")));
    e2e_cmd(home.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default *"));
}

#[test]
fn test_config_use_unknown_profile() {
    let home = TempDir::new().unwrap();
    e2e_cmd(home.path())
        .args(["config", "use", "staging"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("staging"));
}

#[test]
fn test_pack_writes_archive() {
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    std::fs::write(
        project.path().join("package.json"),
        r#"{"name":"ticker","version":"1.2.0"}"#,
    )
    .unwrap();
    std::fs::write(project.path().join("index.js"), "module.exports = {};").unwrap();
    let out = home.path().join("ticker.zip");

    e2e_cmd(home.path())
        .arg("pack")
        .arg(project.path())
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("ticker.zip"));
    assert!(out.is_file());
}

#[test]
fn test_pack_without_manifest_fails() {
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    e2e_cmd(home.path())
        .arg("pack")
        .arg(project.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("package.json"));
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_services_subcommands_exist() {
    let home = TempDir::new().unwrap();
    e2e_cmd(home.path())
        .args(["services", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("deploy"))
                .and(predicate::str::contains("kill"))
                .and(predicate::str::contains("repository")),
        );
}

#[test]
fn test_console_subcommands_exist() {
    let home = TempDir::new().unwrap();
    e2e_cmd(home.path())
        .args(["console", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("login")
                .and(predicate::str::contains("deploy"))
                .and(predicate::str::contains("group"))
                .and(predicate::str::contains("user")),
        );
}
