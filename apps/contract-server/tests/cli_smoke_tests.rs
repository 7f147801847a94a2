#![allow(clippy::unwrap_used, clippy::expect_used)]

//! CLI smoke tests for the contract-server binary
//!
//! These tests verify that the CLI commands work correctly, including
//! configuration validation, help output, and server startup.

use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

/// Helper to run the contract-server binary with given arguments
fn run_contract_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_contract-server"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute contract-server")
}

/// Helper to run the contract-server binary with timeout
async fn run_contract_server_with_timeout(
    args: &[&str],
    timeout_duration: Duration,
) -> Result<std::process::Output, Box<dyn std::error::Error>> {
    let mut cmd = tokio::process::Command::new(env!("CARGO_BIN_EXE_contract-server"));
    cmd.args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn()?;

    match timeout(timeout_duration, child.wait_with_output()).await {
        Ok(result) => result.map_err(Into::into),
        Err(_elapsed) => Err("elapsed".into()),
    }
}

fn write_config(dir: &TempDir, contents: &str) -> String {
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, contents).expect("Failed to write config file");
    path.to_string_lossy().into_owned()
}

#[test]
fn test_cli_help_command() {
    let output = run_contract_server(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(stdout.contains("--print-config"));
}

#[test]
fn test_cli_invalid_command() {
    let output = run_contract_server(&["frobnicate"]);
    assert!(!output.status.success(), "Unknown subcommand should fail");
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run_contract_server(&["--config", "/nonexistent/contract.yaml", "check"]);

    assert!(!output.status.success(), "Missing config file should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("config file does not exist"),
        "Should explain the missing file, got: {stderr}"
    );
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "invalid: yaml: content: [unclosed");

    let output = run_contract_server(&["--config", &path, "check"]);

    assert!(!output.status.success(), "Invalid YAML should fail");
}

#[test]
fn test_cli_config_validation_unknown_key() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "contract:\n  storage:\n    backend: postgres\n");

    let output = run_contract_server(&["--config", &path, "check"]);

    assert!(!output.status.success(), "Unknown keys should be rejected");
}

#[test]
fn test_cli_check_valid_config() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r"
server:
  listen_addr: 127.0.0.1:50999
logging:
  level: debug
contract:
  provisioning:
    endpoint: http://info.internal:9111
    connect_timeout: 2s
  storage:
    kind: database
    dsn: 'sqlite::memory:'
  service:
    provisioning_timeout: 20s
",
    );

    let output = run_contract_server(&["--config", &path, "check"]);

    assert!(output.status.success(), "Valid config should pass check");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration is valid"));
    assert!(stdout.contains("127.0.0.1:50999"));
    assert!(stdout.contains("http://info.internal:9111"));
    assert!(stdout.contains("\"database\""));
}

#[test]
fn test_cli_check_rejects_database_without_dsn() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "contract:\n  storage:\n    kind: database\n");

    let output = run_contract_server(&["--config", &path, "check"]);

    assert!(!output.status.success(), "check must agree with run");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stdout.contains("Configuration is valid"));
    assert!(stderr.contains("contract.storage.dsn"), "got: {stderr}");
}

#[test]
fn test_cli_print_config_applies_overrides() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "server:\n  listen_addr: 127.0.0.1:50999\n");

    let output = run_contract_server(&[
        "--config",
        &path,
        "--listen",
        "127.0.0.1:51000",
        "-vv",
        "--print-config",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Effective configuration"));
    assert!(stdout.contains("127.0.0.1:51000"), "CLI should win over file");
    assert!(stdout.contains("\"debug\""), "-vv should raise the log level");
}

#[test]
fn test_cli_env_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "contract:\n  storage:\n    kind: database\n");

    let output = Command::new(env!("CARGO_BIN_EXE_contract-server"))
        .args(["--config", &path, "--print-config"])
        .env("APP__CONTRACT__STORAGE__KIND", "memory")
        .output()
        .expect("Failed to execute contract-server");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"memory\""));
}

#[tokio::test]
async fn test_cli_run_keeps_serving_until_stopped() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "server:\n  listen_addr: 127.0.0.1:0\ncontract:\n  storage:\n    kind: memory\n",
    );

    let result =
        run_contract_server_with_timeout(&["--config", &path, "run"], Duration::from_secs(2))
            .await;

    // The server only exits on a signal; an early exit means startup failed.
    match result {
        Err(e) => assert_eq!(e.to_string(), "elapsed"),
        Ok(output) => panic!(
            "server exited early: {}",
            String::from_utf8_lossy(&output.stderr)
        ),
    }
}

#[tokio::test]
async fn test_cli_run_fails_fast_without_dsn() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "server:\n  listen_addr: 127.0.0.1:0\ncontract:\n  storage:\n    kind: database\n",
    );

    let output =
        run_contract_server_with_timeout(&["--config", &path, "run"], Duration::from_secs(10))
            .await
            .expect("startup should fail before the timeout");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("contract.storage.dsn"), "got: {stderr}");
}
