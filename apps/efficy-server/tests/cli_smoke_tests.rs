#![allow(clippy::unwrap_used, clippy::expect_used)]

//! CLI smoke tests for the efficy-server binary.

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::NamedTempFile;

const VALID_CONFIG: &str = "\
server:
  bind_addr: 127.0.0.1:0
efficy:
  server: https://crm.example.com
  app_context: crm
  version: v1
  token: Basic c2VjcmV0
  advanced_resource: advanced
  base_resource: base
  service_resource: service
";

/// Helper to run the efficy-server binary with given arguments
fn run_efficy_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_efficy-server"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute efficy-server")
}

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_cli_help_command() {
    let output = run_efficy_server(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("efficy-server"), "Should contain binary name");
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(stdout.contains("--config"), "Should mention config option");
}

#[test]
fn test_cli_missing_config_file_fails() {
    let output = run_efficy_server(&["--config", "/nonexistent/efficy.yaml", "check"]);

    assert!(!output.status.success(), "Missing config should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config file does not exist"));
}

#[test]
fn test_cli_check_accepts_valid_config() {
    let file = config_file(VALID_CONFIG);
    let output = run_efficy_server(&["--config", file.path().to_str().unwrap(), "check"]);

    assert!(output.status.success(), "Valid config should pass check");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration is valid"));
    assert!(!stdout.contains("c2VjcmV0"), "Token must not be printed");
}

#[test]
fn test_cli_check_rejects_incomplete_config() {
    let file = config_file("efficy:\n  server: https://crm.example.com\n");
    let output = run_efficy_server(&["--config", file.path().to_str().unwrap(), "check"]);

    assert!(!output.status.success(), "Incomplete config should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("efficy.app_context is required"));
}

#[test]
fn test_cli_print_config_applies_port_override() {
    let file = config_file(VALID_CONFIG);
    let output = run_efficy_server(&[
        "--config",
        file.path().to_str().unwrap(),
        "--port",
        "18087",
        "--print-config",
    ]);

    assert!(output.status.success(), "print-config should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Effective configuration:"));
    assert!(stdout.contains("127.0.0.1:18087"));
    assert!(stdout.contains("[REDACTED]"));
}
