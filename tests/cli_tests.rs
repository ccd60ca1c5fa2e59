//! Integration tests for the CLI interface

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_cli_help_flag() {
    let mut cmd = Command::cargo_bin("writing-gym").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("coach"));
}

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("writing-gym").unwrap();
    cmd.args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--port"));
}

#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("writing-gym").unwrap();
    cmd.arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_broken_config_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("gym.toml");
    std::fs::write(&config, "model = [not toml").unwrap();

    let mut cmd = Command::cargo_bin("writing-gym").unwrap();
    cmd.args(["-c", config.to_str().unwrap(), "serve"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}
