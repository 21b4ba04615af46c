//! Startup behavior of the `consistency-test` binary.
//!
//! Only paths that end before the probe loop starts are exercised here.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cmd() -> Command {
    Command::cargo_bin("consistency-test").unwrap()
}

#[test]
fn no_arguments_prints_usage() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn missing_port_is_rejected() {
    cmd()
        .arg("127.0.0.1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<PORT>"))
        .stderr(predicate::str::contains("Usage: consistency-test"));
}

#[test]
fn non_numeric_port_is_rejected() {
    cmd()
        .args(["127.0.0.1", "redis"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"))
        .stderr(predicate::str::contains("Usage: consistency-test"));
}

#[test]
fn out_of_range_port_prints_usage() {
    cmd()
        .args(["127.0.0.1", "70000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: consistency-test"));
}

#[test]
fn help_lists_options() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--working-set"))
        .stdout(predicate::str::contains("--timeout-ms"));
}

#[test]
fn unreadable_config_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.toml");

    cmd()
        .args(["127.0.0.1", "6379", "--config"])
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn malformed_config_is_fatal() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[store]\ntimeout_ms = \"soon\"").unwrap();

    cmd()
        .args(["127.0.0.1", "6379", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config file"));
}

#[test]
fn empty_working_set_is_fatal() {
    cmd()
        .args(["127.0.0.1", "6379", "--working-set", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one key"));
}

#[test]
fn zero_timeout_is_fatal() {
    cmd()
        .args(["127.0.0.1", "6379", "--timeout-ms", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout_ms"));
}
