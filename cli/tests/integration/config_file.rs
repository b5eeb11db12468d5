//! Integration tests for loading the harness config file.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn netcheck(cwd: &tempfile::TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("netcheck"));
    cmd.current_dir(cwd.path())
        .env("NO_COLOR", "1")
        .env_remove("NETCHECK_CONFIG");
    cmd
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = tempfile::tempdir().expect("temp dir");
    netcheck(&dir)
        .args(["checks", "--config", "nope.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_default_config_file_is_picked_up() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join("netcheck.yaml"), "ssh_max_retries: 7\n").expect("write");

    netcheck(&dir)
        .arg("checks")
        .assert()
        .success()
        .stdout(predicate::str::contains("7 attempts"));
}

#[test]
fn test_config_env_var_is_honoured() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("elsewhere.yaml");
    std::fs::write(&path, "ssh_max_retries_expect_error: 9\n").expect("write");

    netcheck(&dir)
        .arg("checks")
        .env("NETCHECK_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("9 attempts"));
}

#[test]
fn test_invalid_config_value_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join("bad.yaml"), "ssh_username: Root\n").expect("write");

    netcheck(&dir)
        .args(["checks", "--config", "bad.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ssh_username"));
}

#[test]
fn test_invalid_config_json_error_code() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join("bad.yaml"), "ssh_key_retries: 0\n").expect("write");

    let output = netcheck(&dir)
        .args(["checks", "--json", "--config", "bad.yaml"])
        .output()
        .expect("run netcheck");
    assert_eq!(output.status.code(), Some(1));

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(doc["code"], "invalid_config");
}

#[test]
fn test_unparseable_config_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join("netcheck.yaml"), "ssh_max_retries: [oops\n").expect("write");

    netcheck(&dir)
        .arg("checks")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot parse"));
}
