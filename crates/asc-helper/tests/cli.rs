//! Command-line behavior that never reaches the network.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[allow(deprecated)]
fn helper_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("asc-helper").unwrap();
    // Developer credentials must not leak into tests
    for var in [
        "ASC_KEY_ID",
        "ASC_ISSUER_ID",
        "ASC_PRIVATE_KEY_PATH",
        "ASC_BUNDLE_ID",
        "ASC_APP_NAME",
    ] {
        cmd.env_remove(var);
    }
    cmd.current_dir(dir.path());
    cmd
}

fn write_config(dir: &TempDir, json: &str) {
    fs::write(dir.path().join("appstore_config.json"), json).unwrap();
}

#[test]
fn no_action_prints_help() {
    let dir = TempDir::new().unwrap();
    helper_cmd(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("--list-apps"));
}

#[test]
fn actions_are_mutually_exclusive() {
    let dir = TempDir::new().unwrap();
    helper_cmd(&dir)
        .args(["--list-apps", "--create-app"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn setup_writes_template_once() {
    let dir = TempDir::new().unwrap();
    helper_cmd(&dir)
        .arg("--setup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created appstore_config.json template"));

    let written = fs::read_to_string(dir.path().join("appstore_config.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["key_id"], "YOUR_API_KEY_ID");
    assert_eq!(value["bundle_id"], "de.slohmaier.mousecross");
    assert_eq!(value["app_name"], "MouseCross");

    helper_cmd(&dir)
        .arg("--setup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn setup_honors_config_path() {
    let dir = TempDir::new().unwrap();
    helper_cmd(&dir)
        .args(["--setup", "--config", "custom.json"])
        .assert()
        .success();
    assert!(dir.path().join("custom.json").exists());
    assert!(!dir.path().join("appstore_config.json").exists());
}

#[test]
fn missing_config_names_every_credential() {
    let dir = TempDir::new().unwrap();
    helper_cmd(&dir)
        .arg("--list-apps")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "missing required configuration: key_id, issuer_id, private_key_path",
        ));
}

#[test]
fn partial_config_names_only_missing_fields() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, r#"{"key_id": "ABC123"}"#);
    helper_cmd(&dir)
        .args(["--list-builds", "111"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "missing required configuration: issuer_id, private_key_path",
        ));
}

#[test]
fn untouched_template_counts_as_missing() {
    let dir = TempDir::new().unwrap();
    helper_cmd(&dir).arg("--setup").assert().success();
    helper_cmd(&dir)
        .arg("--create-app")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("key_id, issuer_id, private_key_path"));
}

#[test]
fn environment_fills_missing_fields() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, r#"{"key_id": "ABC123"}"#);
    helper_cmd(&dir)
        .env("ASC_ISSUER_ID", "issuer")
        .env("ASC_PRIVATE_KEY_PATH", "absent.p8")
        .arg("--list-apps")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot read private key"));
}

#[test]
fn invalid_private_key_fails_before_any_request() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("AuthKey.p8"), "not a key").unwrap();
    write_config(
        &dir,
        r#"{"key_id": "ABC123", "issuer_id": "issuer", "private_key_path": "AuthKey.p8"}"#,
    );
    helper_cmd(&dir)
        .args(["--app-info", "de.slohmaier.mousecross"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid private key"));
}

#[test]
fn update_app_requires_attributes() {
    let dir = TempDir::new().unwrap();
    helper_cmd(&dir)
        .args(["--update-app", "111"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--attribute"));
}

#[test]
fn malformed_attribute_is_rejected() {
    let dir = TempDir::new().unwrap();
    helper_cmd(&dir)
        .args(["--update-app", "111", "--attribute", "novalue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}

#[test]
fn unknown_platform_is_rejected() {
    let dir = TempDir::new().unwrap();
    helper_cmd(&dir)
        .args(["--create-app", "--platform", "windows"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown platform"));
}

#[cfg(target_os = "linux")]
#[test]
#[allow(deprecated)]
fn help_write_failure_exits_with_error() {
    let dir = TempDir::new().unwrap();
    let full = fs::OpenOptions::new().write(true).open("/dev/full").unwrap();
    let output = std::process::Command::new(assert_cmd::cargo::cargo_bin("asc-helper"))
        .current_dir(dir.path())
        .stdout(full)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}
