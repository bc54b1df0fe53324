//! Integration tests for the `zonewright` CLI binary.
//!
//! Every test runs against a throwaway settings file, domain store and
//! BIND directory, so nothing outside the temp dir is touched.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `zonewright` binary with env isolation.
fn zonewright_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("zonewright");
    cmd.env("HOME", "/tmp/zonewright-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/zonewright-cli-test-nonexistent")
        .env_remove("ZONEWRIGHT_CONFIG")
        .env_remove("ZONEWRIGHT_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

const STORE: &str = r#"{
  "ip_pool": ["203.0.113.5"],
  "domains": [
    {"id": 1, "domain": "example.com", "is_email_domain": true, "www_server_alias": true,
     "customer_id": 3, "login_name": "alice", "ips": ["203.0.113.5"]},
    {"id": 2, "domain": "shop.example.com", "delegated_parent_id": 1, "ips": ["203.0.113.6"]}
  ]
}"#;

/// Lay out settings, store and output dirs; returns the settings path.
fn fixture(dir: &TempDir) -> PathBuf {
    let root = dir.path();
    std::fs::write(root.join("domains.json"), STORE).unwrap();
    let settings = format!(
        "[system]\n\
         default_ttl = 3600\n\
         bind_conf_directory = \"{bind}\"\n\
         bind_reload_command = \"true\"\n\n\
         [panel]\n\
         admin_mail = \"hostmaster@example.com\"\n\n\
         [dkim]\n\
         prefix = \"{dkim}\"\n\n\
         [store]\n\
         path = \"{store}\"\n",
        bind = root.join("bind").display(),
        dkim = root.join("dkim").display(),
        store = root.join("domains.json").display(),
    );
    let path = root.join("config.toml");
    std::fs::write(&path, settings).unwrap();
    path
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = zonewright_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    zonewright_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("zones")
            .and(predicate::str::contains("dkim"))
            .and(predicate::str::contains("plan")),
    );
}

#[test]
fn test_version_flag() {
    zonewright_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("zonewright"));
}

#[test]
fn test_completions_bash() {
    zonewright_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honors_flag() {
    zonewright_cmd()
        .args(["--config", "/srv/zonewright.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/srv/zonewright.toml"));
}

#[test]
fn test_config_show_merges_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(&dir);
    zonewright_cmd()
        .arg("-c")
        .arg(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("default_ttl = 3600")
                .and(predicate::str::contains("keys_file = \"dkim-keys.conf\"")),
        );
}

#[test]
fn test_missing_config_file_exits_with_config_code() {
    zonewright_cmd()
        .args(["--config", "/nonexistent/zonewright.toml", "plan"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_missing_store_exits_with_store_code() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(&dir);
    std::fs::remove_file(dir.path().join("domains.json")).unwrap();
    zonewright_cmd()
        .arg("-c")
        .arg(&config)
        .arg("plan")
        .assert()
        .code(4);
}

// ── Generation ──────────────────────────────────────────────────────

#[test]
fn test_plan_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(&dir);
    zonewright_cmd()
        .arg("-c")
        .arg(&config)
        .args(["-o", "plain", "plan", "--date", "2024-01-01"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("example.com\tzone-file")
                .and(predicate::str::contains("shop.example.com\tinline")),
        );
    assert!(!dir.path().join("bind").exists());
}

#[test]
fn test_zones_writes_files_and_serials() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(&dir);
    zonewright_cmd()
        .arg("-c")
        .arg(&config)
        .args(["-o", "json", "zones", "--date", "2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"reloaded\": true"));

    let zone = read(&dir.path().join("bind/domains/example.com.zone"));
    assert!(zone.contains("\t2024010100 ; serial\n"));
    assert!(zone.contains("$ORIGIN shop.example.com.\n"));
    assert!(!dir.path().join("bind/domains/shop.example.com.zone").exists());

    let conf = read(&dir.path().join("bind/froxlor_bind.conf"));
    assert!(conf.contains("# Domain ID: 1 - CustomerID: 3 - CustomerLogin: alice"));

    let store = read(&dir.path().join("domains.json"));
    assert!(store.contains("\"serial\": \"2024010100\""));
}

#[test]
fn test_quiet_suppresses_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(&dir);
    zonewright_cmd()
        .arg("-c")
        .arg(&config)
        .args(["-q", "zones", "--date", "2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_dkim_disabled_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(&dir);
    zonewright_cmd()
        .arg("-c")
        .arg(&config)
        .arg("dkim")
        .assert()
        .success();
    assert!(!dir.path().join("dkim").exists());
}
