//! Configuration integration tests.
//!
//! These tests verify config discovery, format parsing, and precedence
//! from an end-to-end perspective using the compiled binary. Tests use
//! `info --json` to assert actual config values, not just process success.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

/// Returns a Command configured to run our binary.
#[allow(deprecated)]
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    for var in [
        "FOLIO_LOG_LEVEL",
        "FOLIO_AI__MODEL",
        "FOLIO_BACKEND__URL",
        "FOLIO_REVEAL_INTERVAL_MS",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Run `info --json` from a directory and parse the JSON output.
fn info_json(dir: &std::path::Path) -> Value {
    let output = cmd()
        .args(["-C", dir.to_str().unwrap(), "info", "--json"])
        .output()
        .expect("failed to run command");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("invalid JSON output")
}

// =============================================================================
// Config File Discovery
// =============================================================================

#[test]
fn runs_without_config_file() {
    let tmp = TempDir::new().unwrap();
    let json = info_json(tmp.path());

    assert_eq!(json["config"]["log_level"], "info");
    assert!(json["config"]["config_file"].is_null());
    assert_eq!(json["config"]["reveal_interval_ms"], 50);
}

#[test]
fn discovers_dotfile_config_in_current_dir() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".folio.toml"), r#"log_level = "debug""#).unwrap();

    let json = info_json(tmp.path());

    assert_eq!(json["config"]["log_level"], "debug");
    let reported = json["config"]["config_file"].as_str().unwrap();
    assert!(reported.ends_with(".folio.toml"), "should report dotfile: {reported}");
}

#[test]
fn discovers_config_in_parent_directory() {
    let tmp = TempDir::new().unwrap();
    let sub = tmp.path().join("content").join("drafts");
    fs::create_dir_all(&sub).unwrap();
    fs::write(tmp.path().join("folio.toml"), r#"log_level = "warn""#).unwrap();

    let json = info_json(&sub);
    assert_eq!(json["config"]["log_level"], "warn");
}

#[test]
fn parses_nested_sections() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".folio.toml"),
        r#"
reveal_interval_ms = 10

[backend]
url = "https://abc.supabase.co"

[ai]
model = "gpt-4o-mini"

[storage]
bucket = "post-images"
"#,
    )
    .unwrap();

    let json = info_json(tmp.path());
    assert_eq!(json["config"]["backend_url"], "https://abc.supabase.co");
    assert_eq!(json["config"]["ai_model"], "gpt-4o-mini");
    assert_eq!(json["config"]["bucket"], "post-images");
    assert_eq!(json["config"]["reveal_interval_ms"], 10);
}

#[test]
fn parses_yaml_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".folio.yaml"),
        "log_level: warn\nai:\n  model: yaml-model\n",
    )
    .unwrap();

    let json = info_json(tmp.path());
    assert_eq!(json["config"]["log_level"], "warn");
    assert_eq!(json["config"]["ai_model"], "yaml-model");
}

#[test]
fn parses_json_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".folio.json"),
        r#"{"log_level": "error", "storage": {"max_upload_bytes": 1024}}"#,
    )
    .unwrap();

    let json = info_json(tmp.path());
    assert_eq!(json["config"]["log_level"], "error");
    assert_eq!(json["config"]["max_upload_bytes"], 1024);
}

// =============================================================================
// Precedence
// =============================================================================

#[test]
fn explicit_config_overrides_discovered() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".folio.toml"), r#"log_level = "debug""#).unwrap();
    let explicit = tmp.path().join("other.toml");
    fs::write(&explicit, r#"log_level = "error""#).unwrap();

    let output = cmd()
        .args(["-C", tmp.path().to_str().unwrap()])
        .args(["--config", explicit.to_str().unwrap(), "info", "--json"])
        .output()
        .unwrap();
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["config"]["log_level"], "error");
}

#[test]
fn environment_overrides_files() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".folio.toml"),
        "[ai]\nmodel = \"from-file\"\n",
    )
    .unwrap();

    let output = cmd()
        .env("FOLIO_AI__MODEL", "from-env")
        .args(["-C", tmp.path().to_str().unwrap(), "info", "--json"])
        .output()
        .unwrap();
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["config"]["ai_model"], "from-env");
}

#[test]
fn git_boundary_stops_config_search() {
    let tmp = TempDir::new().unwrap();
    let repo = tmp.path().join("repo");
    let src = repo.join("src");
    fs::create_dir_all(repo.join(".git")).unwrap();
    fs::create_dir_all(&src).unwrap();
    fs::write(tmp.path().join(".folio.toml"), r#"log_level = "error""#).unwrap();

    let json = info_json(&src);
    assert_eq!(json["config"]["log_level"], "info");
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn invalid_toml_config_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".folio.toml"), "log_level = [not valid").unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "info"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}

#[test]
fn zero_reveal_interval_is_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".folio.toml"), "reveal_interval_ms = 0\n").unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "info"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reveal_interval_ms"));
}

#[test]
fn unknown_config_field_is_ignored() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".folio.toml"),
        "log_level = \"warn\"\ntheme = \"dark\"\n",
    )
    .unwrap();

    let json = info_json(tmp.path());
    assert_eq!(json["config"]["log_level"], "warn");
}
