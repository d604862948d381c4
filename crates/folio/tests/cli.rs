//! End-to-end CLI integration tests
//!
//! These tests invoke the compiled binary as a subprocess to verify
//! that the CLI behaves correctly from a user's perspective.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Returns a Command configured to run our binary.
///
/// Backend and admin variables from the caller's environment are cleared so
/// results do not depend on the machine running the tests.
#[allow(deprecated)]
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    for var in [
        "FOLIO_BACKEND__URL",
        "FOLIO_BACKEND__API_KEY",
        "FOLIO_ADMIN_USERNAME",
        "FOLIO_ADMIN_PASSWORD",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Write `content` to `name` inside a fresh temp dir.
fn fixture(name: &str, content: &str) -> (TempDir, std::path::PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(name);
    fs::write(&path, content).unwrap();
    (tmp, path)
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_shows_usage() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("reading-time"));
}

#[test]
fn long_help_lists_environment() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("FOLIO_ADMIN_PASSWORD"));
}

#[test]
fn version_flag_shows_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn version_only_prints_bare_version() {
    cmd()
        .arg("--version-only")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "{}\n",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn no_arguments_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

// =============================================================================
// Info Command
// =============================================================================

#[test]
fn info_shows_package_name_and_version() {
    cmd()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_NAME")))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn info_json_is_valid() {
    let output = cmd().args(["info", "--json"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
    assert_eq!(json["config"]["bucket"], "blog-images");
}

// =============================================================================
// Reading Time
// =============================================================================

#[test]
fn reading_time_rounds_up() {
    let words = vec!["word"; 201].join(" ");
    let (_tmp, path) = fixture("post.md", &words);
    cmd()
        .arg("reading-time")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 min read (201 words)"));
}

#[test]
fn reading_time_json() {
    let (_tmp, path) = fixture("post.md", "one two three");
    let output = cmd()
        .args(["reading-time", "--json"])
        .arg(&path)
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["words"], 3);
    assert_eq!(json["minutes"], 1);
}

#[test]
fn missing_file_fails() {
    cmd()
        .args(["reading-time", "/definitely/not/here.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn oversized_input_is_rejected() {
    let (tmp, path) = fixture("post.md", "0123456789 0123456789");
    fs::write(tmp.path().join(".folio.toml"), "max_input_bytes = 8\n").unwrap();
    cmd()
        .arg("-C")
        .arg(tmp.path())
        .arg("reading-time")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("input too large"));
}

// =============================================================================
// Render
// =============================================================================

#[test]
fn render_strips_scripts() {
    let (_tmp, path) = fixture(
        "post.md",
        "# Title\n\nHello <script>alert(1)</script> **world**\n",
    );
    cmd()
        .arg("render")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("<h1>Title</h1>"))
        .stdout(predicate::str::contains("<strong>world</strong>"))
        .stdout(predicate::str::contains("<script>").not());
}

#[test]
fn render_outline_lists_headings() {
    let (_tmp, path) = fixture("post.md", "# One\n\ntext\n\n## Two\n");
    cmd()
        .args(["render", "--outline"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("One\n  Two"));
}

// =============================================================================
// Format
// =============================================================================

#[test]
fn format_bold_wraps_selection() {
    let (_tmp, path) = fixture("post.md", "hello world");
    let output = cmd()
        .args(["format", "--json", "--format", "bold", "--start", "6", "--end", "11"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["text"], "hello **world**");
    assert_eq!(json["cursor"], 15);
}

#[test]
fn format_image_inserts_at_offset() {
    let (_tmp, path) = fixture("post.md", "abcde");
    cmd()
        .args(["format", "--image", "https://x/y.png", "--at", "5"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::diff("abcde![Image](https://x/y.png)"));
}

#[test]
fn format_write_updates_file() {
    let (_tmp, path) = fixture("post.md", "title");
    cmd()
        .args(["format", "--format", "h2", "--start", "0", "--end", "5", "--write"])
        .arg(&path)
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&path).unwrap(), "## title");
}

#[test]
fn format_requires_an_operation() {
    let (_tmp, path) = fixture("post.md", "text");
    cmd()
        .arg("format")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--format"));
}

// =============================================================================
// Routes
// =============================================================================

#[test]
fn public_route_resolves_to_itself() {
    cmd()
        .args(["route", "/blog/hello"])
        .assert()
        .success()
        .stdout(predicate::str::diff("/blog/hello\n"));
}

#[test]
fn admin_route_redirects_without_login() {
    let output = cmd()
        .args(["route", "--json", "/admin/blog/edit/7"])
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["shown"], "/admin/login");
    assert_eq!(json["requires_auth"], true);
}

#[test]
fn admin_route_opens_with_credentials() {
    cmd()
        .args(["route", "/admin/dashboard"])
        .env("FOLIO_ADMIN_USERNAME", "admin")
        .env("FOLIO_ADMIN_PASSWORD", "umutadmin")
        .assert()
        .success()
        .stdout(predicate::str::diff("/admin/dashboard\n"))
        .stderr(predicate::str::contains("Welcome back!"));
}

#[test]
fn wrong_password_still_redirects() {
    cmd()
        .args(["route", "/admin/dashboard", "--username", "admin", "--password", "nope"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/admin/login"))
        .stderr(predicate::str::contains("Invalid credentials"));
}

#[test]
fn unknown_route_fails() {
    cmd()
        .args(["route", "/nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown route"));
}

// =============================================================================
// Backend-dependent commands
// =============================================================================

#[test]
fn posts_need_a_backend() {
    cmd()
        .args(["posts", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("backend is not configured"));
}

#[test]
fn mutations_need_admin_credentials() {
    let (_tmp, path) = fixture("post.md", "body");
    cmd()
        .env("FOLIO_BACKEND__URL", "http://127.0.0.1:9")
        .env("FOLIO_BACKEND__API_KEY", "anon")
        .args(["posts", "add", "--title", "Hello", "--file"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("admin login required"));
}

#[test]
fn mutations_reject_bad_credentials() {
    cmd()
        .env("FOLIO_BACKEND__URL", "http://127.0.0.1:9")
        .env("FOLIO_BACKEND__API_KEY", "anon")
        .args(["projects", "delete", "p1", "--username", "admin", "--password", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid credentials"));
}

#[test]
fn failed_delete_prints_toast() {
    cmd()
        .env("FOLIO_BACKEND__URL", "http://127.0.0.1:9")
        .env("FOLIO_BACKEND__API_KEY", "anon")
        .args(["posts", "delete", "p1", "--username", "admin", "--password", "umutadmin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Welcome back!"))
        .stderr(predicate::str::contains("Failed to delete post"));
}

#[test]
fn failed_project_save_prints_toast() {
    cmd()
        .env("FOLIO_BACKEND__URL", "http://127.0.0.1:9")
        .env("FOLIO_BACKEND__API_KEY", "anon")
        .args(["projects", "add", "--title", "Tool", "--username", "admin", "--password", "umutadmin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("An error occurred while saving the project"));
}

// =============================================================================
// AI commands
// =============================================================================

#[test]
fn enhance_rejects_blank_file() {
    let (_tmp, path) = fixture("post.md", "   \n");
    cmd()
        .args(["enhance", "--action", "grammar"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter some text first"));
}

#[test]
fn enhance_reports_unreachable_endpoint() {
    let (_tmp, path) = fixture("post.md", "some text");
    cmd()
        .env("FOLIO_AI__ENDPOINT", "http://127.0.0.1:9/v1/chat/completions")
        .args(["--json", "enhance", "--action", "style", "--style", "blog"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to process text"));
}

#[test]
fn enhance_failure_prints_toast() {
    let (_tmp, path) = fixture("post.md", "some text");
    cmd()
        .env("FOLIO_AI__ENDPOINT", "http://127.0.0.1:9/v1/chat/completions")
        .args(["enhance", "--action", "grammar"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to process text. Please try again."));
}

#[test]
fn generate_rejects_out_of_range_length() {
    cmd()
        .args(["generate", "--title", "Rust", "--length", "6"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("6"));
}

#[test]
fn generate_rejects_blank_title() {
    cmd()
        .args(["generate", "--title", "  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a title first"));
}
