//! End-to-end CLI tests for the wallget binary.

#![allow(deprecated)]

mod support;

use assert_cmd::Command;
use predicates::prelude::*;
use support::socket_guard::start_mock_server_or_skip;
use support::{mount_image, mount_search_page, search_body, search_url};
use tempfile::TempDir;

/// Command with an isolated config home and no inherited credential.
fn wallget(config_home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("wallget").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env_remove("WALLGET_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_binary_help_displays_usage() {
    let tempdir = TempDir::new().unwrap();
    wallget(tempdir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Download wallpapers"));
}

#[test]
fn test_binary_version_displays_version() {
    let tempdir = TempDir::new().unwrap();
    wallget(tempdir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("wallget"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let tempdir = TempDir::new().unwrap();
    wallget(tempdir.path())
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

/// The credential check happens before any network activity: the endpoint
/// here is unroutable, so reaching it would produce a different error.
#[test]
fn test_binary_missing_api_key_fails_fast() {
    let tempdir = TempDir::new().unwrap();
    let output_dir = tempdir.path().join("walls");
    wallget(tempdir.path())
        .arg("--api-url")
        .arg("http://127.0.0.1:9/api/v1/search")
        .arg("-o")
        .arg(&output_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("WALLGET_API_KEY"));
    assert!(!output_dir.exists(), "no directory should be created");
}

#[test]
fn test_binary_invalid_config_file_fails() {
    let tempdir = TempDir::new().unwrap();
    let config_dir = tempdir.path().join("wallget");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "retries = 3\n").unwrap();

    wallget(tempdir.path())
        .env("WALLGET_API_KEY", "test-key")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown field"));
}

#[tokio::test]
async fn test_binary_run_prints_summary_and_exits_zero_on_partial_failure() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_search_page(
        &mock_server,
        1,
        search_body(&mock_server, &["good.jpg", "bad.jpg"], 1, 1),
    )
    .await;
    mount_image(&mock_server, "good.jpg", b"img").await;

    let tempdir = TempDir::new().unwrap();
    let output_dir = tempdir.path().join("walls");

    wallget(tempdir.path())
        .env("WALLGET_API_KEY", "test-key")
        .arg("--api-url")
        .arg(search_url(&mock_server))
        .arg("-o")
        .arg(&output_dir)
        .arg("-c")
        .arg("2")
        .assert()
        .success()
        .stdout(predicate::str::contains("good.jpg done [1/"))
        .stdout(predicate::str::contains("bad.jpg failed: HTTP 404"))
        .stdout(predicate::str::contains("1 downloaded, 0 skipped, 1 failed"));

    assert!(output_dir.join("good.jpg").exists());
    assert!(!output_dir.join("bad.jpg").exists());
}

#[tokio::test]
async fn test_binary_config_file_supplies_output_dir() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_search_page(&mock_server, 1, search_body(&mock_server, &["cfg.jpg"], 1, 1)).await;
    mount_image(&mock_server, "cfg.jpg", b"img").await;

    let tempdir = TempDir::new().unwrap();
    let output_dir = tempdir.path().join("from-config");
    let config_dir = tempdir.path().join("wallget");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        format!(
            "output_dir = \"{}\"\napi_url = \"{}\"\n",
            output_dir.display(),
            search_url(&mock_server)
        ),
    )
    .unwrap();

    wallget(tempdir.path())
        .env("WALLGET_API_KEY", "test-key")
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(output_dir.join("cfg.jpg").exists());
}
