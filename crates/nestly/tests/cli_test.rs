//! Integration tests for the `nestly` CLI binary.
//!
//! Argument parsing, help output, shell completions, config handling, and
//! error exit codes, plus one end-to-end write against a mock service.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `nestly` binary with env isolation.
///
/// Clears all `NEST_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn nestly_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("nestly");
    cmd.env("HOME", "/tmp/nestly-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/nestly-cli-test-nonexistent")
        .env_remove("NEST_PROFILE")
        .env_remove("NEST_CONFIG")
        .env_remove("NEST_EMAIL")
        .env_remove("NEST_PASSWORD")
        .env_remove("NEST_ISSUE_TOKEN")
        .env_remove("NEST_COOKIE")
        .env_remove("NEST_API_KEY")
        .env_remove("NEST_API_URL")
        .env_remove("NEST_OUTPUT")
        .env_remove("NEST_TIMEOUT")
        .env_remove("NEST_RETRIES");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

const SAMPLE_CONFIG: &str = r#"
default_profile = "home"

[profiles.home]
email = "owner@example.com"
password = "hunter2"

[profiles.cabin]
issue_token = "https://accounts.google.com/o/oauth2/iframerpc?action=issueToken"
cookie = "SID=abc"
api_key = "key-123"
"#;

fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, SAMPLE_CONFIG).unwrap();
    path
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = nestly_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    nestly_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Nest")
            .and(predicate::str::contains("thermostat"))
            .and(predicate::str::contains("sensor"))
            .and(predicate::str::contains("camera")),
    );
}

#[test]
fn test_version_flag() {
    nestly_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("nestly"));
}

#[test]
fn test_thermostat_help_lists_commands() {
    nestly_cmd()
        .args(["thermostat", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("set-temp")
                .and(predicate::str::contains("set-mode"))
                .and(predicate::str::contains("fan"))
                .and(predicate::str::contains("eco")),
        );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    nestly_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    nestly_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nestly"));
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn test_invalid_output_format() {
    nestly_cmd()
        .args(["--output", "xml", "devices"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("xml"));
}

#[test]
fn test_eco_is_not_a_settable_mode() {
    nestly_cmd()
        .args(["thermostat", "T1", "set-mode", "eco"])
        .assert()
        .code(2);
}

#[test]
fn test_set_temp_requires_number() {
    nestly_cmd()
        .args(["thermostat", "T1", "set-temp", "warm"])
        .assert()
        .code(2);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honors_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");

    nestly_cmd()
        .args(["config", "path", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_config_profiles_marks_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path());

    nestly_cmd()
        .args(["config", "profiles"])
        .env("NEST_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("home *").and(predicate::str::contains("cabin")));
}

#[test]
fn test_config_show_masks_secrets() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path());

    nestly_cmd()
        .args(["config", "show"])
        .env("NEST_CONFIG", &path)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("owner@example.com")
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("hunter2").not())
                .and(predicate::str::contains("SID=abc").not()),
        );
}

#[test]
fn test_config_use_switches_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path());

    nestly_cmd()
        .args(["config", "use", "cabin"])
        .env("NEST_CONFIG", &path)
        .assert()
        .success();

    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.contains(r#"default_profile = "cabin""#), "{saved}");
}

#[test]
fn test_config_use_unknown_profile_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path());

    nestly_cmd()
        .args(["config", "use", "attic"])
        .env("NEST_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("attic"));
}

// ── Error paths ─────────────────────────────────────────────────────

#[test]
fn test_no_config_fails_with_hint() {
    let output = nestly_cmd()
        .args(["thermostat", "T1", "show"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("Configuration file not found"), "{text}");
}

#[test]
fn test_invalid_api_url_is_usage_error() {
    nestly_cmd()
        .args(["--email", "owner@example.com", "--api-url", "not a url", "devices"])
        .env("NEST_PASSWORD", "hunter2")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("api_url"));
}

#[test]
fn test_unreachable_service_exits_with_connection_code() {
    nestly_cmd()
        .args(["--email", "owner@example.com", "--api-url", "http://127.0.0.1:1"])
        .args(["--retries", "1", "devices"])
        .env("NEST_PASSWORD", "hunter2")
        .assert()
        .code(7);
}

// ── End to end ──────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_set_temp_writes_through_mock_service() {
    let server = MockServer::start().await;
    let launch = "/api/0.1/user/user-1/app_launch";

    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "userid": "user-1", "access_token": "tok" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(launch))
        .and(body_json(json!({
            "known_bucket_types": ["buckets"],
            "known_bucket_versions": []
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "updated_buckets": [{
                "object_key": "buckets.user-1",
                "value": { "buckets": ["device.T1", "shared.T1"] }
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(launch))
        .and(body_json(json!({
            "known_bucket_types": ["shared", "device"],
            "known_bucket_versions": []
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "service_urls": { "urls": { "czfe_url": server.uri() } },
            "updated_buckets": [
                { "object_key": "shared.T1", "value": {
                    "current_temperature": 19.5,
                    "target_temperature": 20.0,
                    "target_temperature_low": 18.0,
                    "target_temperature_high": 24.0,
                    "target_temperature_type": "heat",
                    "hvac_ac_state": false,
                    "hvac_heater_state": true,
                    "can_heat": true,
                    "can_cool": false,
                    "compressor_lockout_enabled": false,
                    "compressor_lockout_timeout": 0
                } },
                { "object_key": "device.T1", "value": {
                    "time_to_target": 0,
                    "fan_timer_timeout": 0,
                    "has_fan": false,
                    "current_humidity": 40.0,
                    "eco": { "mode": "schedule" }
                } }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v5/put"))
        .and(body_json(json!({
            "objects": [{
                "object_key": "shared.T1",
                "op": "MERGE",
                "value": { "target_temperature": 21.5 }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    nestly_cmd()
        .args(["--email", "owner@example.com", "--api-url"])
        .arg(server.uri())
        .args(["thermostat", "T1", "set-temp", "21.5"])
        .env("NEST_PASSWORD", "hunter2")
        .assert()
        .success()
        .stderr(predicate::str::contains("Target set to 21.5"));

    nestly_cmd()
        .args(["--email", "owner@example.com", "--api-url"])
        .arg(server.uri())
        .args(["thermostat", "T9", "show"])
        .env("NEST_PASSWORD", "hunter2")
        .assert()
        .code(4);
}
