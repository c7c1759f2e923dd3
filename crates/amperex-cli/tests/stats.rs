//! Integration tests for `stats`.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn signed_in_home() -> TempDir {
    let home = TempDir::new().expect("create temp amperex home");
    fs::write(
        home.path().join("session.json"),
        r#"{"authToken":"abc","user":{"id":"u1","username":"admin"}}"#,
    )
    .unwrap();
    home
}

#[test]
fn test_stats_requires_session() {
    let home = TempDir::new().unwrap();

    cargo_bin_cmd!("amperex")
        .env("AMPEREX_HOME", home.path())
        .env("AMPEREX_BASE_URL", "http://127.0.0.1:1")
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_offline_config_shows_sample_data() {
    let home = signed_in_home();
    fs::write(home.path().join("config.toml"), "[api]\noffline = true\n").unwrap();

    cargo_bin_cmd!("amperex")
        .env("AMPEREX_HOME", home.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("1234"))
        .stdout(predicate::str::contains("backend not configured"));
}

#[tokio::test]
async fn test_live_stats_as_json() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = signed_in_home();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/stats"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"testsExecuted": 1247, "activeSessions": 5, "systemUptime": 99.9, "complianceRate": 97.0}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = cargo_bin_cmd!("amperex")
        .env("AMPEREX_HOME", home.path())
        .env("AMPEREX_BASE_URL", server.uri())
        .args(["stats", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["testsExecuted"], 1247);
    assert_eq!(value["activeSessions"], 5);
    assert_eq!(value["live"], true);
    assert_eq!(value["source"], "live");
}

#[test]
fn test_unreachable_backend_falls_back() {
    let home = signed_in_home();

    cargo_bin_cmd!("amperex")
        .env("AMPEREX_HOME", home.path())
        .env("AMPEREX_BASE_URL", "http://127.0.0.1:1")
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("1234"))
        .stdout(predicate::str::contains("backend unreachable"));

    assert!(home.path().join("session.json").exists());
}

#[tokio::test]
async fn test_rejected_token_clears_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = signed_in_home();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/stats"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    cargo_bin_cmd!("amperex")
        .env("AMPEREX_HOME", home.path())
        .env("AMPEREX_BASE_URL", server.uri())
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Session expired"))
        .stderr(predicate::str::contains("amperex login"));

    assert!(!home.path().join("session.json").exists());
}
