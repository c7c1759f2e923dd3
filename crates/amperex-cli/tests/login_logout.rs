//! Integration tests for `login`, `logout` and `status` against a mock backend.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn temp_home() -> TempDir {
    TempDir::new().expect("create temp amperex home")
}

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn stored_session(home: &TempDir) -> Option<Value> {
    let contents = fs::read_to_string(home.path().join("session.json")).ok()?;
    serde_json::from_str(&contents).ok()
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"username": "admin", "password": "admin123"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Login successful",
            "token": "abc",
            "user": {"id": "u1", "username": "admin", "email": "admin@example.com", "role": "admin"}
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "message": "Invalid credentials"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_stores_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;
    mount_login(&server).await;

    cargo_bin_cmd!("amperex")
        .env("AMPEREX_HOME", home.path())
        .env("AMPEREX_BASE_URL", server.uri())
        .args(["login", "-u", "admin", "-p", "admin123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as admin"));

    let session = stored_session(&home).expect("session written");
    assert_eq!(session["authToken"], "abc");
    assert_eq!(session["user"]["username"], "admin");
}

#[tokio::test]
async fn test_wrong_password_reports_invalid_credentials() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;
    mount_login(&server).await;

    cargo_bin_cmd!("amperex")
        .env("AMPEREX_HOME", home.path())
        .env("AMPEREX_BASE_URL", server.uri())
        .args(["login", "-u", "admin", "-p", "wrong"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid username or password"));

    assert!(stored_session(&home).is_none());
}

#[tokio::test]
async fn test_password_read_from_stdin() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;
    mount_login(&server).await;

    cargo_bin_cmd!("amperex")
        .env("AMPEREX_HOME", home.path())
        .env("AMPEREX_BASE_URL", server.uri())
        .args(["login", "--username", "admin"])
        .write_stdin("admin123\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as admin"));
}

#[test]
fn test_blank_password_is_rejected_without_request() {
    let home = temp_home();

    cargo_bin_cmd!("amperex")
        .env("AMPEREX_HOME", home.path())
        .env("AMPEREX_BASE_URL", "http://127.0.0.1:1")
        .args(["login", "-u", "admin", "-p", "  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Please enter both username and password",
        ));
}

#[test]
fn test_unreachable_backend_reports_network_error() {
    let home = temp_home();

    cargo_bin_cmd!("amperex")
        .env("AMPEREX_HOME", home.path())
        .env("AMPEREX_BASE_URL", "http://127.0.0.1:1")
        .args(["login", "-u", "admin", "-p", "admin123"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Network error"));
}

#[tokio::test]
async fn test_logout_clears_session_even_when_backend_fails() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    fs::write(
        home.path().join("session.json"),
        r#"{"authToken":"abc","user":{"id":"u1","username":"admin"}}"#,
    )
    .unwrap();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("amperex")
        .env("AMPEREX_HOME", home.path())
        .env("AMPEREX_BASE_URL", server.uri())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));

    assert!(stored_session(&home).is_none());
}

#[test]
fn test_status_without_session() {
    let home = temp_home();

    cargo_bin_cmd!("amperex")
        .env("AMPEREX_HOME", home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}

#[test]
fn test_status_masks_token() {
    let home = temp_home();
    fs::write(
        home.path().join("session.json"),
        r#"{"authToken":"eyJhbGciOiJIUzI1NiJ9.payload.signature","user":{"id":"u1","username":"admin"}}"#,
    )
    .unwrap();

    cargo_bin_cmd!("amperex")
        .env("AMPEREX_HOME", home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as admin"))
        .stdout(predicate::str::contains("eyJhbGciOiJI..."))
        .stdout(predicate::str::contains("signature").not());
}

#[tokio::test]
async fn test_remote_status_rejected_token_clears_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    fs::write(
        home.path().join("session.json"),
        r#"{"authToken":"expired-token-value","user":{"id":"u1","username":"admin"}}"#,
    )
    .unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    cargo_bin_cmd!("amperex")
        .env("AMPEREX_HOME", home.path())
        .env("AMPEREX_BASE_URL", server.uri())
        .args(["status", "--remote"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Session expired"));

    assert!(stored_session(&home).is_none());
}

#[tokio::test]
async fn test_success_without_token_is_not_a_login() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Login successful"
        })))
        .mount(&server)
        .await;

    cargo_bin_cmd!("amperex")
        .env("AMPEREX_HOME", home.path())
        .env("AMPEREX_BASE_URL", server.uri())
        .args(["login", "-u", "admin", "-p", "admin123"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Logged in").not())
        .stderr(predicate::str::contains("Login failed. Please try again."));

    assert!(stored_session(&home).is_none());
}
