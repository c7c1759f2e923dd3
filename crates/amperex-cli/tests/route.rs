use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_protected_route_without_session_redirects() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("amperex")
        .env("AMPEREX_HOME", dir.path())
        .args(["route", "/team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("redirect -> /login (from /team)"));
}

#[test]
fn test_protected_route_with_session_is_allowed() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("session.json"), r#"{"authToken":"abc"}"#).unwrap();

    cargo_bin_cmd!("amperex")
        .env("AMPEREX_HOME", dir.path())
        .args(["route", "/dashboard"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/dashboard (Dashboard)"));
}

#[test]
fn test_unknown_path_goes_to_entry() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("session.json"), r#"{"authToken":"abc"}"#).unwrap();

    cargo_bin_cmd!("amperex")
        .env("AMPEREX_HOME", dir.path())
        .args(["route", "/settings"])
        .assert()
        .success()
        .stdout(predicate::str::diff("redirect -> /login\n"));
}

#[test]
fn test_login_page_is_public() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("amperex")
        .env("AMPEREX_HOME", dir.path())
        .args(["route", "/login"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/login (Sign in)"));
}
