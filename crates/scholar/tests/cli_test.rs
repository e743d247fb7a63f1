//! Integration tests for the `scholar` CLI binary.
//!
//! Argument parsing, help output, completions, the session commands and
//! exit codes. Backend-facing commands run against wiremock or against an
//! address nothing listens on.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Nothing listens on the discard port.
const DEAD_BACKEND: &str = "http://127.0.0.1:9";

/// Build a [`Command`] for the `scholar` binary with env isolation.
///
/// Clears all `SCHOLAR_*` env vars and points config and data directories
/// into `home` so tests never touch the user's real configuration.
fn scholar_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("scholar");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("SCHOLAR_DATA_DIR", home.join("session"))
        .env_remove("SCHOLAR_PROFILE")
        .env_remove("SCHOLAR_API_URL")
        .env_remove("SCHOLAR_OUTPUT")
        .env_remove("SCHOLAR_INSECURE")
        .env_remove("SCHOLAR_TIMEOUT")
        .env_remove("SCHOLAR_PASSWORD")
        .env_remove("SCHOLAR_LOG_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Register and sign in an operator inside `home`.
fn signed_in() -> TempDir {
    let home = tempfile::tempdir().unwrap();
    scholar_cmd(home.path())
        .args([
            "signup",
            "--first-name",
            "Ada",
            "--last-name",
            "Lovelace",
            "--email",
            "ada@school.edu",
            "--password",
            "engine",
        ])
        .assert()
        .success();
    home
}

async fn backend() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/course/getcourse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "courses": [
                { "_id": "c1", "name": "Web Development", "price": 499.99, "institute": "Tech Academy" },
                { "_id": "c2", "name": "Data Science", "price": 599.99, "institute": "Data Insights" },
                { "_id": "c3", "name": "Art History", "price": 120, "institute": "City College" }
            ]
        })))
        .mount(&server)
        .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = scholar_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = tempfile::tempdir().unwrap();
    scholar_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("courses")
            .and(predicate::str::contains("students"))
            .and(predicate::str::contains("teachers"))
            .and(predicate::str::contains("console")),
    );
}

#[test]
fn test_json_log_format_writes_events_to_stderr() {
    let home = tempfile::tempdir().unwrap();
    let output = scholar_cmd(home.path())
        .env("SCHOLAR_LOG_FORMAT", "json")
        .args(["-vv", "whoami"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains(r#""level":"DEBUG""#),
        "Expected JSON log events in stderr:\n{stderr}"
    );
    assert!(output.stdout.is_empty());
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    scholar_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("scholar"));
}

#[test]
fn test_completions_bash() {
    let home = tempfile::tempdir().unwrap();
    scholar_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Session ─────────────────────────────────────────────────────────

#[test]
fn test_entity_commands_require_login() {
    let home = tempfile::tempdir().unwrap();
    scholar_cmd(home.path())
        .args(["--api-url", DEAD_BACKEND, "courses", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_signup_then_whoami() {
    let home = signed_in();
    scholar_cmd(home.path())
        .args(["-o", "json", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"email\": \"ada@school.edu\""));
}

#[test]
fn test_logout_ends_the_session() {
    let home = signed_in();
    scholar_cmd(home.path()).arg("logout").assert().success();
    scholar_cmd(home.path()).arg("whoami").assert().code(3);
}

#[test]
fn test_login_with_wrong_password() {
    let home = signed_in();
    scholar_cmd(home.path()).arg("logout").assert().success();
    scholar_cmd(home.path())
        .args(["login", "--email", "ada@school.edu", "--password", "wrong"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid email or password"));
    scholar_cmd(home.path())
        .args(["login", "--email", "ada@school.edu"])
        .env("SCHOLAR_PASSWORD", "engine")
        .assert()
        .success();
}

#[test]
fn test_signup_rejects_invalid_email() {
    let home = tempfile::tempdir().unwrap();
    scholar_cmd(home.path())
        .args([
            "signup",
            "--first-name",
            "Bo",
            "--last-name",
            "Tran",
            "--email",
            "not-an-email",
            "--password",
            "pw",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Email is invalid"));
}

// ── Courses against a backend ───────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_courses_list_search_and_sort() {
    let server = backend().await;
    let home = signed_in();

    let output = scholar_cmd(home.path())
        .args(["--api-url", &server.uri(), "-o", "plain", "courses", "list", "--sort", "price", "--desc"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "c2\nc1\nc3");

    let output = scholar_cmd(home.path())
        .args(["--api-url", &server.uri(), "-o", "json", "courses", "list", "--search", "DATA"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Data Science"));
    assert!(!stdout.contains("Web Development"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_digit_only_server_key_can_be_removed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/course/getcourse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "courses": [{ "_id": "42", "name": "Robotics", "price": 250, "institute": "Tech Academy" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/course/deletecourse/42"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let home = signed_in();

    let output = scholar_cmd(home.path())
        .args(["--api-url", &server.uri(), "--yes", "courses", "remove", "42"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("Course removed"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_invalid_course_never_reaches_backend() {
    let server = backend().await;
    Mock::given(method("POST"))
        .and(path("/course/addcourse"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let home = signed_in();

    scholar_cmd(home.path())
        .args([
            "--api-url",
            &server.uri(),
            "courses",
            "add",
            "--name",
            "Robotics",
            "--price",
            "abc",
            "--institute",
            "Tech Academy",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Price must be a non-negative number"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_backend_failure_exits_with_connection_code() {
    let server = backend().await;
    Mock::given(method("POST"))
        .and(path("/course/addcourse"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "database offline" })))
        .mount(&server)
        .await;
    let home = signed_in();

    scholar_cmd(home.path())
        .args([
            "--api-url",
            &server.uri(),
            "courses",
            "add",
            "--name",
            "Robotics",
            "--price",
            "350",
            "--institute",
            "Tech Academy",
        ])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("database offline"));
}

#[test]
fn test_unreachable_backend_exits_with_connection_code() {
    let home = signed_in();
    scholar_cmd(home.path())
        .args(["--api-url", DEAD_BACKEND, "--timeout", "5", "students", "list"])
        .assert()
        .code(7);
}

// ── Teachers ────────────────────────────────────────────────────────

#[test]
fn test_one_shot_teachers_start_empty() {
    let home = signed_in();
    scholar_cmd(home.path())
        .args(["--api-url", DEAD_BACKEND, "teachers", "remove", "1"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("teachers list"));
}

#[test]
fn test_console_keeps_teachers_between_commands() {
    let home = signed_in();
    let output = scholar_cmd(home.path())
        .args(["--api-url", DEAD_BACKEND, "--timeout", "5", "-o", "json", "console"])
        .write_stdin(
            "teachers add --name \"Grace Hopper\" --email grace@school.edu --course Compilers\n\
             teachers add --name Impostor --email grace@school.edu\n\
             teachers list\n\
             exit\n",
        )
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Grace Hopper"), "stdout:\n{stdout}");
    assert!(!stdout.contains("Impostor"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("A teacher with this email already exists"));
}
