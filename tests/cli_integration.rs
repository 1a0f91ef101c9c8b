//! End-to-end CLI tests against the handler-debug binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("handler-debug").unwrap()
}

#[test]
fn endpoints_lists_sample_routes() {
    cmd()
        .args(["--quiet", "endpoints", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/items/{item_id}"))
        .stdout(predicate::str::contains("\"suspending\": true"));
}

#[test]
fn source_returns_declared_text() {
    cmd()
        .args([
            "--quiet",
            "source",
            "--path",
            "/items/{item_id}",
            "--method",
            "GET",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("fn read_item"));
}

#[test]
fn debug_emits_result_and_trace_as_json() {
    cmd()
        .args([
            "--quiet",
            "debug",
            "--path",
            "/items/1",
            "--method",
            "GET",
            "--output",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"item_id\": 1"))
        .stdout(predicate::str::contains("\"trace\""))
        .stdout(predicate::str::contains("\"start_line\""));
}

#[test]
fn debug_missing_route_reports_structured_error() {
    cmd()
        .args([
            "--quiet",
            "debug",
            "--path",
            "/missing",
            "--method",
            "GET",
            "--output",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("endpoint not found"));
}

#[test]
fn debug_validation_failure_names_the_parameter() {
    cmd()
        .args([
            "--quiet",
            "debug",
            "--path",
            "/items/",
            "--method",
            "POST",
            "--body",
            r#"{"price": 10}"#,
            "--output",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed to validate body for item"));
}

#[test]
fn debug_rejects_non_object_body() {
    cmd()
        .args(["--quiet", "debug", "--path", "/items/1", "--body", "[1, 2]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON object"));
}
