//! CLI tests for `wq explain` and `wq commands`.

mod common;

use common::{json, wq_cmd};

#[test]
fn explain_known_code_json_returns_explanation() {
    let output = wq_cmd()
        .args(["explain", "WQ1102", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let json = json(&output);
    assert_eq!(json["id"], "WQ1102");
    assert!(json["explanation"].is_string());
}

#[test]
fn explain_unknown_code_json_returns_null_explanation() {
    let output = wq_cmd()
        .args(["explain", "WQ9999", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let json = json(&output);
    assert_eq!(json["id"], "WQ9999");
    assert!(json["explanation"].is_null());
}

#[test]
fn explain_pretty_shows_human_readable_text() {
    let output = wq_cmd()
        .args(["explain", "WQ1102", "--output", "pretty"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("WQ1102") && stdout.contains(':'),
        "unexpected output: {stdout}"
    );
}

#[test]
fn commands_dump_builtin_tables() {
    let output = wq_cmd()
        .args(["commands", "--output", "json"])
        .output()
        .expect("run commands");

    assert!(output.status.success());
    let json = json(&output);
    let names: Vec<&str> = json["commands"]
        .as_array()
        .expect("commands array")
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    for expected in ["help", "max", "histogram", "compare"] {
        assert!(names.contains(&expected), "{expected} missing from {names:?}");
    }
}
