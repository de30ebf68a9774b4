//! CLI tests for the dataset commands: `upload`, `update` and `delete`.

mod common;

use std::fs;

use common::{PAIR, Workspace, json, json_lines};

fn max_temperature(ws: &Workspace) -> String {
    let lines = json_lines(&ws.run(&["run", "max `temperature_max`"]));
    lines[1]["text"].as_str().expect("text result").to_string()
}

#[test]
fn upload_replaces_dataset() {
    let ws = Workspace::new("");
    let file = ws.path("upload.txt");
    fs::write(&file, PAIR).unwrap();

    let output = ws.run(&["upload", file.to_str().unwrap()]);
    assert!(output.status.success(), "{output:?}");
    let out = json(&output);
    assert_eq!(out["status"], "uploaded");
    assert_eq!(out["count"], 2);
    assert!(ws.dataset.exists());
    assert_eq!(max_temperature(&ws), "75°");
}

#[test]
fn upload_without_records_fails() {
    let ws = Workspace::new(PAIR);
    let file = ws.path("empty.txt");
    fs::write(&file, "date:\ntemperature_max:\n").unwrap();

    let output = ws.run(&["upload", file.to_str().unwrap()]);
    assert!(!output.status.success());
    let out = json(&output);
    assert_eq!(out["success"], false);
    assert_eq!(out["error"], "command_failed");
    assert_eq!(max_temperature(&ws), "75°");
}

#[test]
fn update_merges_records() {
    let ws = Workspace::new(PAIR);
    let output = ws.run(&[
        "update",
        r#"[{"date": "2024-04-24", "temperature_max": 90}]"#,
    ]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(json(&output)["count"], 1);
    assert_eq!(max_temperature(&ws), "90°");
}

#[test]
fn update_unknown_date_changes_nothing() {
    let ws = Workspace::new(PAIR);
    let output = ws.run(&[
        "update",
        r#"[{"date": "2024-04-24", "temperature_max": "90"}, {"date": "1999-01-01", "temperature_max": "1"}]"#,
    ]);
    assert!(!output.status.success());
    assert_eq!(json(&output)["error"], "command_failed");
    assert_eq!(max_temperature(&ws), "75°");
}

#[test]
fn delete_removes_days() {
    let ws = Workspace::new(PAIR);
    let output = ws.run(&["delete", "2024-04-25"]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(json(&output)["count"], 1);
    assert_eq!(max_temperature(&ws), "70°");
}

#[test]
fn dataset_flag_overrides_config() {
    let ws = Workspace::new("");
    let other = ws.path("other.txt");
    fs::write(&other, PAIR).unwrap();

    let output = ws.run(&["--dataset", other.to_str().unwrap(), "run", "min `temperature_max`"]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(json_lines(&output)[1]["text"], "70°");
}
