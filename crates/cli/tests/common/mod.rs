//! Shared helpers for `wq` CLI tests.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use assert_cmd::cargo;

/// Two days of maximum temperatures.
pub const PAIR: &str = "\
date: 2024-04-24 2024-04-25
temperature_max: 70 75
";

pub fn wq_cmd() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("wq"));
    cmd.env_remove("RUST_LOG").env_remove("WQ_GEOCODE_API_KEY");
    cmd
}

/// A temporary directory holding a config, dataset and history file.
///
/// Service URLs point at a closed local port so nothing reaches the network.
pub struct Workspace {
    pub dir: tempfile::TempDir,
    pub config: PathBuf,
    pub dataset: PathBuf,
    pub history: PathBuf,
}

impl Workspace {
    pub fn new(dataset: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = dir.path().join("wq.json");
        let dataset_path = dir.path().join("weather.txt");
        let history = dir.path().join("history.json");
        if !dataset.is_empty() {
            fs::write(&dataset_path, dataset).expect("write dataset");
        }
        let cfg = serde_json::json!({
            "dataset": dataset_path,
            "history": history,
            "geocode_url": "http://127.0.0.1:9/v1/geocode/forward",
            "archive_url": "http://127.0.0.1:9/v1/archive",
            "timeout_secs": 2,
        });
        fs::write(&config, cfg.to_string()).expect("write config");
        Self {
            dir,
            config,
            dataset: dataset_path,
            history,
        }
    }

    /// Run `wq` with this workspace's config and JSON output.
    pub fn run(&self, args: &[&str]) -> Output {
        wq_cmd()
            .current_dir(self.dir.path())
            .arg("--config")
            .arg(&self.config)
            .args(["--output", "json"])
            .args(args)
            .output()
            .expect("run wq")
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Stdout as one JSON value.
pub fn json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid json ({e}): {stdout}"))
}

/// Stdout as JSON lines, one value per rendered entry.
pub fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("invalid json ({e}): {l}")))
        .collect()
}
