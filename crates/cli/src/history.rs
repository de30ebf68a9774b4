//! Persisted query history.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::presenter::Output;

/// One submitted query and everything it rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct HistoryEntry {
    pub(crate) input: String,
    pub(crate) outputs: Vec<Output>,
}

/// Append-only list of entries, saved as a JSON array after every change.
pub(crate) struct History {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
}

impl History {
    /// Load from `path`; a missing file is an empty history.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let entries = match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text)
                .with_context(|| format!("failed to parse history file '{}'", path.display()))?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read history file '{}'", path.display()));
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub(crate) fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Record a query's outputs. A query that cleared the history is not
    /// recorded itself.
    pub(crate) fn record(&mut self, input: &str, outputs: Vec<Output>) -> Result<()> {
        if outputs.iter().any(|o| matches!(o, Output::Clear)) {
            return self.clear();
        }
        self.entries.push(HistoryEntry {
            input: input.to_string(),
            outputs,
        });
        self.save()
    }

    pub(crate) fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.save()
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write history file '{}'", self.path.display()))
    }
}
