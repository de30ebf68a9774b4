//! Wiring of the executor's collaborators from configuration.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use weather_query_client::{ArchiveClient, GeocodeClient};
use weather_query_core::{CommandTable, Executor, validate};
use weather_query_dataset::Dataset;

use crate::config::Config;
use crate::history::History;
use crate::presenter::TerminalPresenter;
use crate::render::Format;

/// The grammar registry: a `--tables` file when given, else the built-in one.
pub(crate) fn load_tables(path: Option<&Path>) -> Result<CommandTable> {
    let Some(path) = path else {
        return Ok(CommandTable::builtin());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read tables file '{}'", path.display()))?;
    let tables = CommandTable::from_json(&json)
        .with_context(|| format!("failed to parse tables file '{}'", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        commands = tables.commands.len(),
        "loaded command tables"
    );
    Ok(tables)
}

/// The dataset named by the config; a missing file is the empty dataset.
pub(crate) fn load_dataset(config: &Config) -> Result<Dataset> {
    let ds = Dataset::load(&config.dataset)
        .with_context(|| format!("failed to load dataset '{}'", config.dataset.display()))?;
    tracing::debug!(path = %config.dataset.display(), days = ds.len(), "loaded dataset");
    Ok(ds)
}

/// Write the dataset back to the configured file.
pub(crate) fn save_dataset(config: &Config, ds: &Dataset) -> Result<()> {
    ds.save(&config.dataset)
        .with_context(|| format!("failed to save dataset '{}'", config.dataset.display()))
}

/// HTTP clients for geocoding and the weather archive.
pub(crate) struct Services {
    pub(crate) geocoder: GeocodeClient,
    pub(crate) archive: ArchiveClient,
}

impl Services {
    pub(crate) fn from_config(config: &Config) -> Result<Self> {
        let client = config.client_config();
        Ok(Self {
            geocoder: GeocodeClient::new(&client).context("failed to build geocoding client")?,
            archive: ArchiveClient::new(&client).context("failed to build archive client")?,
        })
    }
}

/// Submit one query and record it in `history`. Returns `true` when any
/// error was rendered.
///
/// Queries rejected by validation are shown but never recorded.
pub(crate) fn submit(
    executor: &Executor<'_>,
    line: &str,
    format: Format,
    history: &mut History,
) -> Result<bool> {
    let accepted = validate(line, false, &executor.validation_context()).is_ok();
    let mut presenter = TerminalPresenter::new(format);
    executor.submit(line, &mut presenter);
    let failed = presenter.failed();
    if accepted {
        history.record(line, presenter.outputs)?;
    } else {
        tracing::debug!(line, "rejected query not recorded");
    }
    Ok(failed)
}
