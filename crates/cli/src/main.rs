mod config;
mod history;
mod presenter;
mod render;
mod services;
mod shell;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use ariadne::{Color, Fmt};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use weather_query_core::{
    CommandTable, CompletionContext, CursorState, Diagnostic, Executor, InputEvent, Key,
    ValidationContext, parse_query, suggest, to_pretty_json,
};
use weather_query_dataset::{Dataset, parse_records};
use weather_query_diagnostics as diag;

use crate::config::Config;
use crate::history::History;
use crate::presenter::Output;
use crate::render::{Format, print_summary, render_diagnostic};
use crate::services::Services;

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "wq",
    version,
    about = "Weather query language: run, check and complete queries over a weather dataset"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Command tables JSON replacing the built-in grammar.
    #[arg(long, global = true)]
    tables: Option<PathBuf>,

    /// Dataset file (overrides the config file).
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// JSON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging on stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    // ── Queries ─────────────────────────────────────────────────────
    /// Validate and execute a query.
    Run { query: String },

    /// Validate a query without executing it.
    Check {
        query: String,
        /// Check as a nested sub-query.
        #[arg(long)]
        sub_query: bool,
    },

    /// Show the completion panel for a partially typed line.
    Suggest {
        line: String,
        /// Complete as a nested sub-query.
        #[arg(long)]
        sub_query: bool,
        /// Key event to apply.
        #[arg(long, value_enum, default_value_t = KeyArg::Other)]
        key: KeyArg,
        /// Currently selected candidate.
        #[arg(long, default_value_t = 0)]
        selected: usize,
        /// Pointer choice of a candidate (overrides --key).
        #[arg(long)]
        select: Option<usize>,
    },

    /// Interactive shell with completion.
    Shell,

    // ── Dataset ─────────────────────────────────────────────────────
    /// Replace the dataset with a flat-file upload.
    Upload { file: PathBuf },

    /// Merge JSON records (`[{"date": ..., "<row>": ...}]`) into the dataset.
    Update { json: String },

    /// Remove the given dates from the dataset.
    Delete {
        #[arg(required = true)]
        dates: Vec<String>,
    },

    // ── Reference / informational ───────────────────────────────────
    /// Print saved query history.
    History {
        /// Delete the history instead.
        #[arg(long)]
        clear: bool,
    },

    /// Dump the command tables.
    Commands,

    /// Explain a diagnostic ID (e.g. WQ1102).
    Explain { id: String },
}

/// Key event for the `suggest` command.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum KeyArg {
    /// Previous candidate.
    Up,
    /// Next candidate.
    Down,
    /// Insert the selected candidate.
    Tab,
    /// Hide the panel.
    Escape,
    /// Ordinary typing.
    Other,
}

impl From<KeyArg> for Key {
    fn from(k: KeyArg) -> Self {
        match k {
            KeyArg::Up => Key::ArrowUp,
            KeyArg::Down => Key::ArrowDown,
            KeyArg::Tab => Key::Tab,
            KeyArg::Escape => Key::Escape,
            KeyArg::Other => Key::Other,
        }
    }
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let format = Format::resolve_or_detect(cli.output.as_deref());

    if let Err(err) = run(cli, format) {
        match format {
            Format::Json => {
                let out = serde_json::json!({
                    "success": false,
                    "error": "command_failed",
                    "message": format!("{err:#}"),
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&out).expect("error JSON serialization cannot fail")
                );
            }
            Format::Pretty => eprintln!("{} {err:#}", "error:".fg(Color::Red)),
        }
        process::exit(1);
    }
}

/// Logs go to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli, format: Format) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env(|name| std::env::var(name).ok());
    if let Some(path) = cli.dataset {
        config.dataset = path;
    }
    let tables = services::load_tables(cli.tables.as_deref())?;

    match cli.cmd {
        Cmd::Run { query } => cmd_run(&config, &tables, &query, format),
        Cmd::Check { query, sub_query } => cmd_check(&config, &tables, &query, sub_query, format),
        Cmd::Suggest {
            line,
            sub_query,
            key,
            selected,
            select,
        } => {
            let event = match select {
                Some(index) => InputEvent::Select { index },
                None => InputEvent::key(key.into()),
            };
            cmd_suggest(&config, &tables, &line, sub_query, event, selected, format)
        }
        Cmd::Shell => shell::run(&config, tables, format),
        Cmd::Upload { file } => cmd_upload(&config, &file, format),
        Cmd::Update { json } => cmd_update(&config, &json, format),
        Cmd::Delete { dates } => cmd_delete(&config, &dates, format),
        Cmd::History { clear } => cmd_history(&config, clear, format),
        Cmd::Commands => cmd_commands(&tables, format),
        Cmd::Explain { id } => cmd_explain(&id, format),
    }
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_run(config: &Config, tables: &CommandTable, query: &str, format: Format) -> Result<()> {
    let dataset = services::load_dataset(config)?;
    let clients = Services::from_config(config)?;
    let mut history = History::load(&config.history)?;

    let executor = Executor::new(tables, &dataset, &clients.geocoder, &clients.archive);
    let failed = services::submit(&executor, query, format, &mut history)?;

    if failed {
        process::exit(1);
    }
    Ok(())
}

fn cmd_check(
    config: &Config,
    tables: &CommandTable,
    query: &str,
    sub_query: bool,
    format: Format,
) -> Result<()> {
    let dataset = services::load_dataset(config)?;
    let ctx = ValidationContext::new(tables, dataset.len());
    let (ast, diagnostics) = match parse_query(query, sub_query, &ctx) {
        Ok(node) => (Some(node), Vec::new()),
        Err(d) => (None, vec![d]),
    };
    let ok = diagnostics.is_empty();

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ok": ok,
                "ast": ast,
                "diagnostics": diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // AST to stdout, diagnostics to stderr.
            if let Some(node) = &ast {
                println!("{}", to_pretty_json(node));
            }
            for d in &diagnostics {
                render_diagnostic(query, d);
            }
            print_summary(&diagnostics);
            if ok {
                eprintln!("query ok");
            }
        }
    }

    exit_on_errors(&diagnostics);
    Ok(())
}

fn cmd_suggest(
    config: &Config,
    tables: &CommandTable,
    line: &str,
    sub_query: bool,
    event: InputEvent,
    selected: usize,
    format: Format,
) -> Result<()> {
    let dataset = services::load_dataset(config)?;
    let rows: Vec<String> = dataset.rows().map(str::to_string).collect();
    let ctx = CompletionContext {
        tables,
        rows: &rows,
        dates: dataset.dates(),
    };
    let s = suggest(line, event, sub_query, CursorState { selected }, &ctx);

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&s)?),
        Format::Pretty => {
            if let Some(completed) = &s.completed {
                println!("{} {completed}", ">".fg(Color::Cyan));
            }
            match s.panel() {
                Some(panel) => {
                    for l in render::panel_lines(panel) {
                        println!("{l}");
                    }
                }
                None => eprintln!("(no panel)"),
            }
        }
    }
    Ok(())
}

fn cmd_upload(config: &Config, file: &Path, format: Format) -> Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("failed to read upload '{}'", file.display()))?;
    let ds = Dataset::parse_upload(&text)
        .with_context(|| format!("failed to parse upload '{}'", file.display()))?;
    services::save_dataset(config, &ds)?;
    tracing::info!(file = %file.display(), days = ds.len(), "dataset replaced");
    status_message(format, "uploaded", ds.len(), &config.dataset);
    Ok(())
}

fn cmd_update(config: &Config, json: &str, format: Format) -> Result<()> {
    let records = parse_records(json).context("failed to decode records")?;
    let mut ds = services::load_dataset(config)?;
    let n = ds
        .update_records(&records)
        .context("failed to update dataset")?;
    services::save_dataset(config, &ds)?;
    status_message(format, "updated", n, &config.dataset);
    Ok(())
}

fn cmd_delete(config: &Config, dates: &[String], format: Format) -> Result<()> {
    let mut ds = services::load_dataset(config)?;
    let n = ds.remove_dates(dates);
    services::save_dataset(config, &ds)?;
    status_message(format, "deleted", n, &config.dataset);
    Ok(())
}

fn cmd_history(config: &Config, clear: bool, format: Format) -> Result<()> {
    let mut history = History::load(&config.history)?;
    if clear {
        history.clear()?;
        return match format {
            Format::Json => {
                println!("{}", serde_json::json!({ "status": "cleared" }));
                Ok(())
            }
            Format::Pretty => {
                render::output(&Output::Clear, format);
                Ok(())
            }
        };
    }
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(history.entries())?),
        Format::Pretty => {
            for entry in history.entries() {
                for output in &entry.outputs {
                    render::output(output, format);
                }
            }
        }
    }
    Ok(())
}

fn cmd_commands(tables: &CommandTable, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", tables.to_json_pretty()?),
        Format::Pretty => render::output(&Output::help(tables), format),
    }
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let text = diag::explain(id);
            let out = serde_json::json!({
                "id": id,
                "explanation": text,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // Explanation is the expected output, so stdout.
            if let Some(text) = diag::explain(id) {
                println!("{}: {}", id.fg(Color::Cyan), text);
            } else {
                println!("{}: (no explanation available)", id);
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Report a dataset edit in the appropriate format.
fn status_message(format: Format, status: &str, days: usize, dataset: &Path) {
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "status": status,
                "count": days,
                "dataset": dataset.display().to_string(),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&out).expect("status JSON serialization cannot fail")
            );
        }
        Format::Pretty => eprintln!("{status} {days}: {}", dataset.display()),
    }
}

/// Exit with code 1 if any diagnostic is an error.
fn exit_on_errors(diagnostics: &[Diagnostic]) {
    if diagnostics.iter().any(Diagnostic::is_error) {
        process::exit(1);
    }
}
