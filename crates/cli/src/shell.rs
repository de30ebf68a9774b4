//! Interactive shell with live completion.
//!
//! Completion and inline hints come from the same engine that backs
//! `wq suggest`. Ending a line with `?` prints the suggestion panel for the
//! text before it instead of running it.

use std::borrow::Cow;
use std::fs;

use anyhow::{Context as _, Result};
use ariadne::{Color, Fmt};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use weather_query_core::{
    CommandTable, CompletionContext, CursorState, Executor, InputEvent, Key, suggest,
};
use weather_query_dataset::Dataset;

use crate::config::Config;
use crate::history::History;
use crate::render::{self, Format};
use crate::services::{self, Services};

const PROMPT: &str = "wq> ";

// ── Line-editor helper ──────────────────────────────────────────────────

pub(crate) struct WqHelper {
    tables: CommandTable,
    rows: Vec<String>,
    dates: Vec<String>,
}

impl WqHelper {
    pub(crate) fn new(tables: CommandTable, ds: &Dataset) -> Self {
        let mut helper = Self {
            tables,
            rows: Vec::new(),
            dates: Vec::new(),
        };
        helper.refresh(ds);
        helper
    }

    /// Pick up rows and dates after the dataset changed.
    pub(crate) fn refresh(&mut self, ds: &Dataset) {
        self.rows = ds.rows().map(str::to_string).collect();
        self.dates = ds.dates().to_vec();
    }

    fn ctx(&self) -> CompletionContext<'_> {
        CompletionContext {
            tables: &self.tables,
            rows: &self.rows,
            dates: &self.dates,
        }
    }

    /// Every candidate for `line`, each paired with the full line it produces.
    pub(crate) fn candidates(&self, line: &str) -> Vec<Pair> {
        let ctx = self.ctx();
        let shown = suggest(
            line,
            InputEvent::key(Key::Other),
            false,
            CursorState::default(),
            &ctx,
        );
        let Some(panel) = shown.panel() else {
            return Vec::new();
        };
        panel
            .innermost()
            .candidates
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                let picked = suggest(
                    line,
                    InputEvent::Select { index },
                    false,
                    CursorState::default(),
                    &ctx,
                );
                picked.completed.map(|replacement| Pair {
                    display: candidate.text.clone(),
                    replacement,
                })
            })
            .collect()
    }

    /// Text the first candidate would append to `line`.
    pub(crate) fn hint_for(&self, line: &str) -> Option<String> {
        let picked = suggest(
            line,
            InputEvent::Select { index: 0 },
            false,
            CursorState::default(),
            &self.ctx(),
        );
        let completed = picked.completed?;
        completed
            .strip_prefix(line)
            .filter(|rest| !rest.trim().is_empty())
            .map(str::to_string)
    }
}

impl Completer for WqHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> Result<(usize, Vec<Pair>), ReadlineError> {
        // Candidates carry the whole completed line, so replace from 0.
        Ok((0, self.candidates(&line[..pos])))
    }
}

impl Hinter for WqHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }
        self.hint_for(line)
    }
}

impl Highlighter for WqHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("{}", hint.fg(Color::BrightBlack)))
    }
}

impl Validator for WqHelper {}

impl Helper for WqHelper {}

// ── Session ─────────────────────────────────────────────────────────────

/// Run the shell until `:quit` or end of input.
pub(crate) fn run(config: &Config, tables: CommandTable, format: Format) -> Result<()> {
    let mut dataset = services::load_dataset(config)?;
    let clients = Services::from_config(config)?;
    let mut history = History::load(&config.history)?;

    for entry in history.entries() {
        for output in &entry.outputs {
            render::output(output, format);
        }
    }

    let mut rl: Editor<WqHelper, DefaultHistory> =
        Editor::new().context("failed to start line editor")?;
    rl.set_helper(Some(WqHelper::new(tables.clone(), &dataset)));
    for entry in history.entries() {
        let _ = rl.add_history_entry(entry.input.as_str());
    }

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                if let Some(rest) = line.strip_prefix(':') {
                    let (cmd, arg) = rest.split_once(' ').unwrap_or((rest, ""));
                    match cmd {
                        "quit" | "q" | "exit" => break,
                        "help" | "h" => print_shell_help(),
                        "upload" => match upload(config, arg.trim()) {
                            Ok(ds) => {
                                println!("Loaded {} days from {}", ds.len(), arg.trim());
                                if let Some(helper) = rl.helper_mut() {
                                    helper.refresh(&ds);
                                }
                                dataset = ds;
                            }
                            Err(e) => report(&e),
                        },
                        other => eprintln!(
                            "{} unknown shell command `:{other}` (try :help)",
                            "error:".fg(Color::Red)
                        ),
                    }
                    continue;
                }

                if let Some(partial) = line.strip_suffix('?') {
                    if let Some(helper) = rl.helper() {
                        show_panel(helper, partial);
                    }
                    continue;
                }

                let executor =
                    Executor::new(&tables, &dataset, &clients.geocoder, &clients.archive);
                if let Err(e) = services::submit(&executor, line, format, &mut history) {
                    report(&e);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "Type :quit to exit".fg(Color::BrightBlack));
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err).context("failed to read input"),
        }
    }
    Ok(())
}

fn show_panel(helper: &WqHelper, partial: &str) {
    let shown = suggest(
        partial,
        InputEvent::Focus,
        false,
        CursorState::default(),
        &helper.ctx(),
    );
    if let Some(panel) = shown.panel() {
        for line in render::panel_lines(panel) {
            println!("{line}");
        }
    }
}

fn upload(config: &Config, path: &str) -> Result<Dataset> {
    anyhow::ensure!(!path.is_empty(), "usage: :upload <FILE>");
    let text = fs::read_to_string(path).with_context(|| format!("failed to read '{path}'"))?;
    let ds = Dataset::parse_upload(&text).with_context(|| format!("failed to parse '{path}'"))?;
    services::save_dataset(config, &ds)?;
    tracing::info!(path, days = ds.len(), "dataset uploaded");
    Ok(ds)
}

fn report(err: &anyhow::Error) {
    eprintln!("{} {err:#}", "error:".fg(Color::Red));
}

fn print_shell_help() {
    println!("Type a query and press Enter. Tab completes, → accepts the hint.");
    println!("End a line with `?` to show its suggestion panel.");
    println!();
    println!("  :upload <FILE>  replace the dataset with FILE");
    println!("  :help           show this message");
    println!("  :quit           leave the shell");
}
