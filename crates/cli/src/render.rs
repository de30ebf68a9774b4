//! Pretty rendering using ariadne.
//!
//! Converts diagnostics into ariadne [`Report`]s annotated against the query
//! line, and draws results and suggestion panels for the terminal. Falls back
//! to JSON when the output is piped or when the user explicitly requests it.

use std::io::{self, IsTerminal};

use ariadne::{Color, Config, Fmt, Label, Report, ReportKind, Source};
use weather_query_core::{Bar, Diagnostic, Grid, Panel, ParamType, Severity};

use crate::presenter::Output;

/// Name shown for the query line in annotated reports.
const SOURCE_NAME: &str = "query";

/// Widest histogram bar, in cells.
const BAR_WIDTH: usize = 40;

// ── Output format ───────────────────────────────────────────────────────

/// Output format for everything the CLI prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured terminal output.
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit choice, else pretty for a TTY and JSON for pipes.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Severity mapping ────────────────────────────────────────────────────

fn report_kind(severity: Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Warn => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
        _ => ReportKind::Warning,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warn => Color::Yellow,
        Severity::Info => Color::Blue,
        _ => Color::White,
    }
}

fn type_color(kind: ParamType) -> Color {
    match kind {
        ParamType::Row => Color::Magenta,
        ParamType::Date => Color::Cyan,
        ParamType::Enum => Color::Yellow,
        ParamType::String => Color::Green,
        ParamType::Int | ParamType::Number => Color::Blue,
        ParamType::SubQuery | ParamType::Unsupported => Color::White,
    }
}

// ── Diagnostics ─────────────────────────────────────────────────────────

/// Render one diagnostic against its query line to stderr.
pub(crate) fn render_diagnostic(line: &str, diag: &Diagnostic) {
    let Some(span) = diag.span else {
        eprintln!("{}[{}]: {}", diag.severity, diag.id, diag.message);
        if let Some(explanation) = diag.explain() {
            eprintln!("  = help: {explanation}");
        }
        return;
    };

    // Clamp to the line so a stale span cannot panic.
    let start = span.start.min(line.len());
    let end = span.end.min(line.len()).max(start);
    let mut cache = (SOURCE_NAME, Source::from(line));

    let mut builder = Report::build(report_kind(diag.severity), (SOURCE_NAME, start..end))
        .with_code(&diag.id)
        .with_message(&diag.message)
        .with_config(Config::default().with_compact(false))
        .with_label(
            Label::new((SOURCE_NAME, start..end))
                .with_message(label_message(diag))
                .with_color(severity_color(diag.severity)),
        );
    if let Some(explanation) = diag.explain() {
        builder = builder.with_help(explanation);
    }
    builder.finish().eprint(&mut cache).ok();
}

/// Short label from context, e.g. `param=row, expected=row`.
fn label_message(diag: &Diagnostic) -> String {
    match &diag.context {
        Some(ctx) if !ctx.is_empty() => ctx
            .iter()
            .filter(|(k, _)| k.as_str() != "nested")
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
        _ => diag.message.clone(),
    }
}

// ── Results ─────────────────────────────────────────────────────────────

/// Print one presenter entry.
///
/// JSON mode writes one object per line to stdout. Pretty mode writes results
/// to stdout and diagnostics to stderr.
pub(crate) fn output(out: &Output, format: Format) {
    if format == Format::Json {
        println!(
            "{}",
            serde_json::to_string(out).expect("output serialization cannot fail")
        );
        return;
    }
    match out {
        Output::Echo { line } => println!("{} {line}", ">".fg(Color::Cyan)),
        Output::Text { text } => println!("{text}"),
        Output::Table { grid } => {
            for line in table_lines(grid) {
                println!("{line}");
            }
        }
        Output::Histogram {
            title,
            y_label,
            bars,
        } => {
            println!("{}", title.fg(Color::Cyan));
            println!("{}", format!("y: {y_label}").fg(Color::BrightBlack));
            for line in histogram_lines(bars) {
                println!("{line}");
            }
        }
        Output::WeatherCode { code, label } => {
            println!("{}", label.fg(weather_code_color(*code)));
        }
        Output::Error { line, diagnostic } => render_diagnostic(line, diagnostic),
        Output::Help { commands } => {
            println!("{}", "Queries:".fg(Color::Cyan));
            for c in commands {
                println!("  {}  {}", c.usage, format!("({})", c.arity).fg(Color::BrightBlack));
                println!("      {}", c.description);
            }
            println!();
            println!("{}", "Parameter types:".fg(Color::Cyan));
            for (name, doc) in TYPE_DOCS {
                println!("  {name}: {doc}");
            }
        }
        Output::Upload => println!(
            "Use `wq upload <FILE>` (or `:upload <FILE>` in the shell) to load a dataset."
        ),
        Output::Clear => println!("{}", "History cleared.".fg(Color::BrightBlack)),
    }
}

const TYPE_DOCS: [(&str, &str); 5] = [
    ("row", "a dataset column in back-ticks, e.g. `temperature_max`"),
    (
        "date",
        "a day index (0 is the first day, -1 the last) or an ISO date like 2024-04-24",
    ),
    ("number", "a decimal number, e.g. 38.9 or -94.7"),
    ("string", "text in double quotes, e.g. \"Kansas City\""),
    ("subquery", "a min, max, avg or value query nested at the end"),
];

fn weather_code_color(code: i64) -> Color {
    match code {
        0..=3 => Color::Yellow,
        45 | 48 => Color::BrightBlack,
        51..=67 | 80..=82 => Color::Blue,
        71..=77 | 85 | 86 => Color::White,
        _ => Color::Magenta,
    }
}

/// Column-aligned table rows: header, rule, then one line per day.
pub(crate) fn table_lines(grid: &Grid) -> Vec<String> {
    let mut widths: Vec<usize> = grid.headers.iter().map(|h| h.chars().count()).collect();
    for row in &grid.rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join(" │ ")
            .trim_end()
            .to_string()
    };
    let mut out = vec![line(&grid.headers)];
    out.push(
        widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─"),
    );
    out.extend(grid.rows.iter().map(|r| line(r)));
    out
}

/// One horizontal bar per day, scaled to the largest magnitude.
pub(crate) fn histogram_lines(bars: &[Bar]) -> Vec<String> {
    let peak = bars.iter().map(|b| b.value.abs()).fold(0.0_f64, f64::max);
    bars.iter()
        .map(|b| {
            let cells = if peak > 0.0 {
                ((b.value.abs() / peak) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            format!("{} │{} {}", b.date, "█".repeat(cells), b.value)
        })
        .collect()
}

// ── Suggestion panels ───────────────────────────────────────────────────

/// Lines of a suggestion panel; nested panels are indented.
pub(crate) fn panel_lines(panel: &Panel) -> Vec<String> {
    let mut out = Vec::new();
    push_panel(panel, 0, &mut out);
    out
}

fn push_panel(panel: &Panel, depth: usize, out: &mut Vec<String>) {
    let pad = "  ".repeat(depth);
    if let Some(header) = &panel.header {
        out.push(format!("{pad}{}", header.fg(Color::Cyan)));
    }
    if let Some(hint) = &panel.usage_hint {
        out.push(format!("{pad}{}", hint.fg(Color::BrightBlack)));
    }
    if let Some(sig) = &panel.signature {
        let mut line = format!("{pad}{}", sig.command);
        for p in &sig.params {
            line.push(' ');
            if p.current {
                line.push_str(&format!("{}", format!("▸{}", p.label).fg(type_color(p.kind))));
            } else {
                line.push_str(&p.label);
            }
        }
        if sig.truncated {
            line.push_str(" …");
        }
        out.push(line);
    }
    if let Some(values) = &panel.values_header {
        out.push(format!("{pad}{values}"));
    }
    for c in &panel.candidates {
        let (typed, rest) = c.split();
        let marker = if c.selected { "Tab ▸" } else { "     " };
        let mut line = format!("{pad}{} {}{rest}", marker.fg(Color::Green), typed.fg(Color::Cyan));
        if let Some(detail) = &c.detail {
            line.push_str(&format!("  {}", detail.fg(Color::BrightBlack)));
        }
        out.push(line);
    }
    if let Some(message) = &panel.message {
        out.push(format!("{pad}{}", message.fg(Color::Yellow)));
    }
    if let Some(inner) = &panel.nested {
        push_panel(inner, depth + 1, out);
    }
}

// ── Summary line ────────────────────────────────────────────────────────

/// Print a coloured summary line showing error/warning counts.
pub(crate) fn print_summary(diagnostics: &[Diagnostic]) {
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let others = diagnostics.len() - errors;
    if errors + others == 0 {
        return;
    }
    let mut parts = Vec::new();
    if errors > 0 {
        let s = if errors == 1 { "" } else { "s" };
        parts.push(format!("{}", format!("{errors} error{s}").fg(Color::Red)));
    }
    if others > 0 {
        let s = if others == 1 { "" } else { "s" };
        parts.push(format!("{}", format!("{others} warning{s}").fg(Color::Yellow)));
    }
    eprintln!("{}", parts.join(", "));
}
