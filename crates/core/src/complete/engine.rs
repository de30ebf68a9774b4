use super::CompletionContext;
use super::panel::{Candidate, NO_COMPLETIONS, Panel, Signature, SignatureParam, USAGE_HINT, format_hint};
use crate::grammar::lexer::{Token, ends_with_separator, has_open_quote, tokenize};
use weather_query_tables::{CommandSpec, ParamType};

/// A panel plus what Tab would insert for each of its live candidates.
#[derive(Debug, Clone, Default)]
pub(crate) struct Completion {
    pub(crate) panel: Panel,
    /// Insertion text per candidate, parallel to the innermost candidate list.
    pub(crate) inserts: Vec<String>,
    /// Byte offset in the line where the insertion replaces the tail.
    pub(crate) replace_from: usize,
}

/// Re-derive parser state from `line` and build the suggestion panel.
pub(crate) fn complete(line: &str, nested: bool, ctx: &CompletionContext<'_>) -> Completion {
    let toks = tokenize(line);
    let ends_space = ends_with_separator(line);
    let usage_hint = (!nested).then(|| USAGE_HINT.to_string());

    if toks.is_empty() || (toks.len() == 1 && !ends_space) {
        return command_slot(line, toks.first(), nested, usage_hint, ctx);
    }

    let head = toks[0];
    let overloads: Vec<&CommandSpec> = ctx.tables.visible_overloads(head.text, nested).collect();
    let Some(&first) = overloads.first() else {
        return Completion {
            panel: Panel {
                message: Some(NO_COMPLETIONS.to_string()),
                ..Panel::default()
            },
            replace_from: line.len(),
            ..Completion::default()
        };
    };

    let mut panel = Panel {
        header: Some(format!("Query {} documentation:", first.name)),
        usage_hint,
        ..Panel::default()
    };

    let spec = if overloads.len() > 1 {
        let typing_enum =
            (toks.len() == 1 && ends_space) || (toks.len() == 2 && !ends_space);
        if typing_enum {
            return enum_slot(line, &toks, &overloads, panel);
        }
        let chosen = toks.get(1).map(|t| t.text);
        match overloads.iter().find(|c| c.discriminant() == chosen) {
            Some(spec) => *spec,
            None => {
                let enum_name = first.params.first().map_or("", |p| p.name.as_str());
                panel.signature = Some(Signature {
                    command: head.text.to_string(),
                    params: Vec::new(),
                    truncated: false,
                });
                panel.message = Some(format!(
                    "Type {enum_name} doesn't have an enum for {}",
                    chosen.unwrap_or_default()
                ));
                return Completion {
                    panel,
                    replace_from: line.len(),
                    ..Completion::default()
                };
            }
        }
    } else {
        first
    };

    positional(line, &toks, ends_space, spec, panel, ctx)
}

// ─── Command and overload slots ─────────────────────────────────────────────

fn command_slot(
    line: &str,
    partial: Option<&Token<'_>>,
    nested: bool,
    usage_hint: Option<String>,
    ctx: &CompletionContext<'_>,
) -> Completion {
    let typed = partial.map_or("", |t| t.text);
    let mut candidates = Vec::new();
    let mut inserts = Vec::new();
    for spec in ctx
        .tables
        .visible(nested)
        .filter(|c| c.name.starts_with(typed))
    {
        let mut cand = Candidate::new(spec.display_name(), typed.len());
        cand.detail = Some(format!("{} — {}", spec.arity_label(), spec.description));
        candidates.push(cand);
        inserts.push(spec.insertion());
    }
    let message = candidates.is_empty().then(|| NO_COMPLETIONS.to_string());
    Completion {
        panel: Panel {
            header: Some("Queries:".to_string()),
            usage_hint,
            candidates,
            message,
            ..Panel::default()
        },
        inserts,
        replace_from: partial.map_or(line.len(), |t| t.start),
    }
}

fn enum_slot(
    line: &str,
    toks: &[Token<'_>],
    overloads: &[&CommandSpec],
    mut panel: Panel,
) -> Completion {
    let typing = toks.get(1);
    let typed = typing.map_or("", |t| t.text);
    let Some(enum_param) = overloads[0].params.first() else {
        return Completion {
            panel,
            replace_from: line.len(),
            ..Completion::default()
        };
    };
    panel.signature = Some(Signature {
        command: toks[0].text.to_string(),
        params: vec![SignatureParam::from_spec(enum_param, true)],
        truncated: true,
    });
    panel.values_header = Some(format!("Possible values for {}:", enum_param.name));

    let mut inserts = Vec::new();
    for value in overloads
        .iter()
        .filter_map(|c| c.discriminant())
        .filter(|d| d.starts_with(typed))
    {
        panel
            .candidates
            .push(Candidate::new(value.to_string(), typed.len()));
        inserts.push(value.to_string());
    }
    if inserts.is_empty() {
        panel.message = Some(NO_COMPLETIONS.to_string());
    }
    Completion {
        panel,
        inserts,
        replace_from: typing.map_or(line.len(), |t| t.start),
    }
}

// ─── Positional arguments ───────────────────────────────────────────────────

/// Index of the parameter being typed.
///
/// The token count minus one when the line ends in a separator (outside an
/// open quote), minus two otherwise. For two-slot commands, any position at
/// or past the first sub-query slot moves to the slot whose command name has
/// appeared: the second once three command names are present.
pub(crate) fn current_param(
    line: &str,
    toks: &[Token<'_>],
    spec: &CommandSpec,
    command_names: usize,
) -> usize {
    let complete_last = ends_with_separator(line) && !has_open_quote(line);
    let mut current = toks.len().saturating_sub(if complete_last { 1 } else { 2 });
    if spec.sub_query_slots() == 2
        && let Some(first_sub) = spec.first_sub_query_index()
        && current >= first_sub
    {
        let second = command_names >= 3;
        current = spec.params.len().saturating_sub(if second { 1 } else { 2 });
    }
    current
}

fn positional(
    line: &str,
    toks: &[Token<'_>],
    ends_space: bool,
    spec: &CommandSpec,
    mut panel: Panel,
    ctx: &CompletionContext<'_>,
) -> Completion {
    let command_names = toks
        .iter()
        .filter(|t| ctx.tables.is_command_name(t.text))
        .count();
    let two = spec.sub_query_slots() == 2;
    let second = command_names >= 3;
    let current = current_param(line, toks, spec, command_names);

    panel.signature = Some(Signature {
        command: toks[0].text.to_string(),
        params: spec
            .params
            .iter()
            .enumerate()
            .map(|(idx, p)| {
                let bold = (idx <= current && p.kind == ParamType::SubQuery && !second)
                    || idx == current;
                SignatureParam::from_spec(p, bold)
            })
            .collect(),
        truncated: false,
    });

    let param = spec.params.get(current);
    if let Some(p) = param
        && p.kind != ParamType::SubQuery
    {
        panel.values_header = Some(format!(
            "Possible values for {}{}:",
            p.name,
            if p.optional { " (optional)" } else { "" }
        ));
    }

    let last = toks[toks.len() - 1];
    let typed_len = if ends_space { 0 } else { last.text.len() };
    let replace_from = if ends_space { line.len() } else { last.start };
    let filter = toks.get(current + 1).map_or("", |t| t.text);

    let values: Vec<String> = match param.map(|p| p.kind) {
        Some(ParamType::Row) => ctx
            .rows
            .iter()
            .filter(|row| format!("`{row}").starts_with(filter))
            .map(|row| format!("`{row}`"))
            .collect(),
        Some(ParamType::Date) => ctx
            .dates
            .iter()
            .filter(|date| date.starts_with(filter))
            .cloned()
            .collect(),
        Some(ParamType::SubQuery) => {
            return sub_query_panel(line, toks, spec, two && second, panel, ctx);
        }
        None if spec.has_sub_query_tail() => {
            return sub_query_panel(line, toks, spec, two && second, panel, ctx);
        }
        None => {
            panel.message = Some(format!("Query {} takes no more arguments", spec.name));
            return Completion {
                panel,
                replace_from,
                ..Completion::default()
            };
        }
        Some(kind) => {
            panel.message = Some(format_hint(kind));
            return Completion {
                panel,
                replace_from,
                ..Completion::default()
            };
        }
    };

    panel.candidates = values
        .iter()
        .map(|v| Candidate::new(v.clone(), typed_len))
        .collect();
    Completion {
        panel,
        inserts: values,
        replace_from,
    }
}

/// Recurse into the sub-query run the cursor is in.
fn sub_query_panel(
    line: &str,
    toks: &[Token<'_>],
    spec: &CommandSpec,
    in_second: bool,
    mut panel: Panel,
    ctx: &CompletionContext<'_>,
) -> Completion {
    let mut start = if spec.sub_query_slots() == 2 {
        spec.params.len() - 1
    } else {
        spec.params.len()
    };
    if in_second
        && let Some(last_command) = toks
            .iter()
            .rposition(|t| ctx.tables.is_command_name(t.text))
    {
        start = last_command;
    }
    let offset = toks.get(start).map_or(line.len(), |t| t.start);
    let inner = complete(&line[offset..], true, ctx);
    panel.nested = Some(Box::new(inner.panel));
    Completion {
        panel,
        inserts: inner.inserts,
        replace_from: offset + inner.replace_from,
    }
}
