use super::{
    ast::QueryNode,
    lexer::{Token, tokenize},
};
use crate::validate::{
    ValidationContext,
    args::{ArgSite, check_arg},
};
use weather_query_diagnostics::{Diagnostic, Span, codes};
use weather_query_tables::{CommandSpec, CommandTable, ParamSpec, ParamType};

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

// ─── Public API ─────────────────────────────────────────────────────────────

/// Parse one query line into an AST.
///
/// Checks run in a fixed order and the first failure is returned: command
/// resolution, the arity floor, the sub-query tail (recursively) or the arity
/// ceiling, then per-argument types. Spans in the returned node and in
/// diagnostics are byte offsets into `line`, including for nested queries.
pub fn parse_query(
    line: &str,
    is_sub_query: bool,
    ctx: &ValidationContext<'_>,
) -> Result<QueryNode, Diagnostic> {
    let toks = tokenize(line);
    Parser {
        tables: ctx.tables,
        dataset_len: ctx.dataset_len,
        line_len: line.len(),
    }
    .query(&toks, is_sub_query)
}

/// Split the tokens after a two-slot command's own arguments.
///
/// The boundary is the last token naming any known command. Returns `None`
/// when no such token exists; `Some(0)` means the first run is empty.
pub(crate) fn split_sub_queries(tables: &CommandTable, rest: &[Token<'_>]) -> Option<usize> {
    rest.iter().rposition(|t| tables.is_command_name(t.text))
}

fn query_word(nested: bool) -> &'static str {
    if nested { "sub-query" } else { "query" }
}

fn tokens_span(toks: &[Token<'_>]) -> Option<Span> {
    let first = toks.first()?;
    let last = toks.last()?;
    Some(first.span().to(last.span()))
}

// ─── Parser Implementation ─────────────────────────────────────────────────

struct Parser<'t> {
    tables: &'t CommandTable,
    dataset_len: usize,
    line_len: usize,
}

impl Parser<'_> {
    fn query(&self, toks: &[Token<'_>], nested: bool) -> Result<QueryNode, Diagnostic> {
        let Some(head) = toks.first() else {
            return Err(Diagnostic::error(
                codes::UNKNOWN_COMMAND,
                format!("Given {} is empty.", query_word(nested)),
                Some(Span::empty(self.line_len)),
            ));
        };
        let next = toks.get(1).map(|t| t.text);
        let spec = self
            .tables
            .resolve(head.text, next, nested)
            .ok_or_else(|| self.unknown_command(toks, nested))?;
        let span = tokens_span(toks).unwrap_or_else(|| head.span());

        let received = toks.len() - 1;
        let required: Vec<&str> = spec.required().map(|p| p.name.as_str()).collect();
        if received < required.len() {
            return Err(too_few(spec, &required, received, span, nested));
        }

        // Tokens [1, own_end) bind to positional parameters.
        let own_end = (1 + spec.positional().count()).min(toks.len());
        let sub_queries = match spec.sub_query_slots() {
            0 => {
                if received > spec.params.len() {
                    return Err(too_many(spec, toks, nested));
                }
                Vec::new()
            }
            1 => {
                let param = sub_query_params(spec)[0];
                vec![self.sub_query(spec, param, &toks[own_end..], span.end, nested)?]
            }
            _ => self.two_sub_queries(spec, &toks[own_end..], span.end, nested)?,
        };

        let mut args = Vec::with_capacity(own_end.saturating_sub(1));
        for (param, tok) in spec.positional().zip(&toks[1..own_end]) {
            let site = ArgSite {
                command: spec,
                param,
                nested,
            };
            args.push(check_arg(&site, tok, self.dataset_len)?);
        }

        Ok(QueryNode {
            command: spec.name.clone(),
            variant: spec.discriminant().map(str::to_string),
            args,
            sub_queries,
            span,
        })
    }

    fn sub_query(
        &self,
        spec: &CommandSpec,
        param: &ParamSpec,
        run: &[Token<'_>],
        at: usize,
        nested: bool,
    ) -> Result<QueryNode, Diagnostic> {
        if run.is_empty() {
            return Err(missing_sub_query(spec, param, at, nested));
        }
        self.query(run, true)
    }

    fn two_sub_queries(
        &self,
        spec: &CommandSpec,
        rest: &[Token<'_>],
        at: usize,
        nested: bool,
    ) -> Result<Vec<QueryNode>, Diagnostic> {
        let params = sub_query_params(spec);
        let (first_param, second_param) = (params[0], params[params.len() - 1]);
        match split_sub_queries(self.tables, rest) {
            None if rest.is_empty() => Err(missing_sub_query(spec, first_param, at, nested)),
            None => {
                // The run does not start with a command, so this reports it.
                self.query(rest, true)?;
                Err(missing_sub_query(spec, second_param, at, nested))
            }
            Some(0) => Err(missing_sub_query(spec, second_param, at, nested)),
            Some(split) => {
                let (first, second) = rest.split_at(split);
                Ok(vec![self.query(first, true)?, self.query(second, true)?])
            }
        }
    }

    fn unknown_command(&self, toks: &[Token<'_>], nested: bool) -> Diagnostic {
        let head = &toks[0];
        let word = query_word(nested);
        let overloads: Vec<&CommandSpec> = self.tables.overloads(head.text).collect();
        let visible: Vec<&CommandSpec> = self.tables.visible_overloads(head.text, nested).collect();

        let (message, span) = if overloads.is_empty() {
            (
                format!("Given {word} {} doesn't exist.", head.text),
                head.span(),
            )
        } else if visible.is_empty() {
            (
                format!(
                    "Given {word} {} cannot be used as a sub-query.",
                    head.text
                ),
                head.span(),
            )
        } else {
            let expected = or_list(visible.iter().filter_map(|c| c.discriminant()));
            let enum_name = visible[0]
                .params
                .first()
                .filter(|p| p.kind == ParamType::Enum)
                .map_or("variant", |p| p.name.as_str());
            match toks.get(1) {
                Some(next) => (
                    format!(
                        "Given {word} {} has no {enum_name} {} (expected {expected}).",
                        head.text, next.text
                    ),
                    head.span().to(next.span()),
                ),
                None => (
                    format!(
                        "Given {word} {} is missing its {enum_name} (expected {expected}).",
                        head.text
                    ),
                    head.span(),
                ),
            }
        };
        Diagnostic::error(codes::UNKNOWN_COMMAND, message, Some(span)).with_context(ctx!(
            "command" => head.text,
            "nested" => nested.to_string(),
        ))
    }
}

// ─── Diagnostics ────────────────────────────────────────────────────────────

fn sub_query_params(spec: &CommandSpec) -> Vec<&ParamSpec> {
    spec.params
        .iter()
        .filter(|p| p.kind == ParamType::SubQuery)
        .collect()
}

/// `a, b or c`.
fn or_list<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let items: Vec<&str> = items.collect();
    match items.split_last() {
        None => String::new(),
        Some((last, [])) => (*last).to_string(),
        Some((last, init)) => format!("{} or {last}", init.join(", ")),
    }
}

fn too_few(
    spec: &CommandSpec,
    required: &[&str],
    received: usize,
    span: Span,
    nested: bool,
) -> Diagnostic {
    let listed = |names: &[&str]| {
        if names.is_empty() {
            String::new()
        } else {
            format!(" ({})", names.join(", "))
        }
    };
    let given = &required[..received.min(required.len())];
    Diagnostic::error(
        codes::TOO_FEW_ARGUMENTS,
        format!(
            "Given {} {}{} expected at least {} arguments, but only received {}{}.",
            query_word(nested),
            spec.name,
            listed(required),
            required.len(),
            received,
            listed(given)
        ),
        Some(span),
    )
    .with_context(ctx!(
        "command" => spec.name.as_str(),
        "expected" => required.len().to_string(),
        "received" => received.to_string(),
        "missing" => required[given.len()..].join(", "),
    ))
}

fn too_many(spec: &CommandSpec, toks: &[Token<'_>], nested: bool) -> Diagnostic {
    let names: Vec<&str> = spec.params.iter().map(|p| p.name.as_str()).collect();
    let received = toks.len() - 1;
    let extra = tokens_span(&toks[1 + spec.params.len()..]);
    let shown = if names.is_empty() {
        String::new()
    } else {
        format!(" ({})", names.join(", "))
    };
    Diagnostic::error(
        codes::TOO_MANY_ARGUMENTS,
        format!(
            "Given {} {} expected at most {}{} arguments, but received {}.",
            query_word(nested),
            spec.name,
            names.len(),
            shown,
            received
        ),
        extra,
    )
    .with_context(ctx!(
        "command" => spec.name.as_str(),
        "expected" => names.len().to_string(),
        "received" => received.to_string(),
    ))
}

fn missing_sub_query(spec: &CommandSpec, param: &ParamSpec, at: usize, nested: bool) -> Diagnostic {
    Diagnostic::error(
        codes::TOO_FEW_ARGUMENTS,
        format!(
            "Given {} {} expected a sub-query for {}, but received none.",
            query_word(nested),
            spec.name,
            param.name
        ),
        Some(Span::empty(at)),
    )
    .with_context(ctx!(
        "command" => spec.name.as_str(),
        "param" => param.name.as_str(),
        "expected" => "subquery",
    ))
}
