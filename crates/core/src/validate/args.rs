use crate::grammar::ast::{ArgValue, BoundArg};
use crate::grammar::lexer::Token;
use std::collections::BTreeMap;
use weather_query_dataset::{DateToken, is_iso_date};
use weather_query_diagnostics::{Diagnostic, codes};
use weather_query_tables::{CommandSpec, ParamSpec, ParamType};

macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

/// Where an argument sits, for diagnostic messages.
pub(crate) struct ArgSite<'a> {
    pub(crate) command: &'a CommandSpec,
    pub(crate) param: &'a ParamSpec,
    pub(crate) nested: bool,
}

impl ArgSite<'_> {
    fn query_word(&self) -> &'static str {
        if self.nested { "sub-query" } else { "query" }
    }

    fn fail(&self, id: &'static str, tok: &Token<'_>, expected: &str, message: String) -> Diagnostic {
        Diagnostic::error(id, message, Some(tok.span())).with_context(ctx!(
            "command" => self.command.name.as_str(),
            "param" => self.param.name.as_str(),
            "value" => tok.text,
            "expected" => expected,
            "nested" => self.nested.to_string(),
        ))
    }

    fn prefix(&self) -> String {
        format!(
            "Given argument, {} in {} {}",
            self.param.name,
            self.query_word(),
            self.command.name
        )
    }
}

/// Check one positional token against its parameter and bind it.
pub(crate) fn check_arg(
    site: &ArgSite<'_>,
    tok: &Token<'_>,
    dataset_len: usize,
) -> Result<BoundArg, Diagnostic> {
    let value = match site.param.kind {
        ParamType::Int | ParamType::Number => ArgValue::Number(check_number(site, tok)?),
        ParamType::Row => ArgValue::Row(unwrap_delimited(tok.text, '`').ok_or_else(|| {
            site.fail(
                codes::EXPECTED_ROW,
                tok,
                "row",
                format!(
                    "{} expected to be type row but received \"{}\".",
                    site.prefix(),
                    tok.text
                ),
            )
        })?),
        ParamType::String => ArgValue::Text(unwrap_delimited(tok.text, '"').ok_or_else(|| {
            site.fail(
                codes::EXPECTED_STRING,
                tok,
                "string",
                format!(
                    "{} expected to be type string but received \"{}\".",
                    site.prefix(),
                    tok.text
                ),
            )
        })?),
        ParamType::Date => ArgValue::Date(check_date(site, tok, dataset_len)?),
        ParamType::Enum => ArgValue::Enum(tok.text.to_string()),
        ParamType::SubQuery | ParamType::Unsupported => {
            tracing::error!(
                command = %site.command.name,
                param = %site.param.name,
                kind = %site.param.kind,
                "command table declares a parameter type that cannot be checked"
            );
            return Err(site.fail(
                codes::UNIMPLEMENTED_TYPE,
                tok,
                "implemented type",
                format!(
                    "Unexpected argument type, {} in {} {} type {} (with value {}) was not implemented.",
                    site.param.name,
                    site.query_word(),
                    site.command.name,
                    site.param.kind,
                    tok.text
                ),
            ));
        }
    };
    Ok(BoundArg {
        name: site.param.name.clone(),
        kind: site.param.kind,
        value,
        raw: tok.text.to_string(),
        span: tok.span(),
    })
}

/// Contents between matching delimiters, e.g. `` `row` `` → `row`.
fn unwrap_delimited(text: &str, delim: char) -> Option<String> {
    text.strip_prefix(delim)
        .and_then(|t| t.strip_suffix(delim))
        .map(str::to_string)
}

/// Parse a finite number.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn check_number(site: &ArgSite<'_>, tok: &Token<'_>) -> Result<f64, Diagnostic> {
    parse_number(tok.text).ok_or_else(|| {
        site.fail(
            codes::EXPECTED_NUMBER,
            tok,
            "number",
            format!(
                "{} expected to be type number but received \"{}\" (type NaN).",
                site.prefix(),
                tok.text
            ),
        )
    })
}

fn check_date(
    site: &ArgSite<'_>,
    tok: &Token<'_>,
    dataset_len: usize,
) -> Result<DateToken, Diagnostic> {
    let len = tok.text.chars().count();
    match len {
        1 | 2 => {
            let index: i64 = tok.text.parse().map_err(|_| {
                site.fail(
                    codes::EXPECTED_DATE_INDEX,
                    tok,
                    "date index",
                    format!(
                        "{} expected to be type date (as number) but received \"{}\" (type NaN).",
                        site.prefix(),
                        tok.text
                    ),
                )
            })?;
            let n = i64::try_from(dataset_len).unwrap_or(i64::MAX);
            if !(-n..n).contains(&index) {
                let bounds = if n == 0 {
                    "but the dataset is empty".to_string()
                } else {
                    format!("expected to be between {} and {}", -n, n - 1)
                };
                return Err(site.fail(
                    codes::DATE_INDEX_OUT_OF_RANGE,
                    tok,
                    "date index in range",
                    format!(
                        "{} has a date index that is out of range ({}) {}.",
                        site.prefix(),
                        tok.text,
                        bounds
                    ),
                ));
            }
            Ok(DateToken::Index(index))
        }
        10 if is_iso_date(tok.text) => Ok(DateToken::Iso(tok.text.to_string())),
        10 => Err(site.fail(
            codes::INVALID_DATE_FORMAT,
            tok,
            "YYYY-MM-DD",
            format!(
                "{} expected to be type date (as format YYYY-MM-DD) but received \"{}\".",
                site.prefix(),
                tok.text
            ),
        )),
        _ => Err(site.fail(
            codes::INVALID_DATE_FORMAT,
            tok,
            "date of length 1, 2 or 10",
            format!(
                "{} expected to be type date, but was not formatted correctly, \"{}\" expected to have a length of 1, 2, or 10, but received {}.",
                site.prefix(),
                tok.text,
                len
            ),
        )),
    }
}
