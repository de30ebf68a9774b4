use crate::grammar::ast::QueryNode;
use weather_query_dataset::{Aggregate, DateToken};
use weather_query_diagnostics::{Diagnostic, codes};

/// `min`/`max`/`avg`/`value` over a row.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateQuery {
    /// Reduction.
    pub kind: Aggregate,
    /// Row name without back-ticks.
    pub row: String,
    /// First day (`day` for `value`).
    pub start: Option<DateToken>,
    /// Last day, inclusive.
    pub end: Option<DateToken>,
}

/// Where `compare` fetches its archive data.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    /// Given directly.
    Coord {
        /// Latitude.
        latitude: f64,
        /// Longitude.
        longitude: f64,
    },
    /// Zip code, as typed.
    Zip(String),
    /// City name without quotes.
    City(String),
}

/// A query resolved to what the executor does with it.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Show documentation.
    Help,
    /// Prompt for a dataset upload.
    Input,
    /// Clear rendered history.
    Clear,
    /// Render the whole dataset.
    Table,
    /// Reduce a row.
    Aggregate(AggregateQuery),
    /// Chart a row.
    Histogram {
        /// Row name without back-ticks.
        row: String,
        /// First day.
        start: Option<DateToken>,
        /// Last day, inclusive.
        end: Option<DateToken>,
    },
    /// Compare a local aggregate with the archive at a location.
    Compare {
        /// Where to look.
        location: Location,
        /// The local aggregate.
        sub_query: AggregateQuery,
    },
    /// Compare two local aggregates.
    CompareDataset {
        /// Left-hand side.
        first: AggregateQuery,
        /// Right-hand side.
        second: AggregateQuery,
    },
}

impl Command {
    /// Resolve a parsed node.
    ///
    /// Fails only when the node does not have the shape its command table
    /// entry promises, which is an internal error.
    pub fn from_node(node: &QueryNode) -> Result<Self, Diagnostic> {
        let cmd = match (node.command.as_str(), node.variant.as_deref()) {
            ("help", _) => Command::Help,
            ("input", _) => Command::Input,
            ("clear", _) => Command::Clear,
            ("table", _) => Command::Table,
            ("histogram", _) => Command::Histogram {
                row: row(node)?,
                start: date(node, "start"),
                end: date(node, "end"),
            },
            ("compare", Some("dataset")) => match node.sub_queries.as_slice() {
                [first, second] => Command::CompareDataset {
                    first: aggregate(first)?,
                    second: aggregate(second)?,
                },
                _ => return Err(shape(node, "two sub-queries")),
            },
            ("compare", Some(variant)) => {
                let location = match variant {
                    "coord" => Location::Coord {
                        latitude: number(node, "latitude")?,
                        longitude: number(node, "longitude")?,
                    },
                    "zip" => Location::Zip(raw(node, "zip code")?),
                    "city" => Location::City(
                        node.arg("city name")
                            .and_then(|a| a.value.as_text())
                            .map(str::to_string)
                            .ok_or_else(|| shape(node, "city name"))?,
                    ),
                    _ => return Err(shape(node, "known location type")),
                };
                let sub_query = match node.sub_queries.as_slice() {
                    [sub] => aggregate(sub)?,
                    _ => return Err(shape(node, "one sub-query")),
                };
                Command::Compare {
                    location,
                    sub_query,
                }
            }
            (name, _) if Aggregate::from_command(name).is_some() => {
                Command::Aggregate(aggregate(node)?)
            }
            _ => return Err(shape(node, "known command")),
        };
        Ok(cmd)
    }
}

/// Resolve a node that must be an aggregate.
pub(crate) fn aggregate(node: &QueryNode) -> Result<AggregateQuery, Diagnostic> {
    let kind = Aggregate::from_command(&node.command).ok_or_else(|| shape(node, "aggregate"))?;
    let (start, end) = match kind {
        Aggregate::Value => (date(node, "day"), None),
        _ => (date(node, "start"), date(node, "end")),
    };
    Ok(AggregateQuery {
        kind,
        row: row(node)?,
        start,
        end,
    })
}

fn row(node: &QueryNode) -> Result<String, Diagnostic> {
    node.arg("row")
        .and_then(|a| a.value.as_row())
        .map(str::to_string)
        .ok_or_else(|| shape(node, "row"))
}

fn date(node: &QueryNode, name: &str) -> Option<DateToken> {
    node.arg(name).and_then(|a| a.value.as_date()).cloned()
}

fn number(node: &QueryNode, name: &str) -> Result<f64, Diagnostic> {
    node.arg(name)
        .and_then(|a| a.value.as_number())
        .ok_or_else(|| shape(node, name))
}

fn raw(node: &QueryNode, name: &str) -> Result<String, Diagnostic> {
    node.arg(name)
        .map(|a| a.raw.clone())
        .ok_or_else(|| shape(node, name))
}

fn shape(node: &QueryNode, expected: &str) -> Diagnostic {
    tracing::error!(
        command = %node.command,
        variant = ?node.variant,
        expected,
        "query passed validation but has an unexpected shape"
    );
    Diagnostic::error(
        codes::INTERNAL_ERROR,
        format!(
            "An unexpected error occurred as type checking passed, but query {} could not be resolved ({expected} missing).",
            node.command
        ),
        Some(node.span),
    )
}
