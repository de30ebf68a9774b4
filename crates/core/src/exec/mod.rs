//! Query executor.
//!
//! [`Executor::evaluate`] is the single recursive evaluator over
//! [`QueryNode`]s. Sub-queries are evaluated with printing suppressed; only
//! the outermost call renders. Every failure becomes exactly one
//! [`Presenter::error`] call at the top; nothing escapes as a panic or an
//! error past [`Executor::submit`].

pub mod command;
pub mod compare;
pub mod store;
pub mod units;

pub use command::{AggregateQuery, Command, Location};
pub use store::{Coordinates, DatasetStore, Geocoder, Presenter, ServiceError, WeatherSource};

use crate::grammar::{ast::QueryNode, parser::parse_query};
use crate::validate::{ValidationContext, validate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use weather_query_dataset::{Aggregate, DateToken};
use weather_query_diagnostics::{Diagnostic, Span, codes};
use weather_query_tables::CommandTable;

/// A rectangular grid of rendered cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// Column names.
    pub headers: Vec<String>,
    /// Rows of cells, one per day.
    pub rows: Vec<Vec<String>>,
}

/// One histogram bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// ISO date.
    pub date: String,
    /// Value on that date.
    pub value: f64,
}

/// What a query evaluated to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum QueryValue {
    /// Side effect only (`help`, `input`, `clear`).
    None,
    /// A single number.
    Scalar(f64),
    /// The dataset as a grid.
    Table(Grid),
    /// `date → value` bars.
    Histogram(Vec<Bar>),
    /// A sentence.
    Text(String),
}

/// Evaluates queries against the collaborators.
#[derive(Clone, Copy)]
pub struct Executor<'a> {
    /// Grammar registry.
    pub tables: &'a CommandTable,
    /// Local dataset.
    pub dataset: &'a dyn DatasetStore,
    /// Address → coordinates.
    pub geocoder: &'a dyn Geocoder,
    /// Historical weather archive.
    pub weather: &'a dyn WeatherSource,
}

impl<'a> Executor<'a> {
    /// Executor over the given collaborators.
    pub fn new(
        tables: &'a CommandTable,
        dataset: &'a dyn DatasetStore,
        geocoder: &'a dyn Geocoder,
        weather: &'a dyn WeatherSource,
    ) -> Self {
        Self {
            tables,
            dataset,
            geocoder,
            weather,
        }
    }

    /// Validation context matching this executor's dataset.
    pub fn validation_context(&self) -> ValidationContext<'a> {
        ValidationContext::new(self.tables, self.dataset.len())
    }

    /// Echo, validate and execute a submitted line.
    ///
    /// Returns `None` when validation or execution failed; the diagnostic
    /// has already been rendered.
    pub fn submit(&self, line: &str, presenter: &mut dyn Presenter) -> Option<QueryValue> {
        presenter.request_echo(line);
        if let Err(diagnostic) = validate(line, false, &self.validation_context()) {
            tracing::debug!(id = %diagnostic.id, "query rejected by validation");
            presenter.error(&diagnostic);
            return None;
        }
        self.execute(line, presenter)
    }

    /// Execute a line that is expected to be valid.
    pub fn execute(&self, line: &str, presenter: &mut dyn Presenter) -> Option<QueryValue> {
        let node = match parse_query(line, false, &self.validation_context()) {
            Ok(node) => node,
            Err(diagnostic) => {
                tracing::error!(
                    line,
                    id = %diagnostic.id,
                    message = %diagnostic.message,
                    "query failed to parse at execution"
                );
                presenter.error(&diagnostic);
                return None;
            }
        };
        match self.evaluate(&node, true, presenter) {
            Ok(value) => Some(value),
            Err(diagnostic) => {
                presenter.error(&diagnostic);
                None
            }
        }
    }

    /// Evaluate a parsed query. Renders the result only when `print` is set.
    pub fn evaluate(
        &self,
        node: &QueryNode,
        print: bool,
        presenter: &mut dyn Presenter,
    ) -> Result<QueryValue, Diagnostic> {
        let command = Command::from_node(node)?;
        tracing::debug!(command = %node.command, variant = ?node.variant, print, "evaluating query");
        match command {
            Command::Help => {
                presenter.help(self.tables);
                Ok(QueryValue::None)
            }
            Command::Input => {
                presenter.upload_widget();
                Ok(QueryValue::None)
            }
            Command::Clear => {
                presenter.clear();
                Ok(QueryValue::None)
            }
            Command::Table => {
                let grid = self.grid();
                if print {
                    presenter.table(&grid);
                }
                Ok(QueryValue::Table(grid))
            }
            Command::Aggregate(query) => {
                let value = self.local(&query, node.span)?;
                if print {
                    render_scalar(&query.row, value, presenter);
                }
                Ok(QueryValue::Scalar(value))
            }
            Command::Histogram { row, start, end } => {
                let bars: Vec<Bar> = self
                    .dataset
                    .histogram(&row, start.as_ref(), end.as_ref())
                    .map_err(|e| failure(codes::DATASET_FAILURE, node.span, &e))?
                    .into_iter()
                    .map(|(date, value)| Bar { date, value })
                    .collect();
                if print {
                    presenter.histogram(&format!("Histogram of `{row}`"), &row, &bars);
                }
                Ok(QueryValue::Histogram(bars))
            }
            Command::Compare {
                location,
                sub_query,
            } => {
                let local = self.scalar(&node.sub_queries[0], presenter)?;
                let at = self.locate(&location, node.span)?;
                let (start, end) = self.archive_range(&sub_query, node.span)?;
                let external = self
                    .weather
                    .fetch_aggregate(at, sub_query.kind, &sub_query.row, &start, &end)
                    .map_err(|e| {
                        tracing::warn!(row = %sub_query.row, %start, %end, error = %e, "archive lookup failed");
                        failure(
                            codes::EXTERNAL_SERVICE_FAILURE,
                            node.span,
                            &format!("Could not fetch historical weather data: {e}"),
                        )
                    })?;
                let text = compare::external_sentence(&sub_query, local, at, external);
                if print {
                    presenter.generic_result(&text);
                }
                Ok(QueryValue::Text(text))
            }
            Command::CompareDataset { first, second } => {
                let first_value = self.scalar(&node.sub_queries[0], presenter)?;
                let second_value = self.scalar(&node.sub_queries[1], presenter)?;
                let text = compare::dataset_sentence(&first, first_value, &second, second_value);
                if print {
                    presenter.generic_result(&text);
                }
                Ok(QueryValue::Text(text))
            }
        }
    }

    fn scalar(&self, node: &QueryNode, presenter: &mut dyn Presenter) -> Result<f64, Diagnostic> {
        match self.evaluate(node, false, presenter)? {
            QueryValue::Scalar(value) => Ok(value),
            other => {
                tracing::error!(command = %node.command, value = ?other, "sub-query did not yield a number");
                Err(failure(
                    codes::INTERNAL_ERROR,
                    node.span,
                    &format!("Sub-query {} did not produce a number.", node.command),
                ))
            }
        }
    }

    fn local(&self, query: &AggregateQuery, span: Span) -> Result<f64, Diagnostic> {
        self.dataset
            .aggregate(query.kind, &query.row, query.start.as_ref(), query.end.as_ref())
            .map_err(|e| failure(codes::DATASET_FAILURE, span, &e))
    }

    fn locate(&self, location: &Location, span: Span) -> Result<Coordinates, Diagnostic> {
        let address = match location {
            Location::Coord {
                latitude,
                longitude,
            } => {
                return Ok(Coordinates {
                    latitude: *latitude,
                    longitude: *longitude,
                });
            }
            Location::Zip(zip) => zip,
            Location::City(city) => city,
        };
        self.geocoder.forward(address).map_err(|e| {
            tracing::warn!(%address, error = %e, "geocoding failed");
            failure(
                codes::EXTERNAL_SERVICE_FAILURE,
                span,
                &format!("Could not find a location for {address}: {e}"),
            )
        })
    }

    /// ISO start and end dates for the archive request.
    ///
    /// A missing start is the first day; a missing end is the start for
    /// `value` and the last day otherwise.
    fn archive_range(
        &self,
        query: &AggregateQuery,
        span: Span,
    ) -> Result<(String, String), Diagnostic> {
        let start = query.start.clone().unwrap_or(DateToken::Index(0));
        let end = match (&query.end, query.kind) {
            (_, Aggregate::Value) => start.clone(),
            (Some(end), _) => end.clone(),
            (None, _) => DateToken::Index(-1),
        };
        let resolve = |token: &DateToken| {
            self.dataset
                .resolve_date(token)
                .map_err(|e| failure(codes::DATASET_FAILURE, span, &e))
        };
        Ok((resolve(&start)?, resolve(&end)?))
    }

    fn grid(&self) -> Grid {
        let headers = self.dataset.column_names();
        let rows = self
            .dataset
            .records()
            .iter()
            .map(|record| {
                headers
                    .iter()
                    .map(|h| record.get(h).map_or_else(String::new, |raw| units::cell(h, raw)))
                    .collect()
            })
            .collect();
        Grid { headers, rows }
    }
}

fn render_scalar(row: &str, value: f64, presenter: &mut dyn Presenter) {
    if row == "weather_code" {
        let code = units::weather_code_of(value);
        presenter.weather_code(code, &units::weather_code_label(code));
    } else {
        presenter.generic_result(&format!("{}{}", units::number(value), units::unit(row)));
    }
}

fn failure(id: &'static str, span: Span, err: &dyn Display) -> Diagnostic {
    Diagnostic::error(id, err.to_string(), Some(span))
}
