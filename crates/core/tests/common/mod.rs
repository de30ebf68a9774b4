//! Shared test helpers for `weather_query_core` integration tests.

#![allow(unreachable_pub, dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::LazyLock;
use weather_query_core::exec::{Bar, Coordinates, Geocoder, Grid, Presenter, ServiceError, WeatherSource};
use weather_query_core::{CommandTable, CompletionContext, ValidationContext};
use weather_query_dataset::{Aggregate, Dataset};
use weather_query_diagnostics::Diagnostic;

/// Built-in tables, constructed once per test binary.
pub static TABLES: LazyLock<CommandTable> = LazyLock::new(CommandTable::builtin);

/// Four days with weather codes and temperatures.
pub const WEEK: &str = "\
date: 2024-04-24 2024-04-25 2024-04-26 2024-04-27
weather_code: 3 61 0 95
temperature_max: 70 75 68.5 80
temperature_min: 50 55 49 60
precipitation_sum: 0 0.5 0 1.25
";

/// The two-day dataset used by the end-to-end examples.
pub const PAIR: &str = "\
date: 2024-04-24 2024-04-25
temperature_max: 70 75
";

pub static WEEK_DATASET: LazyLock<Dataset> =
    LazyLock::new(|| Dataset::parse(WEEK).expect("valid fixture"));

pub fn ctx(len: usize) -> ValidationContext<'static> {
    ValidationContext::new(&TABLES, len)
}

/// Validation context over [`WEEK`].
pub fn week_ctx() -> ValidationContext<'static> {
    ctx(WEEK_DATASET.len())
}

/// Row names and dates of [`WEEK`], for completion tests.
pub struct CompletionFixture {
    pub rows: Vec<String>,
    pub dates: Vec<String>,
}

impl CompletionFixture {
    pub fn week() -> Self {
        Self {
            rows: WEEK_DATASET.rows().map(str::to_string).collect(),
            dates: WEEK_DATASET.dates().to_vec(),
        }
    }

    pub fn ctx(&self) -> CompletionContext<'_> {
        CompletionContext {
            tables: &TABLES,
            rows: &self.rows,
            dates: &self.dates,
        }
    }
}

// ─── Fake collaborators ──────────────────────────────────────────────────────

/// Geocoder answering from a fixed map; unknown addresses fail.
#[derive(Default)]
pub struct FakeGeocoder {
    pub places: HashMap<String, Coordinates>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeGeocoder {
    pub fn with(address: &str, latitude: f64, longitude: f64) -> Self {
        let mut g = Self::default();
        g.places.insert(
            address.to_string(),
            Coordinates {
                latitude,
                longitude,
            },
        );
        g
    }
}

impl Geocoder for FakeGeocoder {
    fn forward(&self, address: &str) -> Result<Coordinates, ServiceError> {
        self.calls.borrow_mut().push(address.to_string());
        self.places
            .get(address)
            .copied()
            .ok_or_else(|| format!("no address found for {address}").into())
    }
}

/// One recorded archive request.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveCall {
    pub at: Coordinates,
    pub kind: Aggregate,
    pub row: String,
    pub start: String,
    pub end: String,
}

/// Weather source returning a fixed value, or failing when `value` is `None`.
#[derive(Default)]
pub struct FakeWeather {
    pub value: Option<f64>,
    pub calls: RefCell<Vec<ArchiveCall>>,
}

impl FakeWeather {
    pub fn returning(value: f64) -> Self {
        Self {
            value: Some(value),
            calls: RefCell::default(),
        }
    }
}

impl WeatherSource for FakeWeather {
    fn fetch_aggregate(
        &self,
        at: Coordinates,
        kind: Aggregate,
        row: &str,
        start: &str,
        end: &str,
    ) -> Result<f64, ServiceError> {
        self.calls.borrow_mut().push(ArchiveCall {
            at,
            kind,
            row: row.to_string(),
            start: start.to_string(),
            end: end.to_string(),
        });
        self.value.ok_or_else(|| "no historical data".into())
    }
}

/// Everything the executor rendered, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Echo(String),
    Generic(String),
    Table(Grid),
    Histogram {
        title: String,
        y_label: String,
        bars: Vec<Bar>,
    },
    WeatherCode(i64, String),
    Error(Diagnostic),
    Help,
    Upload,
    Clear,
}

#[derive(Default)]
pub struct RecordingPresenter {
    pub entries: Vec<Rendered>,
}

impl RecordingPresenter {
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                Rendered::Error(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    /// Entries other than the request echo.
    pub fn results(&self) -> Vec<&Rendered> {
        self.entries
            .iter()
            .filter(|e| !matches!(e, Rendered::Echo(_)))
            .collect()
    }
}

impl Presenter for RecordingPresenter {
    fn request_echo(&mut self, line: &str) {
        self.entries.push(Rendered::Echo(line.to_string()));
    }
    fn generic_result(&mut self, text: &str) {
        self.entries.push(Rendered::Generic(text.to_string()));
    }
    fn table(&mut self, grid: &Grid) {
        self.entries.push(Rendered::Table(grid.clone()));
    }
    fn histogram(&mut self, title: &str, y_label: &str, bars: &[Bar]) {
        self.entries.push(Rendered::Histogram {
            title: title.to_string(),
            y_label: y_label.to_string(),
            bars: bars.to_vec(),
        });
    }
    fn weather_code(&mut self, code: i64, label: &str) {
        self.entries
            .push(Rendered::WeatherCode(code, label.to_string()));
    }
    fn error(&mut self, diagnostic: &Diagnostic) {
        self.entries.push(Rendered::Error(diagnostic.clone()));
    }
    fn help(&mut self, _tables: &CommandTable) {
        self.entries.push(Rendered::Help);
    }
    fn upload_widget(&mut self) {
        self.entries.push(Rendered::Upload);
    }
    fn clear(&mut self) {
        self.entries.push(Rendered::Clear);
    }
}
