//! Collaborator seams of the executor.
//!
//! The executor talks to the dataset, the geocoder, the weather archive and
//! the presentation layer only through these traits. The CLI wires in the
//! real implementations; tests use in-memory fakes.

use super::{Bar, Grid};
use serde::{Deserialize, Serialize};
use weather_query_dataset::{Aggregate, Dataset, DatasetError, DateToken, Record};
use weather_query_diagnostics::Diagnostic;
use weather_query_tables::CommandTable;

/// Error type returned by the network collaborators.
pub type ServiceError = Box<dyn std::error::Error + Send + Sync>;

/// A point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

/// Read access to the local dataset.
pub trait DatasetStore {
    /// Queryable row names (everything but `date`), in file order.
    fn rows(&self) -> Vec<String>;

    /// Dates in order.
    fn dates(&self) -> &[String];

    /// Number of days.
    fn len(&self) -> usize {
        self.dates().len()
    }

    /// `true` when the dataset holds no days.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The ISO date a token refers to.
    fn resolve_date(&self, token: &DateToken) -> Result<String, DatasetError>;

    /// Reduce `row` over the inclusive range between two optional tokens.
    fn aggregate(
        &self,
        kind: Aggregate,
        row: &str,
        start: Option<&DateToken>,
        end: Option<&DateToken>,
    ) -> Result<f64, DatasetError>;

    /// Ordered `date → value` pairs over the inclusive range.
    fn histogram(
        &self,
        row: &str,
        start: Option<&DateToken>,
        end: Option<&DateToken>,
    ) -> Result<Vec<(String, f64)>, DatasetError>;

    /// Every day as a record.
    fn records(&self) -> Vec<Record>;

    /// Every column name, `date` first when present, in file order.
    fn column_names(&self) -> Vec<String>;
}

impl DatasetStore for Dataset {
    fn rows(&self) -> Vec<String> {
        Dataset::rows(self).map(str::to_string).collect()
    }

    fn dates(&self) -> &[String] {
        Dataset::dates(self)
    }

    fn resolve_date(&self, token: &DateToken) -> Result<String, DatasetError> {
        Dataset::resolve_date(self, token)
    }

    fn aggregate(
        &self,
        kind: Aggregate,
        row: &str,
        start: Option<&DateToken>,
        end: Option<&DateToken>,
    ) -> Result<f64, DatasetError> {
        Dataset::aggregate(self, kind, row, start, end)
    }

    fn histogram(
        &self,
        row: &str,
        start: Option<&DateToken>,
        end: Option<&DateToken>,
    ) -> Result<Vec<(String, f64)>, DatasetError> {
        Dataset::histogram(self, row, start, end)
    }

    fn records(&self) -> Vec<Record> {
        Dataset::records(self)
    }

    fn column_names(&self) -> Vec<String> {
        self.columns().iter().map(|c| c.name.clone()).collect()
    }
}

/// Forward geocoding of free-text addresses.
pub trait Geocoder {
    /// Coordinates of the best match for `address`.
    fn forward(&self, address: &str) -> Result<Coordinates, ServiceError>;
}

/// Historical weather at a location.
pub trait WeatherSource {
    /// Reduce the archived daily series of `row` between two ISO dates
    /// (inclusive) at `at`.
    fn fetch_aggregate(
        &self,
        at: Coordinates,
        kind: Aggregate,
        row: &str,
        start: &str,
        end: &str,
    ) -> Result<f64, ServiceError>;
}

/// Receives typed render commands from the executor.
pub trait Presenter {
    /// Echo of the submitted line.
    fn request_echo(&mut self, line: &str);
    /// A plain text result.
    fn generic_result(&mut self, text: &str);
    /// A grid of values.
    fn table(&mut self, grid: &Grid);
    /// A bar chart of `date → value`.
    fn histogram(&mut self, title: &str, y_label: &str, bars: &[Bar]);
    /// A weather code with its human label.
    fn weather_code(&mut self, code: i64, label: &str);
    /// A diagnostic.
    fn error(&mut self, diagnostic: &Diagnostic);
    /// Command documentation.
    fn help(&mut self, tables: &CommandTable);
    /// Prompt for a dataset upload.
    fn upload_widget(&mut self);
    /// Drop every rendered entry.
    fn clear(&mut self);
}
