//! Flat-file weather dataset for the weather-query interpreter.
//!
//! The on-disk format holds one line per column:
//!
//! ```text
//! date: 2024-04-24 2024-04-25
//! temperature_max: 70 75
//! ```
//!
//! Values are kept as the strings read from the file and parsed as numbers
//! only when a query needs them.

mod aggregate;
mod date;

pub use aggregate::Aggregate;
pub use date::{DateToken, is_iso_date, relative_index};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the column holding the ISO dates.
pub const DATE_COLUMN: &str = "date";

/// Columns of the default (empty) dataset, in file order.
pub const DEFAULT_COLUMNS: [&str; 7] = [
    "date",
    "weather_code",
    "temperature_max",
    "temperature_min",
    "precipitation_sum",
    "wind_speed_max",
    "precipitation_probability_max",
];

/// One day of data, keyed by column name.
pub type Record = BTreeMap<String, String>;

/// Errors that can occur when loading, querying or editing a dataset.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DatasetError {
    /// Reading or writing the dataset file failed.
    #[error("failed to access dataset file {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Records JSON could not be decoded.
    #[error("invalid records JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A line has no `name:` prefix.
    #[error("line {line}: expected `name: values...`")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
    },

    /// The dataset has no `date` column.
    #[error("dataset has no `date` column")]
    MissingDateColumn,

    /// A column name appears twice.
    #[error("column `{0}` appears more than once")]
    DuplicateColumn(String),

    /// A column has a different number of values than the `date` column.
    #[error("column `{column}` has {found} values but there are {expected} dates")]
    RaggedColumn {
        /// Column name.
        column: String,
        /// Number of dates.
        expected: usize,
        /// Number of values in the column.
        found: usize,
    },

    /// A date value is not `YYYY-MM-DD`.
    #[error("`{0}` is not a YYYY-MM-DD date")]
    InvalidDate(String),

    /// An uploaded dataset holds no records.
    #[error("dataset has no records")]
    Empty,

    /// The requested row is not a column of the dataset.
    #[error("row `{0}` not found")]
    UnknownRow(String),

    /// An ISO date is not present in the dataset.
    #[error("date {0} not found in dataset")]
    DateNotFound(String),

    /// A day index is outside the dataset.
    #[error("date index {index} is out of range for {len} days")]
    DateIndexOutOfRange {
        /// The index given.
        index: i64,
        /// Number of days.
        len: usize,
    },

    /// The start date comes after the end date, or the dataset is empty.
    #[error("date range {start}..={end} selects no days")]
    EmptyRange {
        /// Start token as written.
        start: String,
        /// End token as written.
        end: String,
    },

    /// A value used in a computation is not a number.
    #[error("value `{value}` of `{row}` on {date} is not a number")]
    NotNumeric {
        /// Row name.
        row: String,
        /// Date of the value.
        date: String,
        /// The value as stored.
        value: String,
    },

    /// An edited record has no `date` field.
    #[error("record {0} has no `date` field")]
    MissingRecordDate(usize),
}

/// A named column of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name (`date`, `temperature_max`, ...).
    pub name: String,
    /// One value per day.
    pub values: Vec<String>,
}

/// Columnar weather dataset.
///
/// Invariant: there is a `date` column, every column has as many values as
/// there are dates, and every date is `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Default for Dataset {
    fn default() -> Self {
        Self::empty()
    }
}

impl Dataset {
    /// The default dataset: every standard column, no days.
    pub fn empty() -> Self {
        Self {
            columns: DEFAULT_COLUMNS
                .iter()
                .map(|name| Column {
                    name: (*name).to_string(),
                    values: Vec::new(),
                })
                .collect(),
        }
    }

    /// Build a dataset from columns, checking the invariants.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, DatasetError> {
        let ds = Self { columns };
        ds.check()?;
        Ok(ds)
    }

    /// Parse the flat-file format. Blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self, DatasetError> {
        let mut columns = Vec::new();
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (name, values) = line
                .split_once(':')
                .ok_or(DatasetError::MalformedLine { line: i + 1 })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(DatasetError::MalformedLine { line: i + 1 });
            }
            columns.push(Column {
                name: name.to_string(),
                values: values.split_whitespace().map(str::to_string).collect(),
            });
        }
        Self::from_columns(columns)
    }

    /// Parse an uploaded file. Like [`Dataset::parse`] but rejects a dataset
    /// with no records.
    pub fn parse_upload(text: &str) -> Result<Self, DatasetError> {
        let ds = Self::parse(text)?;
        if ds.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(ds)
    }

    /// Load from `path`. A missing file yields [`Dataset::empty`].
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::empty()),
            Err(source) => Err(DatasetError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Write the flat-file format to `path`.
    pub fn save(&self, path: &Path) -> Result<(), DatasetError> {
        std::fs::write(path, self.to_text()).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serialize to the flat-file format.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for col in &self.columns {
            out.push_str(&col.name);
            out.push(':');
            for v in &col.values {
                out.push(' ');
                out.push_str(v);
            }
            out.push('\n');
        }
        out
    }

    fn check(&self) -> Result<(), DatasetError> {
        let mut seen = std::collections::HashSet::new();
        for col in &self.columns {
            if !seen.insert(col.name.as_str()) {
                return Err(DatasetError::DuplicateColumn(col.name.clone()));
            }
        }
        let dates = self
            .column(DATE_COLUMN)
            .ok_or(DatasetError::MissingDateColumn)?;
        if let Some(bad) = dates.iter().find(|d| !is_iso_date(d)) {
            return Err(DatasetError::InvalidDate(bad.clone()));
        }
        for col in &self.columns {
            if col.values.len() != dates.len() {
                return Err(DatasetError::RaggedColumn {
                    column: col.name.clone(),
                    expected: dates.len(),
                    found: col.values.len(),
                });
            }
        }
        Ok(())
    }

    /// Number of days.
    pub fn len(&self) -> usize {
        self.dates().len()
    }

    /// `true` when there are no days.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All columns in file order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Queryable row names: every column but `date`, in file order.
    pub fn rows(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .map(|c| c.name.as_str())
            .filter(|n| *n != DATE_COLUMN)
    }

    /// Dates in file order.
    pub fn dates(&self) -> &[String] {
        self.column(DATE_COLUMN).unwrap_or_default()
    }

    /// Values of one column.
    pub fn column(&self, row: &str) -> Option<&[String]> {
        self.columns
            .iter()
            .find(|c| c.name == row)
            .map(|c| c.values.as_slice())
    }

    /// Position of a date token in the dataset.
    pub fn date_index(&self, token: &DateToken) -> Result<usize, DatasetError> {
        token.position(self.dates()).ok_or_else(|| match token {
            DateToken::Index(i) => DatasetError::DateIndexOutOfRange {
                index: *i,
                len: self.len(),
            },
            DateToken::Iso(d) => DatasetError::DateNotFound(d.clone()),
        })
    }

    /// The ISO date a token refers to. ISO tokens are returned as written,
    /// even when the dataset does not contain them.
    pub fn resolve_date(&self, token: &DateToken) -> Result<String, DatasetError> {
        match token {
            DateToken::Iso(d) => Ok(d.clone()),
            DateToken::Index(_) => Ok(self.dates()[self.date_index(token)?].clone()),
        }
    }

    /// Inclusive day range between two optional tokens, defaulting to the
    /// whole dataset.
    pub fn range(
        &self,
        start: Option<&DateToken>,
        end: Option<&DateToken>,
    ) -> Result<Range<usize>, DatasetError> {
        let from = start.map(|t| self.date_index(t)).transpose()?.unwrap_or(0);
        let to = match end {
            Some(t) => self.date_index(t)? + 1,
            None => self.len(),
        };
        if from >= to {
            return Err(DatasetError::EmptyRange {
                start: start.map_or_else(|| "first".to_string(), ToString::to_string),
                end: end.map_or_else(|| "last".to_string(), ToString::to_string),
            });
        }
        Ok(from..to)
    }

    fn numbers(&self, row: &str, days: Range<usize>) -> Result<Vec<f64>, DatasetError> {
        let values = self
            .column(row)
            .filter(|_| row != DATE_COLUMN)
            .ok_or_else(|| DatasetError::UnknownRow(row.to_string()))?;
        let dates = self.dates();
        days.map(|i| {
            values[i]
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| DatasetError::NotNumeric {
                    row: row.to_string(),
                    date: dates[i].clone(),
                    value: values[i].clone(),
                })
        })
        .collect()
    }

    /// Reduce `row` over the inclusive range `start..=end`.
    ///
    /// [`Aggregate::Value`] reads the single day at `start` (the first day
    /// when absent) and ignores `end`.
    pub fn aggregate(
        &self,
        kind: Aggregate,
        row: &str,
        start: Option<&DateToken>,
        end: Option<&DateToken>,
    ) -> Result<f64, DatasetError> {
        let days = match kind {
            Aggregate::Value => {
                let i = self.range(start, None)?.start;
                i..i + 1
            }
            _ => self.range(start, end)?,
        };
        let values = self.numbers(row, days)?;
        kind.apply(&values).ok_or(DatasetError::EmptyRange {
            start: String::new(),
            end: String::new(),
        })
    }

    /// Ordered `date → value` pairs of `row` over the inclusive range.
    pub fn histogram(
        &self,
        row: &str,
        start: Option<&DateToken>,
        end: Option<&DateToken>,
    ) -> Result<Vec<(String, f64)>, DatasetError> {
        let days = self.range(start, end)?;
        let dates = &self.dates()[days.clone()];
        let values = self.numbers(row, days)?;
        Ok(dates.iter().cloned().zip(values).collect())
    }

    /// Every day as a record.
    pub fn records(&self) -> Vec<Record> {
        (0..self.len())
            .map(|i| {
                self.columns
                    .iter()
                    .map(|c| (c.name.clone(), c.values[i].clone()))
                    .collect()
            })
            .collect()
    }

    /// Replace the whole dataset.
    pub fn replace_all(&mut self, other: Dataset) {
        *self = other;
    }

    /// Merge each record's fields into the day with the same date.
    ///
    /// All records are checked before anything changes. Returns the number
    /// of records applied.
    pub fn update_records(&mut self, records: &[Record]) -> Result<usize, DatasetError> {
        let mut edits = Vec::with_capacity(records.len());
        for (n, rec) in records.iter().enumerate() {
            let date = rec
                .get(DATE_COLUMN)
                .ok_or(DatasetError::MissingRecordDate(n))?;
            let day = self.date_index(&DateToken::Iso(date.clone()))?;
            for (field, value) in rec {
                if field == DATE_COLUMN {
                    continue;
                }
                let col = self
                    .columns
                    .iter()
                    .position(|c| &c.name == field)
                    .ok_or_else(|| DatasetError::UnknownRow(field.clone()))?;
                edits.push((col, day, value.clone()));
            }
        }
        for (col, day, value) in edits {
            self.columns[col].values[day] = value;
        }
        Ok(records.len())
    }

    /// Remove the days whose date is listed. Returns how many were removed.
    pub fn remove_dates(&mut self, dates: &[String]) -> usize {
        let keep: Vec<bool> = self
            .dates()
            .iter()
            .map(|d| !dates.contains(d))
            .collect();
        let removed = keep.iter().filter(|k| !**k).count();
        for col in &mut self.columns {
            let mut flags = keep.iter();
            col.values.retain(|_| flags.next().copied().unwrap_or(true));
        }
        removed
    }
}

/// Decode a JSON array of records (`[{"date": "...", "temperature_max": "70"}]`).
///
/// Numbers are accepted and stored in their JSON text form.
pub fn parse_records(json: &str) -> Result<Vec<Record>, DatasetError> {
    let raw: Vec<BTreeMap<String, serde_json::Value>> = serde_json::from_str(json)?;
    Ok(raw
        .into_iter()
        .map(|rec| {
            rec.into_iter()
                .map(|(k, v)| {
                    let v = match v {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (k, v)
                })
                .collect()
        })
        .collect())
}
