//! Query validation: the gate in front of the executor.
//!
//! Validation is a full parse with the AST discarded, so the validator and
//! the executor can never disagree about what a line means.

pub(crate) mod args;

use crate::grammar::parser::parse_query;
use weather_query_diagnostics::Diagnostic;
use weather_query_tables::CommandTable;

/// What the validator needs to know about the world.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Grammar registry.
    pub tables: &'a CommandTable,
    /// Number of dates in the dataset; bounds relative date indices to `[-N, N)`.
    pub dataset_len: usize,
}

impl<'a> ValidationContext<'a> {
    /// Context over `tables` for a dataset of `dataset_len` dates.
    pub fn new(tables: &'a CommandTable, dataset_len: usize) -> Self {
        Self {
            tables,
            dataset_len,
        }
    }
}

/// Validate one query line.
///
/// Returns the first diagnostic found; validation never accumulates.
pub fn validate(
    line: &str,
    is_sub_query: bool,
    ctx: &ValidationContext<'_>,
) -> Result<(), Diagnostic> {
    parse_query(line, is_sub_query, ctx).map(|_| ())
}
