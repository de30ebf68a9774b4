//! Weather-query core library.
//!
//! Provides the tokenizer, parser/validator, autocomplete engine and
//! executor of the weather-query command language. The main entry points
//! are [`validate`] for checking a line, [`suggest`] for live completion,
//! and [`Executor`] for running a query against its collaborators.

#![warn(missing_docs)]

/// Autocomplete engine: pure `line × event × cursor → suggestions`.
pub mod complete;
/// Executor, collaborator traits and result formatting.
pub mod exec;
/// Query grammar: lexer, parser, AST, and related utilities.
pub mod grammar;
/// Validation entry point and argument checks.
pub mod validate;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Lexer
pub use grammar::lexer::{Token, tokenize};

// Parser and AST
pub use grammar::ast::{ArgValue, BoundArg, QueryNode};
pub use grammar::parser::parse_query;

// Validator
pub use validate::{ValidationContext, validate};

// Autocomplete
pub use complete::{
    CompletionContext, CursorState, InputEvent, Key, Panel, PanelView, Suggestions, suggest,
};

// Executor
pub use exec::{
    Bar, Command, Coordinates, DatasetStore, Executor, Geocoder, Grid, Presenter, QueryValue,
    ServiceError, WeatherSource,
};

// Diagnostics (re-exported from the diagnostics crate)
pub use weather_query_diagnostics::{Diagnostic, Severity, Span, codes};

// Tables
pub use weather_query_tables::{CommandSpec, CommandTable, ParamSpec, ParamType};

// Serialization helpers
pub use grammar::dump::to_pretty_json;
