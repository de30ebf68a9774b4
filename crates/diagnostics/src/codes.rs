//! Diagnostic ID constants.
//!
//! Use these instead of string literals to get compile-time typo detection.
//! Every code listed here has an entry in [`CODES`], which backs
//! [`crate::explain`].

/// The command name is unknown, cannot be used as a sub-query, or no overload
/// matches the discriminant that follows it.
pub const UNKNOWN_COMMAND: &str = "WQ1001";

/// Fewer arguments than the command's required parameters.
pub const TOO_FEW_ARGUMENTS: &str = "WQ1002";

/// More arguments than the command declares.
pub const TOO_MANY_ARGUMENTS: &str = "WQ1003";

/// A number or int parameter received a value that is not a number.
pub const EXPECTED_NUMBER: &str = "WQ1101";

/// A row parameter is not wrapped in back-ticks.
pub const EXPECTED_ROW: &str = "WQ1102";

/// A string parameter is not wrapped in double quotes.
pub const EXPECTED_STRING: &str = "WQ1103";

/// A short date token is not an integer day index.
pub const EXPECTED_DATE_INDEX: &str = "WQ1104";

/// A date token has neither an index length nor the `YYYY-MM-DD` shape.
pub const INVALID_DATE_FORMAT: &str = "WQ1105";

/// A day index falls outside the dataset.
pub const DATE_INDEX_OUT_OF_RANGE: &str = "WQ1106";

/// The command table declares a parameter type the interpreter cannot check.
pub const UNIMPLEMENTED_TYPE: &str = "WQ1901";

/// Geocoding or the weather archive failed or returned nothing usable.
pub const EXTERNAL_SERVICE_FAILURE: &str = "WQ2001";

/// The dataset could not answer the query (missing row or date, empty range).
pub const DATASET_FAILURE: &str = "WQ2002";

/// A query that passed validation could not be resolved for execution.
pub const INTERNAL_ERROR: &str = "WQ2901";

/// Static metadata for a diagnostic code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeInfo {
    /// Diagnostic ID (e.g. `"WQ1001"`).
    pub id: &'static str,
    /// Constant name in this module.
    pub name: &'static str,
    /// Longer human-readable explanation.
    pub explanation: &'static str,
}

/// Every known diagnostic code, in ID order.
pub const CODES: &[CodeInfo] = &[
    CodeInfo {
        id: UNKNOWN_COMMAND,
        name: "UNKNOWN_COMMAND",
        explanation: "The first word of a query must name a command from `help`. Inside a \
                      sub-query only commands that can be sub-queried (min, max, avg, value) \
                      are allowed, and overloaded commands such as `compare` need a known \
                      location type (coord, zip, city, dataset) right after the name.",
    },
    CodeInfo {
        id: TOO_FEW_ARGUMENTS,
        name: "TOO_FEW_ARGUMENTS",
        explanation: "Required parameters are shown in square brackets. Every required \
                      parameter, including a trailing sub-query, must be supplied.",
    },
    CodeInfo {
        id: TOO_MANY_ARGUMENTS,
        name: "TOO_MANY_ARGUMENTS",
        explanation: "The query received more arguments than the command declares. Optional \
                      parameters are shown in parentheses and count towards the limit.",
    },
    CodeInfo {
        id: EXPECTED_NUMBER,
        name: "EXPECTED_NUMBER",
        explanation: "Number parameters accept plain numbers such as 66213, 12 or 10.912.",
    },
    CodeInfo {
        id: EXPECTED_ROW,
        name: "EXPECTED_ROW",
        explanation: "Row parameters name a dataset column wrapped in back-ticks, for \
                      example `temperature_max`.",
    },
    CodeInfo {
        id: EXPECTED_STRING,
        name: "EXPECTED_STRING",
        explanation: "String parameters are wrapped in double quotes and may contain spaces, \
                      for example \"Kansas City\".",
    },
    CodeInfo {
        id: EXPECTED_DATE_INDEX,
        name: "EXPECTED_DATE_INDEX",
        explanation: "Dates of one or two characters are day indexes into the dataset and \
                      must be integers; negative indexes count back from the last day.",
    },
    CodeInfo {
        id: INVALID_DATE_FORMAT,
        name: "INVALID_DATE_FORMAT",
        explanation: "Dates are either a day index of length 1 or 2 (e.g. 0, -1) or an ISO \
                      date of length 10 (YYYY-MM-DD).",
    },
    CodeInfo {
        id: DATE_INDEX_OUT_OF_RANGE,
        name: "DATE_INDEX_OUT_OF_RANGE",
        explanation: "A day index must satisfy -N <= index < N where N is the number of days \
                      in the dataset.",
    },
    CodeInfo {
        id: UNIMPLEMENTED_TYPE,
        name: "UNIMPLEMENTED_TYPE",
        explanation: "The command table declares a parameter type that the interpreter does \
                      not implement. This is a defect in the command table, not in the query.",
    },
    CodeInfo {
        id: EXTERNAL_SERVICE_FAILURE,
        name: "EXTERNAL_SERVICE_FAILURE",
        explanation: "A geocoding or weather archive request failed or returned no usable \
                      data. Check the connection, the API key, and that historical data exists \
                      for the requested dates.",
    },
    CodeInfo {
        id: DATASET_FAILURE,
        name: "DATASET_FAILURE",
        explanation: "The dataset could not answer the query: the row or date is not present, \
                      the date range is empty, or a value is not numeric.",
    },
    CodeInfo {
        id: INTERNAL_ERROR,
        name: "INTERNAL_ERROR",
        explanation: "A query passed validation but could not be resolved for execution. This \
                      indicates an inconsistency between the validator and the executor.",
    },
];
