use serde::{Deserialize, Serialize};
use weather_query_dataset::DateToken;
use weather_query_diagnostics::Span;
use weather_query_tables::ParamType;

/// A parsed query: one command with its bound arguments and nested queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryNode {
    /// Command word (e.g. `"compare"`).
    pub command: String,
    /// Overload discriminant, for enum-led commands (e.g. `"zip"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    /// Positional arguments in parameter order. Optional parameters that
    /// were not given are absent.
    pub args: Vec<BoundArg>,
    /// Nested queries bound to the sub-query parameters (0, 1 or 2).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_queries: Vec<QueryNode>,
    /// Source span of the whole query in the submitted line.
    pub span: Span,
}

impl QueryNode {
    /// The argument bound to parameter `name`.
    pub fn arg(&self, name: &str) -> Option<&BoundArg> {
        self.args.iter().find(|a| a.name == name)
    }
}

/// One argument bound to its parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundArg {
    /// Parameter name.
    pub name: String,
    /// Declared parameter type.
    pub kind: ParamType,
    /// Checked value.
    pub value: ArgValue,
    /// Token text as typed.
    pub raw: String,
    /// Source span of the token.
    pub span: Span,
}

/// A checked argument value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ArgValue {
    /// Row name without back-ticks.
    Row(String),
    /// Date index or ISO date.
    Date(DateToken),
    /// Int or number argument.
    Number(f64),
    /// String contents without the surrounding quotes.
    Text(String),
    /// Enum word.
    Enum(String),
}

impl ArgValue {
    /// Row name, if this is a row argument.
    pub fn as_row(&self) -> Option<&str> {
        match self {
            ArgValue::Row(r) => Some(r),
            _ => None,
        }
    }

    /// Date token, if this is a date argument.
    pub fn as_date(&self) -> Option<&DateToken> {
        match self {
            ArgValue::Date(d) => Some(d),
            _ => None,
        }
    }

    /// Number, if this is an int or number argument.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ArgValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text contents, if this is a string argument.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ArgValue::Text(t) => Some(t),
            _ => None,
        }
    }
}
