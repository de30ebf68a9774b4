//! Weather-query command tables.
//!
//! Defines the grammar registry of the query language: every command, its
//! parameters, whether it may appear as a sub-query, and the overloads that
//! share a name and are told apart by a leading enum parameter. The built-in
//! table is returned by [`CommandTable::builtin`]; alternative tables can be
//! loaded from JSON with [`CommandTable::from_json`].

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Current format version for the command table JSON schema.
pub const TABLE_FORMAT_VERSION: &str = "1.0.0";

/// Parameter type, deciding how an argument token is checked and completed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// Dataset column name wrapped in back-ticks.
    Row,
    /// Day index (`-1`, `3`) or ISO date (`2024-04-24`).
    Date,
    /// Fixed word selecting an overload.
    Enum,
    /// Double-quoted text, may contain spaces.
    String,
    /// Whole number.
    Int,
    /// Any finite number.
    Number,
    /// Nested query of a sub-queryable command.
    SubQuery,
    /// A type name the interpreter does not know.
    #[serde(other)]
    Unsupported,
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamType::Row => write!(f, "row"),
            ParamType::Date => write!(f, "date"),
            ParamType::Enum => write!(f, "enum"),
            ParamType::String => write!(f, "string"),
            ParamType::Int => write!(f, "int"),
            ParamType::Number => write!(f, "number"),
            ParamType::SubQuery => write!(f, "subquery"),
            ParamType::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// One declared parameter of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Display name (e.g. `"row"`, `"location type"`).
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub kind: ParamType,
    /// Optional parameters may be omitted from the end of a query.
    #[serde(default)]
    pub optional: bool,
    /// Fixed value of an enum parameter that selects an overload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ParamSpec {
    /// A required parameter.
    pub fn required(name: &str, kind: ParamType) -> Self {
        Self {
            name: name.to_string(),
            kind,
            optional: false,
            value: None,
        }
    }

    /// An optional parameter.
    pub fn optional(name: &str, kind: ParamType) -> Self {
        Self {
            optional: true,
            ..Self::required(name, kind)
        }
    }

    /// A required enum parameter with a fixed overload value.
    pub fn discriminant(name: &str, value: &str) -> Self {
        Self {
            value: Some(value.to_string()),
            ..Self::required(name, ParamType::Enum)
        }
    }

    /// `[name]` for required parameters, `(name)` for optional ones.
    pub fn bracketed(&self) -> String {
        if self.optional {
            format!("({})", self.name)
        } else {
            format!("[{}]", self.name)
        }
    }
}

/// One command (or one overload of a command).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandSpec {
    /// Command word, the first token of a query.
    pub name: String,
    /// One-line description shown by autocomplete and help.
    pub description: String,
    /// Whether the command may appear as a sub-query.
    #[serde(default)]
    pub can_sub_query: bool,
    /// Ordered parameters.
    #[serde(default)]
    pub params: Vec<ParamSpec>,
}

impl CommandSpec {
    /// Fixed value of the leading enum parameter, if this is an enum-led overload.
    pub fn discriminant(&self) -> Option<&str> {
        self.params
            .first()
            .filter(|p| p.kind == ParamType::Enum)
            .and_then(|p| p.value.as_deref())
    }

    /// Number of sub-query slots (0, 1 or 2).
    pub fn sub_query_slots(&self) -> usize {
        self.params
            .iter()
            .filter(|p| p.kind == ParamType::SubQuery)
            .count()
    }

    /// Whether the last parameter is a sub-query.
    pub fn has_sub_query_tail(&self) -> bool {
        self.params
            .last()
            .is_some_and(|p| p.kind == ParamType::SubQuery)
    }

    /// Index of the first sub-query parameter.
    pub fn first_sub_query_index(&self) -> Option<usize> {
        self.params
            .iter()
            .position(|p| p.kind == ParamType::SubQuery)
    }

    /// Parameters that take exactly one token (everything but sub-queries).
    pub fn positional(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params
            .iter()
            .filter(|p| p.kind != ParamType::SubQuery)
    }

    /// Required parameters counted by the arity floor.
    pub fn required(&self) -> impl Iterator<Item = &ParamSpec> {
        self.positional().filter(|p| !p.optional)
    }

    /// Name shown in candidate lists, e.g. `compare (zip)`.
    pub fn display_name(&self) -> String {
        match self.discriminant() {
            Some(d) => format!("{} ({d})", self.name),
            None => self.name.clone(),
        }
    }

    /// Text inserted when completing this command's name.
    pub fn insertion(&self) -> String {
        match self.discriminant() {
            Some(d) => format!("{} {d}", self.name),
            None => self.name.clone(),
        }
    }

    /// Argument count summary, e.g. `1-3 arguments` or `2 arguments + subquery`.
    pub fn arity_label(&self) -> String {
        let min = self.required().count();
        let max = self.positional().count();
        let count = if min == max {
            min.to_string()
        } else {
            format!("{min}-{max}")
        };
        let noun = if max == 1 { "argument" } else { "arguments" };
        match self.sub_query_slots() {
            0 => format!("{count} {noun}"),
            1 => format!("{count} {noun} + subquery"),
            n => format!("{count} {noun} + {n} subqueries"),
        }
    }

    /// Usage line, e.g. ``min [row] (start) (end)``.
    ///
    /// The enum discriminant of an overload is written as its literal value.
    pub fn usage(&self) -> String {
        let mut out = self.name.clone();
        for (i, p) in self.params.iter().enumerate() {
            out.push(' ');
            match (i, self.discriminant()) {
                (0, Some(d)) => out.push_str(d),
                _ => out.push_str(&p.bracketed()),
            }
        }
        out
    }
}

/// Errors raised while loading or checking a command table.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TablesError {
    /// The JSON could not be decoded.
    #[error("invalid command table JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The table was written for an incompatible format version.
    #[error("unsupported table format version {found} (expected {expected})")]
    FormatVersion {
        /// Version found in the file.
        found: String,
        /// Version this build understands.
        expected: &'static str,
    },

    /// Two overloads of the same command share a discriminant (or both lack one).
    #[error("command '{name}' has more than one overload for {discriminant}")]
    AmbiguousOverload {
        /// Command name.
        name: String,
        /// The shared discriminant, or `no discriminant`.
        discriminant: String,
    },

    /// An enum parameter has no fixed value.
    #[error("enum parameter '{param}' of '{command}' has no value")]
    MissingEnumValue {
        /// Command name.
        command: String,
        /// Parameter name.
        param: String,
    },

    /// A sub-query parameter is followed by a plain parameter.
    #[error("sub-query parameter '{param}' of '{command}' must be trailing")]
    MisplacedSubQuery {
        /// Command name.
        command: String,
        /// Parameter name.
        param: String,
    },

    /// More than two sub-query slots.
    #[error("command '{command}' declares {count} sub-query parameters (at most 2)")]
    TooManySubQueries {
        /// Command name.
        command: String,
        /// Declared slots.
        count: usize,
    },
}

type OverloadKey = (String, Option<String>);

/// The grammar registry: an ordered list of commands plus cached lookups.
///
/// Immutable after construction; indexes are built on first access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandTable {
    /// Table format version for compatibility checks.
    #[serde(default = "default_format_version")]
    pub format_version: String,
    /// All commands in registry order.
    pub commands: Vec<CommandSpec>,

    /// Cached name → indices of every overload (registry order).
    #[serde(skip)]
    by_name: OnceLock<HashMap<String, Vec<usize>>>,
    /// Cached (name, discriminant) → index of the first matching spec.
    #[serde(skip)]
    by_overload: OnceLock<HashMap<OverloadKey, usize>>,
}

fn default_format_version() -> String {
    TABLE_FORMAT_VERSION.to_string()
}

impl PartialEq for CommandTable {
    fn eq(&self, other: &Self) -> bool {
        self.format_version == other.format_version && self.commands == other.commands
    }
}

impl CommandTable {
    /// Create a table from commands in registry order.
    pub fn new(commands: Vec<CommandSpec>) -> Self {
        Self {
            format_version: default_format_version(),
            commands,
            by_name: OnceLock::new(),
            by_overload: OnceLock::new(),
        }
    }

    /// Load a table from JSON and check its structural invariants.
    pub fn from_json(json: &str) -> Result<Self, TablesError> {
        let table: CommandTable = serde_json::from_str(json)?;
        if table.format_version.split('.').next() != TABLE_FORMAT_VERSION.split('.').next() {
            return Err(TablesError::FormatVersion {
                found: table.format_version,
                expected: TABLE_FORMAT_VERSION,
            });
        }
        table.check()?;
        Ok(table)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, TablesError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the invariants the parser relies on.
    pub fn check(&self) -> Result<(), TablesError> {
        let mut seen: HashSet<OverloadKey> = HashSet::new();
        for cmd in &self.commands {
            for p in &cmd.params {
                if p.kind == ParamType::Enum && p.value.is_none() {
                    return Err(TablesError::MissingEnumValue {
                        command: cmd.name.clone(),
                        param: p.name.clone(),
                    });
                }
            }
            if let Some(first) = cmd.first_sub_query_index()
                && let Some(p) = cmd.params[first..]
                    .iter()
                    .find(|p| p.kind != ParamType::SubQuery)
            {
                return Err(TablesError::MisplacedSubQuery {
                    command: cmd.name.clone(),
                    param: p.name.clone(),
                });
            }
            let count = cmd.sub_query_slots();
            if count > 2 {
                return Err(TablesError::TooManySubQueries {
                    command: cmd.name.clone(),
                    count,
                });
            }
            let key = (cmd.name.clone(), cmd.discriminant().map(str::to_string));
            if !seen.insert(key) {
                return Err(TablesError::AmbiguousOverload {
                    name: cmd.name.clone(),
                    discriminant: cmd
                        .discriminant()
                        .map_or_else(|| "no discriminant".to_string(), |d| format!("'{d}'")),
                });
            }
        }
        Ok(())
    }

    fn by_name(&self) -> &HashMap<String, Vec<usize>> {
        self.by_name.get_or_init(|| {
            let mut m: HashMap<String, Vec<usize>> = HashMap::new();
            for (i, c) in self.commands.iter().enumerate() {
                m.entry(c.name.clone()).or_default().push(i);
            }
            m
        })
    }

    fn by_overload(&self) -> &HashMap<OverloadKey, usize> {
        self.by_overload.get_or_init(|| {
            let mut m = HashMap::new();
            for (i, c) in self.commands.iter().enumerate() {
                m.entry((c.name.clone(), c.discriminant().map(str::to_string)))
                    .or_insert(i);
            }
            m
        })
    }

    /// Whether `token` names any command.
    pub fn is_command_name(&self, token: &str) -> bool {
        self.by_name().contains_key(token)
    }

    /// Every overload named `name`, in registry order.
    pub fn overloads<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a CommandSpec> + 'a {
        self.by_name()
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|&i| &self.commands[i])
    }

    /// Overloads visible in the given nesting context.
    pub fn visible_overloads<'a>(
        &'a self,
        name: &str,
        sub_query: bool,
    ) -> impl Iterator<Item = &'a CommandSpec> + 'a {
        self.overloads(name)
            .filter(move |c| c.can_sub_query || !sub_query)
    }

    /// Commands visible in the given nesting context, in registry order.
    pub fn visible(&self, sub_query: bool) -> impl Iterator<Item = &CommandSpec> {
        self.commands
            .iter()
            .filter(move |c| c.can_sub_query || !sub_query)
    }

    /// Resolve the overload a query line selects.
    ///
    /// `next` is the token after the command name. An enum-led overload
    /// matches when its discriminant equals `next`; a spec without a
    /// discriminant matches regardless. Inside a sub-query only sub-queryable
    /// specs are eligible. Ties go to the earlier spec in registry order.
    pub fn resolve(&self, name: &str, next: Option<&str>, sub_query: bool) -> Option<&CommandSpec> {
        let index = self.by_overload();
        let keyed = next.and_then(|d| index.get(&(name.to_string(), Some(d.to_string()))));
        let plain = index.get(&(name.to_string(), None));
        [keyed, plain]
            .into_iter()
            .flatten()
            .copied()
            .filter(|&i| self.commands[i].can_sub_query || !sub_query)
            .min()
            .map(|i| &self.commands[i])
    }

    /// The built-in command surface.
    pub fn builtin() -> Self {
        use ParamType as T;

        let aggregate = |name: &str, description: &str| CommandSpec {
            name: name.to_string(),
            description: description.to_string(),
            can_sub_query: true,
            params: vec![
                ParamSpec::required("row", T::Row),
                ParamSpec::optional("start", T::Date),
                ParamSpec::optional("end", T::Date),
            ],
        };
        let plain = |name: &str, description: &str| CommandSpec {
            name: name.to_string(),
            description: description.to_string(),
            can_sub_query: false,
            params: Vec::new(),
        };
        let compare = |location: &str, via: &str, mut rest: Vec<ParamSpec>| {
            let mut params = vec![ParamSpec::discriminant("location type", location)];
            params.append(&mut rest);
            CommandSpec {
                name: "compare".to_string(),
                description: format!(
                    "Query the data and compare it with online data at location (using {via})"
                ),
                can_sub_query: false,
                params,
            }
        };

        Self::new(vec![
            plain(
                "help",
                "Explains how to use this application, and displays documentation for queries and their respective parameter types",
            ),
            plain("input", "Upload a file to run queries"),
            plain("clear", "Clears the chat history"),
            aggregate(
                "min",
                "Query the minimum value over the dataset between two dates",
            ),
            aggregate(
                "max",
                "Query the maximum value over the dataset between two dates",
            ),
            aggregate("avg", "Query the avg value over the dataset between two dates"),
            CommandSpec {
                name: "value".to_string(),
                description: "Query the value of a specific date".to_string(),
                can_sub_query: true,
                params: vec![
                    ParamSpec::required("row", T::Row),
                    ParamSpec::required("day", T::Date),
                ],
            },
            plain(
                "table",
                "Query the all values of the input and return in a table",
            ),
            compare(
                "coord",
                "latitude and longitude",
                vec![
                    ParamSpec::required("latitude", T::Number),
                    ParamSpec::required("longitude", T::Number),
                    ParamSpec::required("subquery", T::SubQuery),
                ],
            ),
            compare(
                "dataset",
                "latitude and longitude",
                vec![
                    ParamSpec::required("1st query", T::SubQuery),
                    ParamSpec::required("2nd query", T::SubQuery),
                ],
            ),
            compare(
                "zip",
                "zip code",
                vec![
                    ParamSpec::required("zip code", T::Int),
                    ParamSpec::required("subquery", T::SubQuery),
                ],
            ),
            compare(
                "city",
                "city name",
                vec![
                    ParamSpec::required("city name", T::String),
                    ParamSpec::required("subquery", T::SubQuery),
                ],
            ),
            CommandSpec {
                name: "histogram".to_string(),
                description: "Generate a histogram of a given data point between two points"
                    .to_string(),
                can_sub_query: false,
                params: vec![
                    ParamSpec::required("row", T::Row),
                    ParamSpec::optional("start", T::Date),
                    ParamSpec::optional("end", T::Date),
                ],
            },
        ])
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::builtin()
    }
}
