use serde::Serialize;
use weather_query_tables::{ParamSpec, ParamType};

/// Hint shown under the top-level panel header.
pub const USAGE_HINT: &str =
    "Start typing to reduce completions, use arrows to select, use tab or click to insert";

/// Shown when a candidate list comes out empty.
pub const NO_COMPLETIONS: &str = "No completions could be found";

/// One rendered suggestion panel.
///
/// Fields render top to bottom in declaration order; `nested` renders as an
/// indented panel for the sub-query being typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Panel {
    /// `Queries:` or `Query <name> documentation:`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    /// Static usage hint, top level only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_hint: Option<String>,
    /// Parameter signature of the resolved command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
    /// `Possible values for <param>:`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values_header: Option<String>,
    /// Completion candidates, in display order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<Candidate>,
    /// Format hint or "nothing found" line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Panel of the sub-query being typed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested: Option<Box<Panel>>,
}

impl Panel {
    /// The deepest nested panel (the one whose candidates are live).
    pub fn innermost(&self) -> &Panel {
        match &self.nested {
            Some(inner) => inner.innermost(),
            None => self,
        }
    }

    /// The candidate carrying the `Tab` marker, if any.
    pub fn selected(&self) -> Option<&Candidate> {
        self.innermost().candidates.iter().find(|c| c.selected)
    }

    pub(crate) fn mark_selected(&mut self, selected: usize) {
        if let Some(inner) = self.nested.as_deref_mut() {
            inner.mark_selected(selected);
            return;
        }
        for (i, c) in self.candidates.iter_mut().enumerate() {
            c.selected = i == selected;
        }
    }
}

/// A command's parameter list with the position being typed highlighted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signature {
    /// Command word as typed.
    pub command: String,
    /// Parameters in order.
    pub params: Vec<SignatureParam>,
    /// Only the leading parameter is shown; the rest depends on it.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

/// One parameter in a [`Signature`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignatureParam {
    /// `[name]` when required, `(name)` when optional.
    pub label: String,
    /// Declared type, used for colouring.
    pub kind: ParamType,
    /// Whether the parameter may be omitted.
    pub optional: bool,
    /// Highlighted as the position being typed.
    pub current: bool,
}

impl SignatureParam {
    pub(crate) fn from_spec(spec: &ParamSpec, current: bool) -> Self {
        Self {
            label: spec.bracketed(),
            kind: spec.kind,
            optional: spec.optional,
            current,
        }
    }
}

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// Display text, e.g. `` `temperature_max` `` or `compare (zip)`.
    pub text: String,
    /// Length of the already-typed prefix (rendered bold).
    pub typed_len: usize,
    /// Argument count and description, for command candidates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Carries the `Tab` marker.
    pub selected: bool,
}

impl Candidate {
    pub(crate) fn new(text: String, typed_len: usize) -> Self {
        Self {
            text,
            typed_len,
            detail: None,
            selected: false,
        }
    }

    /// Split `text` into the typed (bold) prefix and the completed rest.
    pub fn split(&self) -> (&str, &str) {
        let mut at = self.typed_len.min(self.text.len());
        while !self.text.is_char_boundary(at) {
            at -= 1;
        }
        self.text.split_at(at)
    }
}

/// Format hint for parameter types without enumerable values.
pub(crate) fn format_hint(kind: ParamType) -> String {
    match kind {
        ParamType::String => r#"string (formatted as "" or "my string")"#.to_string(),
        ParamType::Int => "number (formatted as 66213)".to_string(),
        ParamType::Number => "number (formatted as 13 or 23.1)".to_string(),
        other => format!("Type {other} doesn't have any autocompletable values"),
    }
}
