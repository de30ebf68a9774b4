//! Autocomplete engine.
//!
//! [`suggest`] is a pure function of the visible state: the line, the input
//! event, the nesting flag and the caller-owned [`CursorState`]. It re-derives
//! the parser position from the raw text on every call and never keeps state
//! of its own, so calling it twice with the same inputs yields the same
//! [`Suggestions`].

mod engine;
pub mod panel;

pub use panel::{Candidate, NO_COMPLETIONS, Panel, Signature, SignatureParam, USAGE_HINT};

use engine::{Completion, complete};
use serde::{Deserialize, Serialize};
use weather_query_tables::CommandTable;

/// Keys the engine reacts to. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Key {
    /// Move the selection up, wrapping.
    ArrowUp,
    /// Move the selection down, wrapping.
    ArrowDown,
    /// Insert the selected candidate.
    Tab,
    /// Hide the panel.
    Escape,
    /// Any other keystroke; resets the selection.
    Other,
}

/// An input event that triggers a recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum InputEvent {
    /// Key pressed in the input.
    Key {
        /// Which key.
        key: Key,
    },
    /// Input gained focus.
    Focus,
    /// Input lost focus.
    Blur {
        /// Focus moved into the suggestion panel itself.
        into_panel: bool,
    },
    /// Pointer pressed on the input.
    PointerDown,
    /// Pointer released on the input.
    PointerUp,
    /// Pointer choice of the candidate at this index.
    Select {
        /// Candidate index in the live list.
        index: usize,
    },
}

impl InputEvent {
    /// Shorthand for [`InputEvent::Key`].
    pub fn key(key: Key) -> Self {
        InputEvent::Key { key }
    }
}

/// Selection cursor, owned by the caller's render loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorState {
    /// Zero-based index into the live candidate list.
    pub selected: usize,
}

/// What the engine completes against.
#[derive(Debug, Clone, Copy)]
pub struct CompletionContext<'a> {
    /// Grammar registry.
    pub tables: &'a CommandTable,
    /// Dataset row names (without back-ticks), in display order.
    pub rows: &'a [String],
    /// Dataset dates, in order.
    pub dates: &'a [String],
}

/// How the panel should change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", content = "panel", rename_all = "lowercase")]
pub enum PanelView {
    /// Hide the panel.
    Hidden,
    /// Keep whatever is shown.
    Unchanged,
    /// Show this panel.
    Visible(Panel),
}

/// Result of one [`suggest`] call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestions {
    /// Panel to render.
    pub view: PanelView,
    /// Cursor to pass into the next call.
    pub cursor: CursorState,
    /// New line content after a Tab or pointer insertion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,
}

impl Suggestions {
    /// The visible panel, if any.
    pub fn panel(&self) -> Option<&Panel> {
        match &self.view {
            PanelView::Visible(panel) => Some(panel),
            _ => None,
        }
    }
}

/// Compute suggestions for `line` after `event`.
pub fn suggest(
    line: &str,
    event: InputEvent,
    is_sub_query: bool,
    cursor: CursorState,
    ctx: &CompletionContext<'_>,
) -> Suggestions {
    let view_only = |view| Suggestions {
        view,
        cursor,
        completed: None,
    };
    match event {
        InputEvent::Key { key: Key::Escape } => return view_only(PanelView::Hidden),
        InputEvent::Blur { into_panel: true } => return view_only(PanelView::Unchanged),
        InputEvent::Blur { into_panel: false } => return view_only(PanelView::Hidden),
        _ => {}
    }

    let completion = complete(line, is_sub_query, ctx);
    let count = completion.inserts.len();
    let selected = match event {
        InputEvent::Key {
            key: Key::ArrowDown,
        } => {
            if cursor.selected + 1 >= count {
                0
            } else {
                cursor.selected + 1
            }
        }
        InputEvent::Key { key: Key::ArrowUp } => cursor
            .selected
            .checked_sub(1)
            .filter(|&s| s < count)
            .unwrap_or(count.saturating_sub(1)),
        InputEvent::Key { key: Key::Tab } => {
            return insert(line, completion, cursor.selected, is_sub_query, ctx);
        }
        InputEvent::Select { index } => {
            return insert(line, completion, index, is_sub_query, ctx);
        }
        _ => 0,
    };
    visible(completion, selected)
}

fn visible(mut completion: Completion, selected: usize) -> Suggestions {
    completion.panel.mark_selected(selected);
    Suggestions {
        view: PanelView::Visible(completion.panel),
        cursor: CursorState { selected },
        completed: None,
    }
}

/// Replace the partial token with the chosen candidate and re-render.
fn insert(
    line: &str,
    completion: Completion,
    index: usize,
    is_sub_query: bool,
    ctx: &CompletionContext<'_>,
) -> Suggestions {
    let Some(candidate) = completion.inserts.get(index) else {
        return visible(completion, index);
    };
    let prefix = line.get(..completion.replace_from).unwrap_or(line);
    let completed = format!("{prefix}{candidate} ");
    tracing::debug!(line, completed = %completed, "inserted completion");
    let mut next = visible(complete(&completed, is_sub_query, ctx), 0);
    next.completed = Some(completed);
    next
}
