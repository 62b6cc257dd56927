use std::num::NonZeroUsize;

use serde_json::Value;

use crate::error::SeatingError;
use crate::logging::json_kv;
use crate::roster::Part;
use crate::seating::{Coord, LayoutPolicy};

use super::core::SeatingState;

/// Inputs accepted by [`reduce`](super::reduce).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Change one part's head count and regenerate.
    SetCount { part: Part, count: u32 },
    /// Change the number of rows and regenerate.
    SetRowCount(NonZeroUsize),
    /// Change the layout policy and regenerate.
    SetPolicy(LayoutPolicy),
    /// Regenerate with the current inputs.
    Regenerate,
    /// Exchange two seats directly.
    Swap { a: Coord, b: Coord },
    /// Pick up the seat at `coord`.
    BeginDrag(Coord),
    /// Drop the seat picked up at `source` onto `target`.
    CompleteDrag { source: Coord, target: Coord },
    /// Abandon the drag in progress.
    CancelDrag,
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::SetCount { .. } => "set_count",
            Action::SetRowCount(_) => "set_row_count",
            Action::SetPolicy(_) => "set_policy",
            Action::Regenerate => "regenerate",
            Action::Swap { .. } => "swap",
            Action::BeginDrag(_) => "begin_drag",
            Action::CompleteDrag { .. } => "complete_drag",
            Action::CancelDrag => "cancel_drag",
        }
    }

    /// Action parameters as structured log fields.
    pub fn fields(&self) -> Vec<(String, Value)> {
        let mut fields = vec![json_kv("action", self.kind())];
        match self {
            Action::SetCount { part, count } => {
                fields.push(json_kv("part", part.label()));
                fields.push(json_kv("count", *count));
            }
            Action::SetRowCount(rows) => fields.push(json_kv("rows", rows.get())),
            Action::SetPolicy(policy) => fields.push(json_kv("policy", policy.as_str())),
            Action::Swap { a, b } => {
                fields.push(json_kv("a", a.to_string()));
                fields.push(json_kv("b", b.to_string()));
            }
            Action::BeginDrag(coord) => fields.push(json_kv("at", coord.to_string())),
            Action::CompleteDrag { source, target } => {
                fields.push(json_kv("source", source.to_string()));
                fields.push(json_kv("target", target.to_string()));
            }
            Action::Regenerate | Action::CancelDrag => {}
        }
        fields
    }
}

/// What an action did to the state.
#[derive(Debug)]
pub enum Outcome {
    Regenerated { generation: u64, seated: usize },
    Swapped { a: Coord, b: Coord },
    DragStarted(Coord),
    DragCancelled,
    /// The action matched the current state; nothing changed.
    Unchanged,
    /// The action was refused; the state is exactly as before.
    Rejected(SeatingError),
}

impl Outcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Regenerated { .. } => "regenerated",
            Outcome::Swapped { .. } => "swapped",
            Outcome::DragStarted(_) => "drag_started",
            Outcome::DragCancelled => "drag_cancelled",
            Outcome::Unchanged => "unchanged",
            Outcome::Rejected(_) => "rejected",
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    /// Human readable one-liner for the status panel.
    pub fn describe(&self) -> String {
        match self {
            Outcome::Regenerated { generation, seated } => {
                format!("Seated {seated} members (layout #{generation})")
            }
            Outcome::Swapped { a, b } if a == b => "Dropped in place".to_string(),
            Outcome::Swapped { a, b } => format!("Swapped {a} and {b}"),
            Outcome::DragStarted(coord) => format!("Picked up {coord}"),
            Outcome::DragCancelled => "Drag cancelled".to_string(),
            Outcome::Unchanged => "No change".to_string(),
            Outcome::Rejected(err) => format!("Refused: {err}"),
        }
    }
}

/// New state plus what happened on the way there.
#[derive(Debug)]
pub struct Transition {
    pub state: SeatingState,
    pub outcome: Outcome,
}
