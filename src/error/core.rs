use thiserror::Error;

use crate::roster::Part;
use crate::seating::{Coord, LayoutPolicy};

/// Unified result type for the seating chart crate.
pub type Result<T> = std::result::Result<T, SeatingError>;

/// Errors surfaced by the seating core and the terminal front end.
#[derive(Debug, Error)]
pub enum SeatingError {
    #[error("cell {coord} is outside the {rows}x{width} grid")]
    OutOfBounds {
        coord: Coord,
        rows: usize,
        width: usize,
    },
    #[error("policy `{policy}` needs at least {required} rows, grid has {rows}")]
    PolicyUnavailable {
        policy: LayoutPolicy,
        rows: usize,
        required: usize,
    },
    #[error("{count} {part} members is above the limit of {max}")]
    TooManyMembers { part: Part, count: u32, max: u32 },
    #[error("{rows} rows is above the limit of {max}")]
    TooManyRows { rows: usize, max: usize },
    #[error("unknown layout policy `{0}`")]
    UnknownPolicy(String),
    #[error("drag no longer matches the current grid")]
    StaleDrag,
    #[error("no drag in progress")]
    NoDragInProgress,
    #[error("panel `{0}` not found")]
    PanelNotFound(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SeatingError {
    /// Short machine-friendly label used in structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OutOfBounds { .. } => "out_of_bounds",
            Self::PolicyUnavailable { .. } => "policy_unavailable",
            Self::TooManyMembers { .. } => "too_many_members",
            Self::TooManyRows { .. } => "too_many_rows",
            Self::UnknownPolicy(_) => "unknown_policy",
            Self::StaleDrag => "stale_drag",
            Self::NoDragInProgress => "no_drag",
            Self::PanelNotFound(_) => "panel_not_found",
            Self::Io(_) => "io",
        }
    }
}
