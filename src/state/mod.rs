//! Explicit state container for the editor.
//!
//! All mutation flows through [`reduce`]: counts, rows, and policy changes
//! regenerate the grid; swaps and drags edit it in place.

mod action;
mod core;
mod drag;

pub use action::{Action, Outcome, Transition};
pub use core::{SeatingState, reduce};
pub use drag::{DragAndDrop, DragSession};
