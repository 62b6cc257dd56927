//! Grid assignment: deals a roster into rows under a layout policy, and the
//! swap model drag-and-drop mutates afterwards.

mod assign;
mod grid;
mod policy;

pub use assign::assign;
pub use grid::{Cell, Coord, Grid};
pub use policy::{LayoutPolicy, MAX_ROWS, Placement, policy_options};
