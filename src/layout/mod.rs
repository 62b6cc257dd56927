//! Screen layout: stacks the editor panels top to bottom and hands out the
//! terminal rows between them.

mod core;

pub use core::{Constraint, ScreenLayout};
