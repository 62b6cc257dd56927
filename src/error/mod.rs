//! Error types shared by every layer of the crate.

mod core;

pub use core::{Result, SeatingError};
