//! Roster generation: per-part head counts in, named members out.
//!
//! The seating layer consumes the roster; nothing else creates members.

mod core;

pub use core::{IdAllocator, MAX_PER_PART, Member, MemberId, Part, PartCounts, Roster};
