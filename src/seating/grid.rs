use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeatingError};
use crate::roster::{Member, Part};

/// A seat: either occupied by a member or left empty as padding.
pub type Cell = Option<Member>;

/// Zero-based (row, index) address of a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub index: usize,
}

impl Coord {
    pub const fn new(row: usize, index: usize) -> Self {
        Self { row, index }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.index)
    }
}

/// Rectangular seating chart. Every row has the same number of cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    /// Center every row inside the width of the longest one.
    ///
    /// A row `diff` cells short gets `diff / 2` empty cells in front and the
    /// remainder behind.
    pub fn centered(rows: Vec<Vec<Member>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|row| {
                let diff = width - row.len();
                let left = diff / 2;
                let right = diff - left;
                let mut padded = Vec::with_capacity(width);
                padded.extend(std::iter::repeat_with(|| None).take(left));
                padded.extend(row.into_iter().map(Some));
                padded.extend(std::iter::repeat_with(|| None).take(right));
                padded
            })
            .collect();
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cells per row.
    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn get(&self, coord: Coord) -> Option<&Cell> {
        self.rows.get(coord.row).and_then(|row| row.get(coord.index))
    }

    pub fn member_at(&self, coord: Coord) -> Option<&Member> {
        self.get(coord).and_then(Option::as_ref)
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.get(coord).is_some()
    }

    /// Number of occupied seats.
    pub fn seated(&self) -> usize {
        self.rows.iter().flatten().filter(|cell| cell.is_some()).count()
    }

    /// Grid shape with identities erased, one part per occupied seat.
    pub fn part_layout(&self) -> Vec<Vec<Option<Part>>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.as_ref().map(Member::part)).collect())
            .collect()
    }

    /// Display names with `None` for empty seats; handy for assertions and plain output.
    pub fn names(&self) -> Vec<Vec<Option<&str>>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.as_ref().map(Member::name)).collect())
            .collect()
    }

    /// Exchange the contents of two seats. Swapping a seat with itself is a no-op.
    pub fn swap(&mut self, a: Coord, b: Coord) -> Result<()> {
        self.check(a)?;
        self.check(b)?;

        if a.row == b.row {
            self.rows[a.row].swap(a.index, b.index);
            return Ok(());
        }

        let (low, high) = if a.row < b.row { (a, b) } else { (b, a) };
        let (head, tail) = self.rows.split_at_mut(high.row);
        std::mem::swap(&mut head[low.row][low.index], &mut tail[0][high.index]);
        Ok(())
    }

    fn check(&self, coord: Coord) -> Result<()> {
        if self.contains(coord) {
            Ok(())
        } else {
            Err(SeatingError::OutOfBounds {
                coord,
                rows: self.row_count(),
                width: self.width(),
            })
        }
    }
}
