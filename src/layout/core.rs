use std::collections::HashMap;

use crate::geometry::{Rect, Size};
use crate::registry::Panel;

/// How many terminal rows a panel asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Exactly this many rows, clipped when the terminal is too short.
    Fixed(u16),
    /// At least this many rows, then a single share of what is left.
    Min(u16),
    /// A weighted share of what is left after fixed and minimum rows.
    Flex(u16),
}

/// Vertical stack of panels with optional gap and outer padding.
#[derive(Debug, Clone, Default)]
pub struct ScreenLayout {
    slots: Vec<(Panel, Constraint)>,
    gap: u16,
    padding: u16,
}

impl ScreenLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controls on top, chart filling the middle, status and hints at the bottom.
    pub fn editor() -> Self {
        Self::new()
            .push(Panel::Controls, Constraint::Fixed(3))
            .push(Panel::Chart, Constraint::Min(3))
            .push(Panel::Status, Constraint::Fixed(1))
            .push(Panel::Hints, Constraint::Fixed(1))
    }

    pub fn push(mut self, panel: Panel, constraint: Constraint) -> Self {
        self.slots.push((panel, constraint));
        self
    }

    pub fn with_gap(mut self, gap: u16) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_padding(mut self, padding: u16) -> Self {
        self.padding = padding;
        self
    }

    /// Solve rects for a terminal of `size`.
    pub fn solve(&self, size: Size) -> HashMap<Panel, Rect> {
        let mut rects = HashMap::new();
        if self.slots.is_empty() {
            return rects;
        }

        let inset = self.padding.saturating_mul(2);
        let width = size.width.saturating_sub(inset);
        let gaps = self
            .gap
            .saturating_mul(self.slots.len().saturating_sub(1) as u16);
        let available = size.height.saturating_sub(inset).saturating_sub(gaps);

        let constraints: Vec<Constraint> = self.slots.iter().map(|(_, c)| *c).collect();
        let heights = distribute(available, &constraints);

        let mut cursor = self.padding;
        for ((panel, _), height) in self.slots.iter().zip(heights) {
            rects.insert(*panel, Rect::new(self.padding, cursor, width, height));
            cursor = cursor.saturating_add(height).saturating_add(self.gap);
        }
        rects
    }
}

/// Grant fixed and minimum rows in order until space runs out, then split the
/// remainder across weighted slots; rounding leftovers go one row at a time
/// to weighted slots from the top.
fn distribute(available: u16, constraints: &[Constraint]) -> Vec<u16> {
    let mut remaining = available as u32;
    let mut lengths: Vec<u32> = constraints
        .iter()
        .map(|constraint| {
            let wanted = match constraint {
                Constraint::Fixed(rows) | Constraint::Min(rows) => *rows as u32,
                Constraint::Flex(_) => 0,
            };
            let granted = wanted.min(remaining);
            remaining -= granted;
            granted
        })
        .collect();

    let weights: Vec<u32> = constraints
        .iter()
        .map(|constraint| match constraint {
            Constraint::Fixed(_) => 0,
            Constraint::Min(_) => 1,
            Constraint::Flex(weight) => (*weight).max(1) as u32,
        })
        .collect();
    let total_weight: u32 = weights.iter().sum();

    if total_weight > 0 && remaining > 0 {
        let pool = remaining;
        for (length, weight) in lengths.iter_mut().zip(&weights) {
            let share = pool * weight / total_weight;
            *length += share;
            remaining -= share;
        }

        let mut idx = 0;
        while remaining > 0 {
            let slot = idx % lengths.len();
            if weights[slot] > 0 {
                lengths[slot] += 1;
                remaining -= 1;
            }
            idx += 1;
        }
    }

    lengths
        .into_iter()
        .map(|length| length.min(u16::MAX as u32) as u16)
        .collect()
}
