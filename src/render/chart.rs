//! Seating chart drawing and pointer hit-testing.
//!
//! Every seat is a block `CELL_WIDTH` columns wide and `CELL_HEIGHT` lines
//! tall: the member name on the first line, the part on the second. Odd rows
//! are shifted right by half a stride so neighbouring rows interlock, and the
//! whole chart is centered horizontally in its panel. A chart larger than its
//! panel shows a scrolled window of whole seats.

use crate::cursor;
use crate::geometry::Rect;
use crate::roster::Part;
use crate::seating::{Cell, Coord, Grid};
use crate::width::center;

pub const CELL_WIDTH: u16 = 8;
pub const CELL_GAP: u16 = 1;
pub const CELL_STRIDE: u16 = CELL_WIDTH + CELL_GAP;
pub const CELL_HEIGHT: u16 = 2;
pub const ROW_GAP: u16 = 1;
pub const ROW_STRIDE: u16 = CELL_HEIGHT + ROW_GAP;
pub const ODD_ROW_INDENT: u16 = CELL_STRIDE / 2;

const EMPTY_LABEL: &str = "empty";
const EMPTY_COLOUR: (u8, u8, u8) = (0xf0, 0xf0, 0xf0);
const TEXT_COLOUR: (u8, u8, u8) = (0x22, 0x22, 0x22);

/// Background colour for a part's seats.
pub fn part_colour(part: Part) -> (u8, u8, u8) {
    match part {
        Part::Soprano => (0xff, 0xe0, 0xe6),
        Part::Alto => (0xe0, 0xff, 0xe3),
        Part::Tenor => (0xe0, 0xf0, 0xff),
        Part::Bass => (0xff, 0xf5, 0xcc),
    }
}

/// Seats drawn with emphasis: the one being dragged and the keyboard cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Highlights {
    pub source: Option<Coord>,
    pub cursor: Option<Coord>,
}

/// Where each seat of a grid lands inside a panel, given the first visible
/// row and seat index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartGeometry {
    area: Rect,
    rows: usize,
    columns: usize,
    first_row: usize,
    first_index: usize,
}

impl ChartGeometry {
    pub fn new(area: Rect, grid: &Grid) -> Self {
        Self {
            area,
            rows: grid.row_count(),
            columns: grid.width(),
            first_row: 0,
            first_index: 0,
        }
    }

    /// Geometry whose area is exactly the chart, anchored at the origin.
    pub fn fitted(grid: &Grid) -> Self {
        let mut geometry = Self::new(Rect::default(), grid);
        geometry.area.width = clamp_u16(geometry.content_width());
        geometry.area.height = clamp_u16(geometry.content_height());
        geometry
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// First visible (row, index).
    pub fn scroll(&self) -> (usize, usize) {
        (self.first_row, self.first_index)
    }

    /// Same geometry scrolled so `first_row` and `first_index` lead the
    /// window, clamped so the window never runs past the grid.
    pub fn with_scroll(mut self, first_row: usize, first_index: usize) -> Self {
        self.first_row = first_row.min(self.rows - self.visible_rows());
        self.first_index = first_index.min(self.columns - self.visible_columns());
        self
    }

    /// Scroll by whole rows and seats.
    pub fn scrolled_by(self, rows: isize, seats: isize) -> Self {
        self.with_scroll(
            self.first_row.saturating_add_signed(rows),
            self.first_index.saturating_add_signed(seats),
        )
    }

    /// Smallest scroll that brings `coord` into view.
    pub fn follow(self, coord: Coord) -> Self {
        let (rows, columns) = (self.visible_rows(), self.visible_columns());
        if rows == 0 || columns == 0 {
            return self;
        }
        let first_row = follow_axis(self.first_row, rows, coord.row);
        let first_index = follow_axis(self.first_index, columns, coord.index);
        self.with_scroll(first_row, first_index)
    }

    /// Rows that fit in the panel at once.
    pub fn visible_rows(&self) -> usize {
        let fit = (self.area.height as usize + ROW_GAP as usize) / ROW_STRIDE as usize;
        fit.min(self.rows)
    }

    /// Seats per row that fit in the panel at once, leaving room for the
    /// odd-row indent.
    pub fn visible_columns(&self) -> usize {
        let room = (self.area.width as usize).saturating_sub(self.indent() as usize);
        let fit = (room + CELL_GAP as usize) / CELL_STRIDE as usize;
        fit.min(self.columns)
    }

    /// Seats outside the current window.
    pub fn offscreen(&self) -> usize {
        self.rows * self.columns - self.visible_rows() * self.visible_columns()
    }

    pub fn content_width(&self) -> u32 {
        span_width(self.columns, self.indent())
    }

    pub fn content_height(&self) -> u32 {
        if self.rows == 0 {
            return 0;
        }
        self.rows as u32 * ROW_STRIDE as u32 - ROW_GAP as u32
    }

    fn indent(&self) -> u16 {
        if self.rows > 1 { ODD_ROW_INDENT } else { 0 }
    }

    fn left(&self) -> u32 {
        let window = span_width(self.visible_columns(), self.indent());
        let spare = (self.area.width as u32).saturating_sub(window);
        self.area.x as u32 + spare / 2
    }

    fn row_left(&self, row: usize) -> u32 {
        let indent = if row % 2 == 1 { ODD_ROW_INDENT as u32 } else { 0 };
        self.left() + indent
    }

    /// Top-left terminal cell of a seat, or `None` when the seat is scrolled
    /// out of the window or does not fit the panel.
    pub fn cell_origin(&self, coord: Coord) -> Option<(u16, u16)> {
        let row = coord.row.checked_sub(self.first_row)?;
        let index = coord.index.checked_sub(self.first_index)?;
        if row >= self.visible_rows() || index >= self.visible_columns() {
            return None;
        }
        let x = self.row_left(coord.row) + index as u32 * CELL_STRIDE as u32;
        let y = self.area.y as u32 + row as u32 * ROW_STRIDE as u32;
        let fits = x + CELL_WIDTH as u32 <= self.area.right() as u32
            && y + CELL_HEIGHT as u32 <= self.area.bottom() as u32;
        fits.then_some((x as u16, y as u16))
    }

    /// Seat under the terminal cell at (`column`, `row`). Gaps between seats
    /// and seats outside the window hit nothing.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<Coord> {
        if !self.area.contains(column, row) {
            return None;
        }

        let dy = (row - self.area.y) as u32;
        if dy % ROW_STRIDE as u32 >= CELL_HEIGHT as u32 {
            return None;
        }
        let grid_row = self.first_row + (dy / ROW_STRIDE as u32) as usize;

        let dx = (column as u32).checked_sub(self.row_left(grid_row))?;
        if dx % CELL_STRIDE as u32 >= CELL_WIDTH as u32 {
            return None;
        }
        let index = self.first_index + (dx / CELL_STRIDE as u32) as usize;
        let coord = Coord::new(grid_row, index);
        self.cell_origin(coord).map(|_| coord)
    }
}

fn span_width(seats: usize, indent: u16) -> u32 {
    if seats == 0 {
        return 0;
    }
    seats as u32 * CELL_STRIDE as u32 - CELL_GAP as u32 + indent as u32
}

fn follow_axis(first: usize, visible: usize, target: usize) -> usize {
    if target < first {
        target
    } else if target >= first + visible {
        target + 1 - visible
    } else {
        first
    }
}

fn clamp_u16(value: u32) -> u16 {
    value.min(u16::MAX as u32) as u16
}

/// Lines for the chart panel, relative to the geometry's area. With `colour`
/// off seats are drawn as bracketed text: `<..>` marks the cursor, `{..}` the
/// seat being dragged.
pub fn render_chart(
    grid: &Grid,
    geometry: &ChartGeometry,
    highlights: Highlights,
    colour: bool,
) -> String {
    let area = geometry.area();
    let (first_row, first_index) = geometry.scroll();
    let mut lines: Vec<String> = Vec::new();

    let window = grid
        .rows()
        .iter()
        .enumerate()
        .skip(first_row)
        .take(geometry.visible_rows());
    for (row_idx, row) in window {
        let visible: Vec<(usize, (u16, u16))> = (first_index..row.len())
            .filter_map(|index| {
                geometry
                    .cell_origin(Coord::new(row_idx, index))
                    .map(|origin| (index, origin))
            })
            .collect();
        let Some(&(_, (first_x, _))) = visible.first() else {
            continue;
        };

        if !lines.is_empty() {
            lines.push(String::new());
        }
        let lead = " ".repeat((first_x - area.x) as usize);
        let mut top = lead.clone();
        let mut bottom = lead;

        for (position, (index, _)) in visible.iter().enumerate() {
            if position > 0 {
                top.push_str(&" ".repeat(CELL_GAP as usize));
                bottom.push_str(&" ".repeat(CELL_GAP as usize));
            }
            let coord = Coord::new(row_idx, *index);
            let (name, part) = cell_text(&row[*index]);
            let cell = CellLook::new(&row[*index], coord, highlights);
            top.push_str(&cell.paint(name, colour));
            bottom.push_str(&cell.paint(part, colour));
        }

        lines.push(top);
        lines.push(bottom);
    }

    lines.join("\n")
}

fn cell_text(cell: &Cell) -> (&str, &str) {
    match cell {
        Some(member) => (member.name(), member.part().label()),
        None => (EMPTY_LABEL, ""),
    }
}

struct CellLook {
    background: (u8, u8, u8),
    is_source: bool,
    is_cursor: bool,
}

impl CellLook {
    fn new(cell: &Cell, coord: Coord, highlights: Highlights) -> Self {
        Self {
            background: cell
                .as_ref()
                .map(|member| part_colour(member.part()))
                .unwrap_or(EMPTY_COLOUR),
            is_source: highlights.source == Some(coord),
            is_cursor: highlights.cursor == Some(coord),
        }
    }

    fn paint(&self, text: &str, colour: bool) -> String {
        if !colour {
            let (open, close) = if self.is_cursor {
                ('<', '>')
            } else if self.is_source {
                ('{', '}')
            } else {
                ('[', ']')
            };
            let inner = center(text, CELL_WIDTH as usize - 2);
            return format!("{open}{inner}{close}");
        }

        let mut styled = cursor::foreground(TEXT_COLOUR);
        styled.push_str(&cursor::background(self.background));
        if self.is_source {
            styled.push_str(cursor::reverse());
        }
        if self.is_cursor {
            styled.push_str(cursor::bold());
            styled.push_str(cursor::underline());
        }
        styled.push_str(&center(text, CELL_WIDTH as usize));
        styled.push_str(cursor::reset());
        styled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display_width;
    use crate::roster::{IdAllocator, PartCounts, Roster};
    use crate::seating::{LayoutPolicy, assign};
    use std::num::NonZeroUsize;

    fn grid(counts: PartCounts, rows: usize) -> Grid {
        let roster = Roster::generate(&counts, &mut IdAllocator::new());
        assign(roster, NonZeroUsize::new(rows).unwrap(), LayoutPolicy::Auto).unwrap()
    }

    #[test]
    fn hit_test_maps_cells_and_skips_gaps() {
        let grid = grid(PartCounts::new(3, 3, 0, 0), 2);
        let geometry = ChartGeometry::new(Rect::new(0, 5, 80, 10), &grid);

        // 3 columns: 3 * 9 - 1 + 4 = 30 wide, centered at x = 25.
        assert_eq!(geometry.content_width(), 30);
        assert_eq!(geometry.hit_test(25, 5), Some(Coord::new(0, 0)));
        assert_eq!(geometry.hit_test(32, 6), Some(Coord::new(0, 0)));
        assert_eq!(geometry.hit_test(33, 5), None);
        assert_eq!(geometry.hit_test(34, 5), Some(Coord::new(0, 1)));
        assert_eq!(geometry.hit_test(30, 7), None);
        assert_eq!(geometry.hit_test(29, 8), Some(Coord::new(1, 0)));
        assert_eq!(geometry.hit_test(28, 8), None);
        assert_eq!(geometry.hit_test(47, 9), Some(Coord::new(1, 2)));
        assert_eq!(geometry.hit_test(40, 11), None);
        assert_eq!(geometry.hit_test(25, 4), None);
    }

    #[test]
    fn narrow_panel_scrolls_to_reach_every_seat() {
        let grid = grid(PartCounts::new(10, 0, 0, 0), 1);
        let geometry = ChartGeometry::new(Rect::new(0, 0, 20, 2), &grid);
        // Two 8-wide seats plus a gap fill 17 of 20 columns, left at 1.
        assert_eq!(geometry.visible_columns(), 2);
        assert_eq!(geometry.offscreen(), 8);
        assert_eq!(geometry.hit_test(1, 0), Some(Coord::new(0, 0)));
        assert_eq!(geometry.hit_test(10, 0), Some(Coord::new(0, 1)));
        assert_eq!(geometry.hit_test(19, 0), None);
        assert!(geometry.cell_origin(Coord::new(0, 2)).is_none());

        let scrolled = geometry.follow(Coord::new(0, 9));
        assert_eq!(scrolled.scroll(), (0, 8));
        assert_eq!(scrolled.hit_test(1, 0), Some(Coord::new(0, 8)));
        assert_eq!(scrolled.hit_test(10, 1), Some(Coord::new(0, 9)));
        assert!(scrolled.cell_origin(Coord::new(0, 0)).is_none());

        let chart = render_chart(&grid, &scrolled, Highlights::default(), false);
        assert_eq!(chart.lines().next(), Some(" [  S9  ] [ S10  ]"));
    }

    #[test]
    fn scroll_is_clamped_to_the_grid() {
        let grid = grid(PartCounts::new(10, 0, 0, 0), 1);
        let geometry = ChartGeometry::new(Rect::new(0, 0, 20, 2), &grid);
        assert_eq!(geometry.with_scroll(5, 50).scroll(), (0, 8));
        assert_eq!(geometry.scrolled_by(-3, -3).scroll(), (0, 0));
        assert_eq!(geometry.scrolled_by(0, 3).scroll(), (0, 3));

        let roomy = ChartGeometry::fitted(&grid);
        assert_eq!(roomy.with_scroll(2, 2).scroll(), (0, 0));
        assert_eq!(roomy.offscreen(), 0);
    }

    #[test]
    fn every_seat_of_the_default_chart_is_reachable_at_80_columns() {
        let grid = grid(PartCounts::default(), 3);
        // Chart panel of the editor layout on an 80x24 terminal.
        let mut geometry = ChartGeometry::new(Rect::new(0, 3, 80, 19), &grid);
        assert!(geometry.content_width() > 80);
        assert!(geometry.offscreen() > 0);

        for row in 0..grid.row_count() {
            for index in 0..grid.width() {
                let coord = Coord::new(row, index);
                geometry = geometry.follow(coord);
                let (x, y) = geometry.cell_origin(coord).unwrap();
                assert!(x + CELL_WIDTH <= 80);
                assert_eq!(geometry.hit_test(x, y), Some(coord));
                assert_eq!(geometry.hit_test(x + CELL_WIDTH - 1, y + 1), Some(coord));
            }
        }
    }

    #[test]
    fn tall_charts_scroll_by_rows() {
        let grid = grid(PartCounts::new(4, 4, 4, 4), 8);
        let geometry = ChartGeometry::new(Rect::new(0, 0, 80, 11), &grid);
        // 11 lines hold rows of 2 lines plus a 1-line gap: 4 rows.
        assert_eq!(geometry.visible_rows(), 4);
        assert!(geometry.cell_origin(Coord::new(6, 0)).is_none());

        let scrolled = geometry.follow(Coord::new(7, 0));
        assert_eq!(scrolled.scroll(), (4, 0));
        let (x, y) = scrolled.cell_origin(Coord::new(7, 0)).unwrap();
        assert_eq!(y, 9);
        assert_eq!(scrolled.hit_test(x, y), Some(Coord::new(7, 0)));
        // Row 4 now leads the window; row 7 keeps its odd-row indent.
        assert_eq!(
            scrolled.hit_test(x - ODD_ROW_INDENT, 0),
            Some(Coord::new(4, 0))
        );

        let chart = render_chart(&grid, &scrolled, Highlights::default(), false);
        assert_eq!(chart.lines().count(), 11);
    }

    #[test]
    fn plain_chart_shows_names_parts_and_indent() {
        let grid = grid(PartCounts::new(1, 1, 1, 1), 2);
        let geometry = ChartGeometry::fitted(&grid);
        let chart = render_chart(&grid, &geometry, Highlights::default(), false);
        let lines: Vec<&str> = chart.lines().collect();

        assert_eq!(
            lines,
            vec![
                "[  A1  ] [  T1  ]",
                "[ Alto ] [Tenor ]",
                "",
                "    [  S1  ] [  B1  ]",
                "    [Sopran] [ Bass ]",
            ]
        );
    }

    #[test]
    fn plain_chart_marks_empty_seats_and_highlights() {
        let grid = grid(PartCounts::new(1, 2, 0, 0), 2);
        let highlights = Highlights {
            source: Some(Coord::new(0, 0)),
            cursor: Some(Coord::new(1, 1)),
        };
        let chart = render_chart(&grid, &ChartGeometry::fitted(&grid), highlights, false);
        let lines: Vec<&str> = chart.lines().collect();

        assert_eq!(lines[0], "{  A1  } [  S1  ]");
        assert_eq!(lines[3], "    [  A2  ] <empty >");
    }

    #[test]
    fn colour_chart_keeps_cell_widths() {
        let grid = grid(PartCounts::new(2, 2, 1, 1), 3);
        let geometry = ChartGeometry::new(Rect::new(0, 0, 40, 9), &grid);
        let chart = render_chart(&grid, &geometry, Highlights::default(), true);

        let first = chart.lines().next().unwrap();
        assert!(first.contains(&cursor::background(part_colour(Part::Alto))));
        // width 2: 2 * 9 - 1 + 4 = 21 columns, centered in 40.
        assert_eq!(display_width(first), 9 + 17);
    }
}
