//! Drawing: the terminal writer for dirty panels plus the content builders
//! for each panel.

mod chart;
mod core;
mod panels;

pub use chart::{
    CELL_GAP, CELL_HEIGHT, CELL_STRIDE, CELL_WIDTH, ChartGeometry, Highlights, ODD_ROW_INDENT,
    ROW_STRIDE, part_colour, render_chart,
};
pub use core::AnsiRenderer;
pub use panels::{HINTS, status_line};
