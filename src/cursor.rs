//! ANSI cursor and colour sequences used by the renderers.

const CSI: &str = "\x1b[";

/// Move the cursor to an absolute 1-based `row` and `column`.
pub fn move_to(row: u16, column: u16) -> String {
    format!("{CSI}{row};{column}H")
}

/// Move to a 0-based terminal cell.
pub fn move_to_cell(column: u16, row: u16) -> String {
    move_to(row.saturating_add(1), column.saturating_add(1))
}

/// 24-bit background colour.
pub fn background(rgb: (u8, u8, u8)) -> String {
    let (r, g, b) = rgb;
    format!("{CSI}48;2;{r};{g};{b}m")
}

/// 24-bit foreground colour.
pub fn foreground(rgb: (u8, u8, u8)) -> String {
    let (r, g, b) = rgb;
    format!("{CSI}38;2;{r};{g};{b}m")
}

pub fn bold() -> &'static str {
    "\x1b[1m"
}

pub fn dim() -> &'static str {
    "\x1b[2m"
}

pub fn underline() -> &'static str {
    "\x1b[4m"
}

pub fn reverse() -> &'static str {
    "\x1b[7m"
}

/// Reset every SGR attribute.
pub fn reset() -> &'static str {
    "\x1b[0m"
}
