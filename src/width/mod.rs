//! Terminal display width helpers.
//!
//! Chart cells carry SGR colour codes, so widths are measured after stripping
//! ANSI escapes.

/// Compute the display width of a string after stripping ANSI escapes.
pub fn display_width(text: &str) -> usize {
    let clean = strip_ansi_escapes::strip(text);
    let clean_str = String::from_utf8_lossy(&clean);
    unicode_width::UnicodeWidthStr::width(&*clean_str)
}

/// Center `text` in a field of `width` columns, truncating when it does not fit.
pub fn center(text: &str, width: usize) -> String {
    let mut fitted = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        fitted.push(ch);
        used += w;
    }

    let diff = width - used;
    let left = diff / 2;
    format!("{}{}{}", " ".repeat(left), fitted, " ".repeat(diff - left))
}
