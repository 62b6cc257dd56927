use std::io::Write;

use crate::cursor;
use crate::display_width;
use crate::error::Result;
use crate::geometry::Rect;
use crate::registry::{Panel, PanelState};

/// Writes dirty panels to a terminal handle with absolute cursor moves.
#[derive(Debug, Default)]
pub struct AnsiRenderer {
    frames: u64,
}

impl AnsiRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames written so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn render(&mut self, writer: &mut impl Write, dirty: &[(Panel, PanelState)]) -> Result<()> {
        for (panel, state) in dirty {
            render_panel(writer, *panel, state)?;
        }
        writer.flush()?;
        self.frames += 1;
        Ok(())
    }
}

fn render_panel(writer: &mut impl Write, panel: Panel, state: &PanelState) -> Result<()> {
    let Rect {
        x,
        y,
        width,
        height,
    } = state.rect;

    if width == 0 || height == 0 {
        return Ok(());
    }

    let pre_rendered = panel.is_pre_rendered();
    let mut lines = if pre_rendered {
        state
            .content
            .lines()
            .map(|line| line.to_string())
            .collect::<Vec<_>>()
    } else {
        wrap_to_width(&state.content, width)
    };

    lines.truncate(height as usize);
    while lines.len() < height as usize {
        lines.push(String::new());
    }

    for (offset, line) in lines.iter_mut().enumerate() {
        pad_line(line, width);
        write!(writer, "{}", cursor::move_to_cell(x, y + offset as u16))?;
        write!(writer, "{line}")?;
        if pre_rendered {
            write!(writer, "{}", cursor::reset())?;
        }
    }

    Ok(())
}

fn wrap_to_width(content: &str, width: u16) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in content.split('\n') {
        if raw.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for ch in raw.chars() {
            if current.is_empty() && ch == ' ' {
                continue;
            }
            current.push(ch);
            let display = display_width(&current) as u16;
            if display > width {
                current.pop();
                lines.push(current.trim_start().to_string());
                current.clear();
                if ch != ' ' {
                    current.push(ch);
                }
            } else if display == width {
                lines.push(current.trim_start().to_string());
                current.clear();
            }
        }

        if !current.is_empty() {
            lines.push(current.trim_start().to_string());
        }
    }
    lines
}

fn pad_line(line: &mut String, width: u16) {
    let display = display_width(line) as u16;
    if display < width {
        line.push_str(&" ".repeat((width - display) as usize));
        return;
    }

    // Styled lines are fitted by their builders; this only trims plain overshoot.
    while (display_width(line) as u16) > width {
        line.pop();
    }
}
