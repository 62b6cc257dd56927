//! Keyboard side of the editor: which input has focus, the text being typed
//! into a numeric field, and the seat cursor used to move members without a
//! mouse.

use std::num::NonZeroUsize;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::cursor;
use crate::display_width;
use crate::input::{parse_count, parse_row_count};
use crate::roster::{MAX_PER_PART, Part};
use crate::seating::{Coord, LayoutPolicy, MAX_ROWS, policy_options};
use crate::state::{Action, SeatingState};

const MAX_BUFFER: usize = 12;

/// Focusable inputs, in Tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Count(Part),
    Rows,
    Policy,
    Chart,
}

impl Field {
    pub const ORDER: [Field; 7] = [
        Field::Count(Part::Soprano),
        Field::Count(Part::Alto),
        Field::Count(Part::Tenor),
        Field::Count(Part::Bass),
        Field::Rows,
        Field::Policy,
        Field::Chart,
    ];

    fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    fn previous(self) -> Self {
        let len = Self::ORDER.len();
        Self::ORDER[(self.position() + len - 1) % len]
    }

    fn is_numeric(self) -> bool {
        matches!(self, Field::Count(_) | Field::Rows)
    }
}

/// What the runtime should do after a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Nothing,
    Redraw,
    Dispatch(Action),
    Exit,
}

#[derive(Debug, Clone)]
pub struct Controls {
    focus: Field,
    buffer: Option<String>,
    cursor: Coord,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            focus: Field::Count(Part::Soprano),
            buffer: None,
            cursor: Coord::new(0, 0),
        }
    }
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> Field {
        self.focus
    }

    pub fn set_focus(&mut self, field: Field) {
        self.buffer = None;
        self.focus = field;
    }

    /// Text typed into the focused numeric field and not yet committed.
    pub fn buffer(&self) -> Option<&str> {
        self.buffer.as_deref()
    }

    pub fn cursor(&self) -> Coord {
        self.cursor
    }

    /// The chart cursor, shown only while the chart has focus.
    pub fn visible_cursor(&self) -> Option<Coord> {
        (self.focus == Field::Chart).then_some(self.cursor)
    }

    /// Keep the seat cursor inside the grid after it changes shape.
    pub fn sync(&mut self, state: &SeatingState) {
        let grid = state.grid();
        self.cursor = Coord::new(
            self.cursor.row.min(grid.row_count().saturating_sub(1)),
            self.cursor.index.min(grid.width().saturating_sub(1)),
        );
    }

    pub fn handle_key(&mut self, key: &KeyEvent, state: &SeatingState) -> Command {
        if key.kind == KeyEventKind::Release {
            return Command::Nothing;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Command::Exit;
        }
        if self.buffer.is_some() {
            return self.edit_key(key);
        }

        match key.code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                Command::Redraw
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                Command::Redraw
            }
            KeyCode::Char('q') => Command::Exit,
            KeyCode::Char('r') => Command::Dispatch(Action::Regenerate),
            KeyCode::Esc if state.drag().is_some() => Command::Dispatch(Action::CancelDrag),
            _ => match self.focus {
                Field::Count(part) => self.count_key(part, key.code, state),
                Field::Rows => self.rows_key(key.code, state),
                Field::Policy => policy_key(key.code, state),
                Field::Chart => self.chart_key(key.code, state),
            },
        }
    }

    /// Pasted text lands in the focused numeric field's buffer.
    pub fn handle_paste(&mut self, text: &str) -> Command {
        if !self.focus.is_numeric() {
            return Command::Nothing;
        }
        let buffer = self.buffer.get_or_insert_with(String::new);
        for ch in text.trim().chars() {
            if buffer.len() >= MAX_BUFFER {
                break;
            }
            if ch.is_ascii_digit() || (ch == '-' && buffer.is_empty()) {
                buffer.push(ch);
            }
        }
        Command::Redraw
    }

    fn edit_key(&mut self, key: &KeyEvent) -> Command {
        match key.code {
            KeyCode::Char(ch) => {
                if let Some(buffer) = self.buffer.as_mut() {
                    let accepted = ch.is_ascii_digit() || (ch == '-' && buffer.is_empty());
                    if accepted && buffer.len() < MAX_BUFFER {
                        buffer.push(ch);
                        return Command::Redraw;
                    }
                }
                Command::Nothing
            }
            KeyCode::Backspace => {
                if let Some(buffer) = self.buffer.as_mut() {
                    buffer.pop();
                }
                Command::Redraw
            }
            KeyCode::Enter => self.commit(),
            KeyCode::Tab => {
                let command = self.commit();
                self.focus = self.focus.next();
                command
            }
            KeyCode::BackTab => {
                let command = self.commit();
                self.focus = self.focus.previous();
                command
            }
            KeyCode::Esc => {
                self.buffer = None;
                Command::Redraw
            }
            _ => Command::Nothing,
        }
    }

    fn commit(&mut self) -> Command {
        let Some(raw) = self.buffer.take() else {
            return Command::Nothing;
        };
        match self.focus {
            Field::Count(part) => Command::Dispatch(Action::SetCount {
                part,
                count: parse_count(&raw),
            }),
            Field::Rows => Command::Dispatch(Action::SetRowCount(parse_row_count(&raw))),
            Field::Policy | Field::Chart => Command::Redraw,
        }
    }

    fn begin_edit(&mut self, seed: String) -> Command {
        self.buffer = Some(seed);
        Command::Redraw
    }

    fn count_key(&mut self, part: Part, code: KeyCode, state: &SeatingState) -> Command {
        let count = state.counts().get(part);
        match code {
            KeyCode::Up | KeyCode::Char('+') if count < MAX_PER_PART => {
                Command::Dispatch(Action::SetCount {
                    part,
                    count: count + 1,
                })
            }
            KeyCode::Down | KeyCode::Char('-') if count > 0 => Command::Dispatch(Action::SetCount {
                part,
                count: count - 1,
            }),
            KeyCode::Char(ch) if ch.is_ascii_digit() => self.begin_edit(ch.to_string()),
            KeyCode::Enter | KeyCode::Backspace => self.begin_edit(count.to_string()),
            _ => Command::Nothing,
        }
    }

    fn rows_key(&mut self, code: KeyCode, state: &SeatingState) -> Command {
        let rows = state.row_count();
        match code {
            KeyCode::Up | KeyCode::Char('+') if rows.get() < MAX_ROWS => {
                Command::Dispatch(Action::SetRowCount(rows.saturating_add(1)))
            }
            KeyCode::Down | KeyCode::Char('-') => match NonZeroUsize::new(rows.get() - 1) {
                Some(fewer) => Command::Dispatch(Action::SetRowCount(fewer)),
                None => Command::Nothing,
            },
            KeyCode::Char(ch) if ch.is_ascii_digit() => self.begin_edit(ch.to_string()),
            KeyCode::Enter | KeyCode::Backspace => self.begin_edit(rows.to_string()),
            _ => Command::Nothing,
        }
    }

    fn chart_key(&mut self, code: KeyCode, state: &SeatingState) -> Command {
        let grid = state.grid();
        let last_row = grid.row_count().saturating_sub(1);
        let last_index = grid.width().saturating_sub(1);
        let Coord { row, index } = self.cursor;

        let moved = match code {
            KeyCode::Up => Coord::new(row.saturating_sub(1), index),
            KeyCode::Down => Coord::new((row + 1).min(last_row), index),
            KeyCode::Left => Coord::new(row, index.saturating_sub(1)),
            KeyCode::Right => Coord::new(row, (index + 1).min(last_index)),
            KeyCode::Char(' ') | KeyCode::Enter => {
                return match state.drag() {
                    Some(session) => Command::Dispatch(Action::CompleteDrag {
                        source: session.source,
                        target: self.cursor,
                    }),
                    None => Command::Dispatch(Action::BeginDrag(self.cursor)),
                };
            }
            _ => return Command::Nothing,
        };

        if moved == self.cursor {
            return Command::Nothing;
        }
        self.cursor = moved;
        Command::Redraw
    }

    /// Three lines: the numeric inputs with the running total, the policy
    /// choices, and a rule separating the controls from the chart.
    pub fn render(&self, state: &SeatingState, width: u16, colour: bool) -> String {
        let counts = state.counts();
        let mut inputs: Vec<Segment> = Part::ALL
            .iter()
            .map(|part| self.field_segment(Field::Count(*part), counts.get(*part).to_string()))
            .collect();
        inputs.push(self.field_segment(Field::Rows, state.row_count().to_string()));
        inputs.push(Segment::plain(format!("Total {}", counts.total())));

        let mut choices = vec![self.label_segment(Field::Policy, "Policy")];
        for (policy, available) in policy_options(state.row_count().get()) {
            choices.push(policy_segment(policy, available, policy == state.policy()));
        }
        choices.push(self.label_segment(Field::Chart, "Chart"));

        [
            fit_segments(&inputs, width, colour),
            fit_segments(&choices, width, colour),
            "─".repeat(width as usize),
        ]
        .join("\n")
    }

    fn field_segment(&self, field: Field, value: String) -> Segment {
        let label = match field {
            Field::Count(part) => part.label(),
            Field::Rows => "Rows",
            Field::Policy => "Policy",
            Field::Chart => "Chart",
        };
        let shown = match (&self.buffer, self.focus == field) {
            (Some(buffer), true) => format!("{buffer}_"),
            _ => value,
        };
        Segment {
            text: format!("{label} [{shown}]"),
            style: self.focus_style(field),
        }
    }

    fn label_segment(&self, field: Field, label: &str) -> Segment {
        Segment {
            text: label.to_string(),
            style: self.focus_style(field),
        }
    }

    fn focus_style(&self, field: Field) -> Style {
        if self.focus == field {
            Style::Focused
        } else {
            Style::Normal
        }
    }
}

fn policy_key(code: KeyCode, state: &SeatingState) -> Command {
    let step: isize = match code {
        KeyCode::Left | KeyCode::Up => -1,
        KeyCode::Right | KeyCode::Down | KeyCode::Enter | KeyCode::Char(' ') => 1,
        _ => return Command::Nothing,
    };

    let selectable: Vec<LayoutPolicy> = policy_options(state.row_count().get())
        .into_iter()
        .filter_map(|(policy, available)| available.then_some(policy))
        .collect();
    let current = selectable
        .iter()
        .position(|policy| *policy == state.policy())
        .unwrap_or(0) as isize;
    let len = selectable.len() as isize;
    let next = selectable[(current + step).rem_euclid(len) as usize];

    if next == state.policy() {
        Command::Nothing
    } else {
        Command::Dispatch(Action::SetPolicy(next))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Normal,
    Focused,
    Selected,
    Unavailable,
}

#[derive(Debug, Clone)]
struct Segment {
    text: String,
    style: Style,
}

impl Segment {
    fn plain(text: String) -> Self {
        Self {
            text,
            style: Style::Normal,
        }
    }

    /// Plain rendition keeps focus and selection readable without colour.
    fn plain_text(&self) -> String {
        match self.style {
            Style::Normal => format!(" {} ", self.text),
            Style::Focused => format!(">{}<", self.text),
            Style::Selected => format!("({})", self.text),
            Style::Unavailable => format!(" {}-", self.text),
        }
    }

    fn styled_text(&self) -> String {
        let padded = format!(" {} ", self.text);
        match self.style {
            Style::Normal => padded,
            Style::Focused => format!("{}{padded}{}", cursor::reverse(), cursor::reset()),
            Style::Selected => format!("{}{padded}{}", cursor::bold(), cursor::reset()),
            Style::Unavailable => format!("{}{padded}{}", cursor::dim(), cursor::reset()),
        }
    }
}

fn policy_segment(policy: LayoutPolicy, available: bool, selected: bool) -> Segment {
    let style = match (selected, available) {
        (true, _) => Style::Selected,
        (false, true) => Style::Normal,
        (false, false) => Style::Unavailable,
    };
    Segment {
        text: policy.as_str().to_string(),
        style,
    }
}

/// Join segments until `width` runs out; the segment that overflows is cut
/// and left unstyled so no escape sequence is split.
fn fit_segments(segments: &[Segment], width: u16, colour: bool) -> String {
    let width = width as usize;
    let mut line = String::new();
    let mut used = 0;

    for segment in segments {
        let plain = segment.plain_text();
        let cost = display_width(&plain);
        if used + cost <= width {
            if colour {
                line.push_str(&segment.styled_text());
            } else {
                line.push_str(&plain);
            }
            used += cost;
            continue;
        }

        for ch in plain.chars() {
            let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
            if used + w > width {
                break;
            }
            line.push(ch);
            used += w;
        }
        break;
    }
    line
}
