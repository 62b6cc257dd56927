use crate::state::SeatingState;

/// Key reference shown on the bottom line.
pub const HINTS: &str = "Tab/Shift-Tab focus  Up/Down adjust  digits+Enter type  \
r regenerate  arrows+Space move a seat  mouse drag swaps  wheel scrolls  Esc cancel  q quit";

/// Status text: the last outcome followed by the current inputs, and how
/// many seats the chart panel is hiding.
pub fn status_line(message: &str, state: &SeatingState, offscreen: usize) -> String {
    let mut line = format!(
        "{message} | rows {} | policy {} | layout #{}",
        state.row_count(),
        state.policy(),
        state.generation()
    );
    if let Some(drag) = state.drag() {
        line.push_str(&format!(" | holding {}", drag.source));
    }
    if offscreen > 0 {
        line.push_str(&format!(" | {offscreen} seats off-screen"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seating::Coord;
    use crate::state::Action;

    #[test]
    fn status_reports_inputs_and_drag() {
        let mut state = SeatingState::default();
        assert_eq!(
            status_line("Ready", &state, 0),
            "Ready | rows 3 | policy auto | layout #1"
        );

        state.apply(Action::BeginDrag(Coord::new(0, 1)));
        assert!(status_line("Picked up", &state, 0).ends_with("| holding (0, 1)"));
        assert!(
            status_line("Picked up", &state, 6).ends_with("| holding (0, 1) | 6 seats off-screen")
        );
    }
}
