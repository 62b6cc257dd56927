use crate::seating::Coord;

use super::action::{Action, Outcome};
use super::core::SeatingState;

/// A seat picked up but not yet dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    pub source: Coord,
    /// Grid generation the source coordinate belongs to.
    pub generation: u64,
}

/// Drag-and-drop capability, independent of whatever produces the gestures.
///
/// The terminal front end drives it from mouse presses and releases; tests
/// drive it directly.
pub trait DragAndDrop {
    fn begin_drag(&mut self, source: Coord) -> Outcome;
    fn complete_drag(&mut self, source: Coord, target: Coord) -> Outcome;
    fn cancel_drag(&mut self) -> Outcome;
}

impl DragAndDrop for SeatingState {
    fn begin_drag(&mut self, source: Coord) -> Outcome {
        self.apply(Action::BeginDrag(source))
    }

    fn complete_drag(&mut self, source: Coord, target: Coord) -> Outcome {
        self.apply(Action::CompleteDrag { source, target })
    }

    fn cancel_drag(&mut self) -> Outcome {
        self.apply(Action::CancelDrag)
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::roster::PartCounts;
    use crate::seating::LayoutPolicy;

    #[test]
    fn capability_swaps_without_a_renderer() {
        let rows = NonZeroUsize::new(2).unwrap();
        let mut state =
            SeatingState::new(PartCounts::new(1, 1, 1, 1), rows, LayoutPolicy::Auto).unwrap();
        let original = state.grid().clone();

        let source = Coord::new(0, 0);
        let target = Coord::new(1, 1);
        assert!(matches!(state.begin_drag(source), Outcome::DragStarted(_)));
        assert!(matches!(
            state.complete_drag(source, target),
            Outcome::Swapped { .. }
        ));
        assert_eq!(state.grid().names()[0][0], Some("B1"));
        assert_eq!(state.grid().names()[1][1], Some("A1"));

        state.begin_drag(source);
        state.complete_drag(source, target);
        assert_eq!(state.grid(), &original);
    }

    #[test]
    fn dropping_on_the_source_changes_nothing() {
        let mut state = SeatingState::default();
        let original = state.grid().clone();
        let at = Coord::new(1, 3);
        state.begin_drag(at);
        assert!(matches!(state.complete_drag(at, at), Outcome::Swapped { .. }));
        assert_eq!(state.grid(), &original);
        assert!(matches!(state.cancel_drag(), Outcome::Unchanged));
    }
}
