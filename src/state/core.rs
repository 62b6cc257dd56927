use std::num::NonZeroUsize;

use crate::error::{Result, SeatingError};
use crate::roster::{IdAllocator, MAX_PER_PART, Part, PartCounts, Roster};
use crate::seating::{Coord, Grid, LayoutPolicy, MAX_ROWS, assign};

use super::action::{Action, Outcome, Transition};
use super::drag::DragSession;

/// Everything the editor knows: the inputs, the grid built from them, and
/// any drag in flight.
#[derive(Debug, Clone)]
pub struct SeatingState {
    counts: PartCounts,
    row_count: NonZeroUsize,
    policy: LayoutPolicy,
    grid: Grid,
    generation: u64,
    ids: IdAllocator,
    drag: Option<DragSession>,
}

const DEFAULT_ROWS: NonZeroUsize = match NonZeroUsize::new(3) {
    Some(rows) => rows,
    None => NonZeroUsize::MIN,
};

impl Default for SeatingState {
    fn default() -> Self {
        let mut state = Self::empty(PartCounts::default(), DEFAULT_ROWS, LayoutPolicy::Auto);
        // Auto is valid at every row count.
        let _ = state.regenerate();
        state
    }
}

impl SeatingState {
    /// Build a state and run the first generation.
    pub fn new(counts: PartCounts, row_count: NonZeroUsize, policy: LayoutPolicy) -> Result<Self> {
        let mut state = Self::empty(counts, row_count, policy);
        state.regenerate()?;
        Ok(state)
    }

    fn empty(counts: PartCounts, row_count: NonZeroUsize, policy: LayoutPolicy) -> Self {
        Self {
            counts,
            row_count,
            policy,
            grid: Grid::default(),
            generation: 0,
            ids: IdAllocator::new(),
            drag: None,
        }
    }

    pub fn counts(&self) -> &PartCounts {
        &self.counts
    }

    pub fn row_count(&self) -> NonZeroUsize {
        self.row_count
    }

    pub fn policy(&self) -> LayoutPolicy {
        self.policy
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Number of completed generations; bumps on every regeneration.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn drag(&self) -> Option<DragSession> {
        self.drag
    }

    /// Apply `action` in place and report what happened. A rejected action
    /// leaves the inputs and the grid untouched.
    pub fn apply(&mut self, action: Action) -> Outcome {
        match action {
            Action::SetCount { part, count } => self.set_count(part, count),
            Action::SetRowCount(rows) => self.set_row_count(rows),
            Action::SetPolicy(policy) => self.set_policy(policy),
            Action::Regenerate => self.outcome_of_regenerate(),
            Action::Swap { a, b } => match self.grid.swap(a, b) {
                Ok(()) => Outcome::Swapped { a, b },
                Err(err) => Outcome::Rejected(err),
            },
            Action::BeginDrag(coord) => self.begin_drag(coord),
            Action::CompleteDrag { source, target } => self.complete_drag(source, target),
            Action::CancelDrag => match self.drag.take() {
                Some(_) => Outcome::DragCancelled,
                None => Outcome::Unchanged,
            },
        }
    }

    fn set_count(&mut self, part: Part, count: u32) -> Outcome {
        if self.counts.get(part) == count {
            return Outcome::Unchanged;
        }
        let previous = self.counts;
        self.counts.set(part, count);
        self.regenerate_or_restore(|state| state.counts = previous)
    }

    fn set_row_count(&mut self, rows: NonZeroUsize) -> Outcome {
        if self.row_count == rows {
            return Outcome::Unchanged;
        }
        let (previous_rows, previous_policy) = (self.row_count, self.policy);
        self.row_count = rows;
        if !self.policy.is_available(rows.get()) {
            // The option the policy needs just disappeared; fall back.
            self.policy = LayoutPolicy::Auto;
        }
        self.regenerate_or_restore(|state| {
            state.row_count = previous_rows;
            state.policy = previous_policy;
        })
    }

    fn set_policy(&mut self, policy: LayoutPolicy) -> Outcome {
        if self.policy == policy {
            return Outcome::Unchanged;
        }
        let rows = self.row_count.get();
        if !policy.is_available(rows) {
            return Outcome::Rejected(SeatingError::PolicyUnavailable {
                policy,
                rows,
                required: policy.min_rows(),
            });
        }
        let previous = self.policy;
        self.policy = policy;
        self.regenerate_or_restore(|state| state.policy = previous)
    }

    fn regenerate_or_restore(&mut self, restore: impl FnOnce(&mut Self)) -> Outcome {
        match self.regenerate() {
            Ok(()) => self.regenerated(),
            Err(err) => {
                restore(self);
                Outcome::Rejected(err)
            }
        }
    }

    fn outcome_of_regenerate(&mut self) -> Outcome {
        match self.regenerate() {
            Ok(()) => self.regenerated(),
            Err(err) => Outcome::Rejected(err),
        }
    }

    fn regenerated(&self) -> Outcome {
        Outcome::Regenerated {
            generation: self.generation,
            seated: self.grid.seated(),
        }
    }

    /// Replace the grid with a fresh roster dealt under the current inputs.
    /// Any drag in progress is dropped since its coordinates refer to the old
    /// grid. On error nothing changes.
    fn regenerate(&mut self) -> Result<()> {
        self.check_limits()?;
        self.policy.placement(self.row_count)?;
        let roster = Roster::generate(&self.counts, &mut self.ids);
        self.grid = assign(roster, self.row_count, self.policy)?;
        self.generation += 1;
        self.drag = None;
        Ok(())
    }

    fn check_limits(&self) -> Result<()> {
        if let Some(part) = Part::ALL
            .into_iter()
            .find(|part| self.counts.get(*part) > MAX_PER_PART)
        {
            return Err(SeatingError::TooManyMembers {
                part,
                count: self.counts.get(part),
                max: MAX_PER_PART,
            });
        }
        if self.row_count.get() > MAX_ROWS {
            return Err(SeatingError::TooManyRows {
                rows: self.row_count.get(),
                max: MAX_ROWS,
            });
        }
        Ok(())
    }

    fn begin_drag(&mut self, coord: Coord) -> Outcome {
        if !self.grid.contains(coord) {
            return Outcome::Rejected(self.out_of_bounds(coord));
        }
        self.drag = Some(DragSession {
            source: coord,
            generation: self.generation,
        });
        Outcome::DragStarted(coord)
    }

    fn complete_drag(&mut self, source: Coord, target: Coord) -> Outcome {
        let Some(session) = self.drag else {
            return Outcome::Rejected(SeatingError::NoDragInProgress);
        };
        if session.generation != self.generation || session.source != source {
            self.drag = None;
            return Outcome::Rejected(SeatingError::StaleDrag);
        }
        match self.grid.swap(source, target) {
            Ok(()) => {
                self.drag = None;
                Outcome::Swapped {
                    a: source,
                    b: target,
                }
            }
            // Dropped outside the grid: the pick-up stays live.
            Err(err) => Outcome::Rejected(err),
        }
    }

    fn out_of_bounds(&self, coord: Coord) -> SeatingError {
        SeatingError::OutOfBounds {
            coord,
            rows: self.grid.row_count(),
            width: self.grid.width(),
        }
    }
}

/// Pure transition function: consume a state and an action, return the next
/// state and what happened.
pub fn reduce(mut state: SeatingState, action: Action) -> Transition {
    let outcome = state.apply(action);
    Transition { state, outcome }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn small_state() -> SeatingState {
        SeatingState::new(PartCounts::new(2, 2, 1, 1), rows(3), LayoutPolicy::Auto).unwrap()
    }

    #[test]
    fn default_state_is_generated() {
        let state = SeatingState::default();
        assert_eq!(state.generation(), 1);
        assert_eq!(state.row_count().get(), 3);
        assert_eq!(state.policy(), LayoutPolicy::Auto);
        assert_eq!(state.grid().seated(), 30);
    }

    #[test]
    fn new_rejects_policy_that_needs_more_rows() {
        let err = SeatingState::new(PartCounts::default(), rows(3), LayoutPolicy::Condition2)
            .unwrap_err();
        assert!(matches!(err, SeatingError::PolicyUnavailable { .. }));
    }

    #[test]
    fn new_rejects_oversized_inputs() {
        let err = SeatingState::new(
            PartCounts::new(MAX_PER_PART + 1, 0, 0, 0),
            rows(3),
            LayoutPolicy::Auto,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SeatingError::TooManyMembers {
                part: Part::Soprano,
                ..
            }
        ));

        let err = SeatingState::new(PartCounts::default(), rows(MAX_ROWS + 1), LayoutPolicy::Auto)
            .unwrap_err();
        assert_eq!(err.kind(), "too_many_rows");
    }

    #[test]
    fn huge_row_count_is_rejected_without_touching_the_grid() {
        let state = small_state();
        let before = state.grid().clone();
        let Transition { state, outcome } =
            reduce(state, Action::SetRowCount(rows(999_999_999_999)));
        assert!(matches!(
            outcome,
            Outcome::Rejected(SeatingError::TooManyRows { max: MAX_ROWS, .. })
        ));
        assert_eq!(state.row_count().get(), 3);
        assert_eq!(state.grid(), &before);
        assert_eq!(state.generation(), 1);
    }

    #[test]
    fn huge_count_is_rejected_without_touching_the_grid() {
        let state = small_state();
        let before = state.grid().clone();
        let Transition { state, outcome } = reduce(
            state,
            Action::SetCount {
                part: Part::Bass,
                count: u32::MAX,
            },
        );
        assert!(matches!(
            outcome,
            Outcome::Rejected(SeatingError::TooManyMembers {
                part: Part::Bass,
                ..
            })
        ));
        assert_eq!(state.counts().bass, 1);
        assert_eq!(state.grid(), &before);

        let Transition { state, outcome } = reduce(
            state,
            Action::SetCount {
                part: Part::Bass,
                count: MAX_PER_PART,
            },
        );
        assert_eq!(outcome.kind(), "regenerated");
        assert_eq!(state.counts().bass, MAX_PER_PART);
    }

    #[test]
    fn changing_a_count_regenerates() {
        let Transition { state, outcome } = reduce(
            small_state(),
            Action::SetCount {
                part: Part::Bass,
                count: 3,
            },
        );
        assert!(matches!(
            outcome,
            Outcome::Regenerated {
                generation: 2,
                seated: 8
            }
        ));
        assert_eq!(state.counts().bass, 3);
        assert_eq!(state.grid().width(), 4);
    }

    #[test]
    fn unchanged_input_does_not_regenerate() {
        let state = small_state();
        let Transition { state, outcome } = reduce(
            state,
            Action::SetCount {
                part: Part::Soprano,
                count: 2,
            },
        );
        assert!(matches!(outcome, Outcome::Unchanged));
        assert_eq!(state.generation(), 1);
    }

    #[test]
    fn regenerate_issues_fresh_identities_with_same_shape() {
        let state = small_state();
        let before = state.grid().clone();
        let Transition { state, outcome } = reduce(state, Action::Regenerate);
        assert_eq!(outcome.kind(), "regenerated");
        assert_eq!(state.grid().part_layout(), before.part_layout());
        assert_ne!(state.grid(), &before);
    }

    #[test]
    fn condition2_needs_four_rows() {
        let Transition { state, outcome } =
            reduce(small_state(), Action::SetPolicy(LayoutPolicy::Condition2));
        assert!(outcome.is_rejected());
        assert_eq!(state.policy(), LayoutPolicy::Auto);
        assert_eq!(state.generation(), 1);

        let Transition { state, .. } = reduce(state, Action::SetRowCount(rows(4)));
        let Transition { state, outcome } =
            reduce(state, Action::SetPolicy(LayoutPolicy::Condition2));
        assert_eq!(outcome.kind(), "regenerated");
        assert_eq!(state.policy(), LayoutPolicy::Condition2);
    }

    #[test]
    fn shrinking_rows_reverts_policy_to_auto() {
        let state =
            SeatingState::new(PartCounts::new(2, 2, 1, 1), rows(4), LayoutPolicy::Condition2)
                .unwrap();
        let Transition { state, outcome } = reduce(state, Action::SetRowCount(rows(2)));
        assert_eq!(outcome.kind(), "regenerated");
        assert_eq!(state.policy(), LayoutPolicy::Auto);
        assert_eq!(
            state.grid().names(),
            vec![
                vec![Some("A1"), Some("S1"), Some("T1")],
                vec![Some("A2"), Some("S2"), Some("B1")],
            ]
        );
    }

    #[test]
    fn swap_preserves_identities() {
        let state = small_state();
        let a = Coord::new(0, 0);
        let b = Coord::new(2, 1);
        let alto = state.grid().member_at(a).unwrap().id();
        let tenor = state.grid().member_at(b).unwrap().id();

        let Transition { state, outcome } = reduce(state, Action::Swap { a, b });
        assert!(matches!(outcome, Outcome::Swapped { .. }));
        assert_eq!(state.grid().member_at(a).unwrap().id(), tenor);
        assert_eq!(state.grid().member_at(b).unwrap().id(), alto);
        assert_eq!(state.generation(), 1);
    }

    #[test]
    fn swap_out_of_bounds_is_rejected() {
        let state = small_state();
        let before = state.grid().clone();
        let Transition { state, outcome } = reduce(
            state,
            Action::Swap {
                a: Coord::new(0, 0),
                b: Coord::new(0, 9),
            },
        );
        assert!(matches!(
            outcome,
            Outcome::Rejected(SeatingError::OutOfBounds { .. })
        ));
        assert_eq!(state.grid(), &before);
    }

    #[test]
    fn drag_round_trip_swaps() {
        let source = Coord::new(0, 1);
        let target = Coord::new(1, 0);
        let Transition { state, outcome } = reduce(small_state(), Action::BeginDrag(source));
        assert!(matches!(outcome, Outcome::DragStarted(_)));
        assert_eq!(state.drag().map(|d| d.source), Some(source));

        let Transition { state, outcome } =
            reduce(state, Action::CompleteDrag { source, target });
        assert!(matches!(outcome, Outcome::Swapped { .. }));
        assert!(state.drag().is_none());
        assert_eq!(state.grid().names()[0][1], Some("A2"));
        assert_eq!(state.grid().names()[1][0], Some("S1"));
    }

    #[test]
    fn regeneration_invalidates_drag() {
        let source = Coord::new(2, 1);
        let Transition { state, .. } = reduce(small_state(), Action::BeginDrag(source));
        let Transition { state, .. } = reduce(state, Action::SetRowCount(rows(1)));
        assert!(state.drag().is_none());

        let before = state.grid().clone();
        let Transition { state, outcome } = reduce(
            state,
            Action::CompleteDrag {
                source,
                target: Coord::new(0, 0),
            },
        );
        assert!(matches!(
            outcome,
            Outcome::Rejected(SeatingError::NoDragInProgress)
        ));
        assert_eq!(state.grid(), &before);
    }

    #[test]
    fn mismatched_source_is_stale() {
        let Transition { state, .. } = reduce(small_state(), Action::BeginDrag(Coord::new(0, 0)));
        let Transition { state, outcome } = reduce(
            state,
            Action::CompleteDrag {
                source: Coord::new(1, 1),
                target: Coord::new(0, 0),
            },
        );
        assert!(matches!(outcome, Outcome::Rejected(SeatingError::StaleDrag)));
        assert!(state.drag().is_none());
    }

    #[test]
    fn drop_outside_keeps_drag_alive() {
        let source = Coord::new(0, 0);
        let Transition { state, .. } = reduce(small_state(), Action::BeginDrag(source));
        let Transition { state, outcome } = reduce(
            state,
            Action::CompleteDrag {
                source,
                target: Coord::new(5, 5),
            },
        );
        assert!(outcome.is_rejected());
        assert!(state.drag().is_some());

        let Transition { state, outcome } = reduce(state, Action::CancelDrag);
        assert!(matches!(outcome, Outcome::DragCancelled));
        assert!(state.drag().is_none());
    }

    #[test]
    fn begin_drag_out_of_bounds_is_rejected() {
        let Transition { state, outcome } =
            reduce(small_state(), Action::BeginDrag(Coord::new(3, 0)));
        assert!(outcome.is_rejected());
        assert!(state.drag().is_none());
    }
}
