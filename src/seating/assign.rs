use std::num::NonZeroUsize;

use crate::error::Result;
use crate::roster::{Member, Roster};

use super::grid::Grid;
use super::policy::{LayoutPolicy, Placement};

/// Deal a roster into `rows` rows according to `policy` and center the result.
///
/// Upper voices are altos followed by sopranos, lower voices basses followed
/// by tenors. Within a stream the i-th member lands on
/// `targets[i % targets.len()]`, so consecutive members alternate rows.
pub fn assign(roster: Roster, rows: NonZeroUsize, policy: LayoutPolicy) -> Result<Grid> {
    let placement = policy.placement(rows)?;
    let Roster {
        soprano,
        alto,
        tenor,
        bass,
    } = roster;

    let mut dealt: Vec<Vec<Member>> = vec![Vec::new(); rows.get()];
    match placement {
        Placement::Split { upper, lower } => {
            deal(alto.into_iter().chain(soprano), &upper, &mut dealt);
            deal(bass.into_iter().chain(tenor), &lower, &mut dealt);
        }
        Placement::Combined(targets) => {
            let stream = alto.into_iter().chain(soprano).chain(tenor).chain(bass);
            deal(stream, &targets, &mut dealt);
        }
    }

    Ok(Grid::centered(dealt))
}

fn deal(stream: impl Iterator<Item = Member>, targets: &[usize], rows: &mut [Vec<Member>]) {
    for (position, member) in stream.enumerate() {
        rows[targets[position % targets.len()]].push(member);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{IdAllocator, Part, PartCounts};

    fn rows(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn grid_for(counts: PartCounts, row_count: usize, policy: LayoutPolicy) -> Grid {
        let mut ids = IdAllocator::new();
        let roster = Roster::generate(&counts, &mut ids);
        assign(roster, rows(row_count), policy).unwrap()
    }

    #[test]
    fn three_rows_split_upper_and_lower_voices() {
        let grid = grid_for(PartCounts::new(2, 2, 1, 1), 3, LayoutPolicy::Auto);
        assert_eq!(
            grid.names(),
            vec![
                vec![Some("A1"), Some("S1")],
                vec![Some("A2"), Some("S2")],
                vec![Some("B1"), Some("T1")],
            ]
        );
    }

    #[test]
    fn two_rows_deal_one_combined_stream() {
        let grid = grid_for(PartCounts::new(1, 1, 1, 1), 2, LayoutPolicy::Auto);
        assert_eq!(
            grid.names(),
            vec![
                vec![Some("A1"), Some("T1")],
                vec![Some("S1"), Some("B1")],
            ]
        );
    }

    #[test]
    fn zero_members_give_empty_rows() {
        let grid = grid_for(PartCounts::zero(), 3, LayoutPolicy::Auto);
        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.width(), 0);
        assert_eq!(grid.seated(), 0);
    }

    #[test]
    fn short_rows_are_centered() {
        let grid = grid_for(PartCounts::default(), 3, LayoutPolicy::Auto);
        // 20 upper voices over two rows, 10 lower voices on one.
        assert_eq!(grid.width(), 10);
        assert_eq!(grid.seated(), 30);
        assert!(grid.rows()[2].iter().all(Option::is_some));

        let grid = grid_for(PartCounts::new(4, 4, 1, 1), 3, LayoutPolicy::Auto);
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.names()[2], vec![None, Some("B1"), Some("T1"), None]);
    }

    #[test]
    fn auto_with_many_rows_spreads_upper_voices() {
        let grid = grid_for(PartCounts::new(2, 3, 1, 1), 5, LayoutPolicy::Auto);
        let names = grid.names();
        assert_eq!(grid.row_count(), 5);
        assert_eq!(grid.width(), 2);
        assert_eq!(names[0], vec![Some("A1"), Some("S2")]);
        assert_eq!(names[1], vec![Some("A2"), None]);
        assert_eq!(names[2], vec![Some("A3"), None]);
        assert_eq!(names[3], vec![Some("S1"), None]);
        assert_eq!(names[4], vec![Some("B1"), Some("T1")]);
    }

    #[test]
    fn condition2_leaves_extra_rows_empty() {
        let grid = grid_for(PartCounts::new(3, 3, 2, 2), 6, LayoutPolicy::Condition2);
        assert_eq!(grid.row_count(), 6);
        assert_eq!(grid.width(), 4);
        assert!(grid.rows()[4].iter().all(Option::is_none));
        assert!(grid.rows()[5].iter().all(Option::is_none));
        assert_eq!(
            grid.names()[3],
            vec![Some("B1"), Some("B2"), Some("T1"), Some("T2")]
        );
    }

    #[test]
    fn incompatible_policy_is_an_error() {
        let mut ids = IdAllocator::new();
        let roster = Roster::generate(&PartCounts::default(), &mut ids);
        assert!(assign(roster, rows(3), LayoutPolicy::Condition2).is_err());
    }

    #[test]
    fn shape_is_deterministic_modulo_identity() {
        let counts = PartCounts::new(7, 5, 3, 4);
        let mut ids = IdAllocator::new();
        let first = Roster::generate(&counts, &mut ids);
        let second = Roster::generate(&counts, &mut ids);
        let first = assign(first, rows(4), LayoutPolicy::Auto).unwrap();
        let second = assign(second, rows(4), LayoutPolicy::Auto).unwrap();

        assert_eq!(first.part_layout(), second.part_layout());
        assert_eq!(first.names(), second.names());
        assert_ne!(first, second);
    }

    #[test]
    fn every_configuration_is_rectangular_and_complete() {
        let samples = [
            PartCounts::zero(),
            PartCounts::new(1, 0, 0, 0),
            PartCounts::new(0, 0, 0, 3),
            PartCounts::new(2, 2, 1, 1),
            PartCounts::new(9, 4, 6, 1),
            PartCounts::default(),
        ];
        for counts in samples {
            for row_count in 1..=7 {
                for policy in LayoutPolicy::ALL {
                    if !policy.is_available(row_count) {
                        continue;
                    }
                    let grid = grid_for(counts, row_count, policy);
                    assert_eq!(grid.row_count(), row_count);
                    let width = grid.width();
                    assert!(grid.rows().iter().all(|row| row.len() == width));
                    assert_eq!(grid.seated() as u64, counts.total());
                    for part in Part::ALL {
                        let seated = grid
                            .part_layout()
                            .iter()
                            .flatten()
                            .filter(|cell| **cell == Some(part))
                            .count();
                        assert_eq!(seated as u32, counts.get(part));
                    }
                }
            }
        }
    }
}
