use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeatingError};

/// Largest row count a grid may have.
pub const MAX_ROWS: usize = 99;

/// Named rule deciding which rows each voice group is dealt into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutPolicy {
    /// Infer the split from the row count.
    #[default]
    Auto,
    /// Upper voices on rows 0-1, lower voices on row 2.
    Condition1,
    /// Upper voices on rows 0-2, lower voices on row 3.
    Condition2,
}

impl LayoutPolicy {
    pub const ALL: [LayoutPolicy; 3] = [
        LayoutPolicy::Auto,
        LayoutPolicy::Condition1,
        LayoutPolicy::Condition2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutPolicy::Auto => "auto",
            LayoutPolicy::Condition1 => "condition1",
            LayoutPolicy::Condition2 => "condition2",
        }
    }

    /// Smallest row count the policy can address.
    pub fn min_rows(self) -> usize {
        match self {
            LayoutPolicy::Auto => 1,
            LayoutPolicy::Condition1 => 3,
            LayoutPolicy::Condition2 => 4,
        }
    }

    pub fn is_available(self, rows: usize) -> bool {
        rows >= self.min_rows()
    }

    /// Resolve the row targets for a grid of `rows` rows.
    pub fn placement(self, rows: NonZeroUsize) -> Result<Placement> {
        let rows = rows.get();
        if !self.is_available(rows) {
            return Err(SeatingError::PolicyUnavailable {
                policy: self,
                rows,
                required: self.min_rows(),
            });
        }

        let placement = match self {
            LayoutPolicy::Condition1 => Placement::split(0..2, 2),
            LayoutPolicy::Condition2 => Placement::split(0..3, 3),
            LayoutPolicy::Auto if rows == 3 => Placement::split(0..2, 2),
            LayoutPolicy::Auto if rows >= 4 => Placement::split(0..rows - 1, rows - 1),
            LayoutPolicy::Auto => Placement::Combined((0..rows).collect()),
        };
        Ok(placement)
    }
}

impl fmt::Display for LayoutPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutPolicy {
    type Err = SeatingError;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        LayoutPolicy::ALL
            .into_iter()
            .find(|policy| policy.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| SeatingError::UnknownPolicy(trimmed.to_string()))
    }
}

/// Row targets resolved from a policy and a row count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Altos then sopranos dealt over `upper`; basses then tenors over `lower`.
    Split { upper: Vec<usize>, lower: Vec<usize> },
    /// Altos, sopranos, tenors, basses dealt as one stream over every row.
    Combined(Vec<usize>),
}

impl Placement {
    fn split(upper: std::ops::Range<usize>, lower: usize) -> Self {
        Placement::Split {
            upper: upper.collect(),
            lower: vec![lower],
        }
    }
}

/// Every policy paired with whether it can be selected at `rows` rows.
pub fn policy_options(rows: usize) -> Vec<(LayoutPolicy, bool)> {
    LayoutPolicy::ALL
        .into_iter()
        .map(|policy| (policy, policy.is_available(rows)))
        .collect()
}
