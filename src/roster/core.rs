use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest head count a single part may hold.
pub const MAX_PER_PART: u32 = 999;

/// Vocal part a choir member sings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Part {
    Soprano,
    Alto,
    Tenor,
    Bass,
}

impl Part {
    /// Every part in display order.
    pub const ALL: [Part; 4] = [Part::Soprano, Part::Alto, Part::Tenor, Part::Bass];

    /// Single-letter prefix used in member names.
    pub fn code(self) -> char {
        match self {
            Part::Soprano => 'S',
            Part::Alto => 'A',
            Part::Tenor => 'T',
            Part::Bass => 'B',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Part::Soprano => "Soprano",
            Part::Alto => "Alto",
            Part::Tenor => "Tenor",
            Part::Bass => "Bass",
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Opaque member identity. Never reused within one allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(u64);

impl MemberId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Hands out fresh [`MemberId`]s. Carried across generations so that a
/// regenerated roster never shares identities with the one it replaces.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> MemberId {
        let id = MemberId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }

    /// Number of identities handed out so far.
    pub fn issued(&self) -> u64 {
        self.next
    }
}

/// A seated choir member. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    id: MemberId,
    name: String,
    part: Part,
}

impl Member {
    fn new(id: MemberId, part: Part, ordinal: u32) -> Self {
        Self {
            id,
            name: format!("{}{}", part.code(), ordinal),
            part,
        }
    }

    pub fn id(&self) -> MemberId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn part(&self) -> Part {
        self.part
    }
}

/// Requested head count per part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartCounts {
    pub soprano: u32,
    pub alto: u32,
    pub tenor: u32,
    pub bass: u32,
}

impl Default for PartCounts {
    fn default() -> Self {
        Self {
            soprano: 10,
            alto: 10,
            tenor: 5,
            bass: 5,
        }
    }
}

impl PartCounts {
    pub const fn new(soprano: u32, alto: u32, tenor: u32, bass: u32) -> Self {
        Self {
            soprano,
            alto,
            tenor,
            bass,
        }
    }

    pub const fn zero() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub fn get(&self, part: Part) -> u32 {
        match part {
            Part::Soprano => self.soprano,
            Part::Alto => self.alto,
            Part::Tenor => self.tenor,
            Part::Bass => self.bass,
        }
    }

    pub fn set(&mut self, part: Part, count: u32) {
        match part {
            Part::Soprano => self.soprano = count,
            Part::Alto => self.alto = count,
            Part::Tenor => self.tenor = count,
            Part::Bass => self.bass = count,
        }
    }

    pub fn with(mut self, part: Part, count: u32) -> Self {
        self.set(part, count);
        self
    }

    /// Total members across all parts.
    pub fn total(&self) -> u64 {
        Part::ALL.iter().map(|part| self.get(*part) as u64).sum()
    }
}

/// Four ordered member lists, one per part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub(crate) soprano: Vec<Member>,
    pub(crate) alto: Vec<Member>,
    pub(crate) tenor: Vec<Member>,
    pub(crate) bass: Vec<Member>,
}

impl Roster {
    /// Build a roster for `counts`, drawing identities from `ids`.
    ///
    /// Names are `{code}{n}` with `n` running 1..=count per part. A zero count
    /// produces an empty list.
    pub fn generate(counts: &PartCounts, ids: &mut IdAllocator) -> Self {
        let mut section = |part: Part| -> Vec<Member> {
            (1..=counts.get(part))
                .map(|ordinal| Member::new(ids.allocate(), part, ordinal))
                .collect()
        };

        Self {
            soprano: section(Part::Soprano),
            alto: section(Part::Alto),
            tenor: section(Part::Tenor),
            bass: section(Part::Bass),
        }
    }

    pub fn part(&self, part: Part) -> &[Member] {
        match part {
            Part::Soprano => &self.soprano,
            Part::Alto => &self.alto,
            Part::Tenor => &self.tenor,
            Part::Bass => &self.bass,
        }
    }

    pub fn len(&self) -> usize {
        self.soprano.len() + self.alto.len() + self.tenor.len() + self.bass.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
