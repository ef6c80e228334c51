use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use super::pattern::Pattern;

/// Which roll series column a candidate was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Series {
    SeriesA,
    SeriesB,
}

impl Series {
    pub fn label(self) -> &'static str {
        match self {
            Series::SeriesA => "series-1",
            Series::SeriesB => "series-2",
        }
    }
}

/// One row of the roll list: up to two candidate values sharing a source id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidatePair {
    #[serde(default)]
    pub s1: Option<String>,
    #[serde(default)]
    pub s2: Option<String>,
    #[serde(default)]
    pub id: u64,
}

impl CandidatePair {
    pub fn new(s1: &str, s2: &str, id: u64) -> Self {
        CandidatePair {
            s1: Some(s1.to_string()),
            s2: Some(s2.to_string()),
            id,
        }
    }

    /// A pair carrying a single value, as produced from flat rosters
    pub fn single(value: &str, id: u64) -> Self {
        CandidatePair {
            s1: Some(value.to_string()),
            s2: None,
            id,
        }
    }
}

/// Converts a flat roster into single-valued pairs with sequential ids starting at `first_id`
pub fn pairs_from_roster<I, S>(values: I, first_id: u64) -> Vec<CandidatePair>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| CandidatePair::single(v.as_ref(), first_id + i as u64))
        .collect()
}

/// A queued exam candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Roll number and branch label, e.g. `"21CSE0441 CSE"`
    pub value: String,
    pub origin: Series,
    pub source_id: u64,
}

impl Candidate {
    pub fn roll_branch(&self) -> RollBranch {
        RollBranch::parse(&self.value)
    }

    pub fn branch(&self) -> String {
        self.roll_branch().branch
    }
}

/// The two halves of a candidate value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollBranch {
    pub roll: String,
    pub branch: String,
}

impl RollBranch {
    /// First whitespace-delimited token is the roll, the rest (possibly several words) is the
    /// branch. Empty input gives two empty strings.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.split_once(char::is_whitespace) {
            Some((roll, branch)) => RollBranch {
                roll: roll.to_string(),
                branch: branch.trim_start().to_string(),
            },
            None => RollBranch {
                roll: trimmed.to_string(),
                branch: String::new(),
            },
        }
    }
}

/// Largest desk grid the allocator builds for a single room
pub const MAX_ROOM_DESKS: usize = 10_000;

/// Desk count of a `rows` x `cols` grid. `None` when a side is non-positive or the
/// product does not fit.
pub fn room_desks(rows: i64, cols: i64) -> Option<usize> {
    if rows <= 0 || cols <= 0 {
        return None;
    }
    rows.checked_mul(cols).and_then(|n| usize::try_from(n).ok())
}

/// A room as supplied by the ingestion layer. Rows and columns may be non-positive or
/// absurdly large; such rooms simply hold nobody.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomDescriptor {
    pub name: String,
    pub rows: i64,
    pub cols: i64,
    #[serde(default)]
    pub college: String,
    #[serde(default)]
    pub exam: String,
}

impl RoomDescriptor {
    pub fn new(name: &str, rows: i64, cols: i64) -> Self {
        RoomDescriptor {
            name: name.to_string(),
            rows,
            cols,
            college: String::new(),
            exam: String::new(),
        }
    }

    /// Desks in the room, `None` for non-positive sides or grids above [`MAX_ROOM_DESKS`]
    pub fn desk_count(&self) -> Option<usize> {
        room_desks(self.rows, self.cols).filter(|n| *n <= MAX_ROOM_DESKS)
    }

    pub fn has_valid_geometry(&self) -> bool {
        self.desk_count().is_some()
    }

    /// Grid dimensions, zero for invalid geometry
    pub fn dimensions(&self) -> (usize, usize) {
        if self.has_valid_geometry() {
            (self.rows as usize, self.cols as usize)
        } else {
            (0, 0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// One step of a traversal: a desk and how many candidates it takes on this visit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatSlot {
    pub row: usize,
    pub col: usize,
    pub capacity: u8,
    /// Forced side; `None` fills left first
    pub side: Option<Side>,
}

impl SeatSlot {
    pub fn pair(row: usize, col: usize) -> Self {
        SeatSlot { row, col, capacity: 2, side: None }
    }

    pub fn single(row: usize, col: usize) -> Self {
        SeatSlot { row, col, capacity: 1, side: None }
    }

    pub fn forced(row: usize, col: usize, side: Side) -> Self {
        SeatSlot { row, col, capacity: 1, side: Some(side) }
    }
}

/// A two-seat bench
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Desk {
    pub left: Option<Candidate>,
    pub right: Option<Candidate>,
}

impl Desk {
    pub fn empty() -> Self {
        Desk::default()
    }

    pub fn new(left: Option<Candidate>, right: Option<Candidate>) -> Self {
        Desk { left, right }
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn occupants(&self) -> impl Iterator<Item = (Side, &Candidate)> {
        self.left
            .iter()
            .map(|c| (Side::Left, c))
            .chain(self.right.iter().map(|c| (Side::Right, c)))
    }
}

/// Branch label -> number of seated candidates
pub type BranchSummary = BTreeMap<String, usize>;

/// Seating outcome for a single room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomResult {
    pub room: RoomDescriptor,
    pub grid: Vec<Vec<Desk>>,
    pub assigned_count: usize,
    pub summary: BranchSummary,
}

impl RoomResult {
    pub fn desk(&self, row: usize, col: usize) -> Option<&Desk> {
        self.grid.get(row).and_then(|r| r.get(col))
    }

    /// Seated candidates with their coordinates, row-major
    pub fn seated(&self) -> impl Iterator<Item = (usize, usize, Side, &Candidate)> {
        self.grid.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .flat_map(move |(c, desk)| desk.occupants().map(move |(side, cand)| (r, c, side, cand)))
        })
    }
}

/// Non-fatal irregularities noticed while allocating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AllocationNotice {
    InvalidRoomGeometry { room: String, rows: i64, cols: i64 },
    UnknownPattern { name: String },
    DuplicateRoom { room: String },
}

/// Full outcome of one allocation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub pattern: Pattern,
    pub rooms: Vec<RoomResult>,
    pub unallocated: Vec<Candidate>,
    pub notices: Vec<AllocationNotice>,
}

impl AllocationResult {
    pub fn room(&self, name: &str) -> Option<&RoomResult> {
        self.rooms.iter().find(|r| r.room.name == name)
    }

    /// Number of students seated in a room; unknown rooms count as empty
    pub fn students_in(&self, name: &str) -> usize {
        self.room(name).map(|r| r.assigned_count).unwrap_or(0)
    }

    pub fn summary_for(&self, name: &str) -> BranchSummary {
        self.room(name).map(|r| r.summary.clone()).unwrap_or_default()
    }

    pub fn total_assigned(&self) -> usize {
        self.rooms.iter().map(|r| r.assigned_count).sum()
    }

    pub fn total_candidates(&self) -> usize {
        self.total_assigned() + self.unallocated.len()
    }
}
