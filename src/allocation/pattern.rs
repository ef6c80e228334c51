use std::fmt;
use serde::{Serialize, Deserialize};

use super::types::{room_desks, SeatSlot, Side, MAX_ROOM_DESKS};

/// Traversal policy deciding seat-fill order and per-desk capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pattern {
    /// Row-major, left to right, two per desk
    #[default]
    Standard,
    /// Row-major with odd rows reversed
    Snake,
    /// Column-major, top to bottom
    Columnar,
    /// Column-major with odd columns reversed
    SnakeVertical,
    /// Only desks where row + col is even
    Checkerboard,
    /// One candidate per desk
    Single,
    /// Even rows take two, odd rows take one
    AlternateRows,
    /// Column-major; even columns take two, odd columns take one
    Hybrid,
    /// One per desk, left side on even rows and right side on odd rows
    Staggered,
}

impl Pattern {
    pub const ALL: [Pattern; 9] = [
        Pattern::Standard,
        Pattern::Snake,
        Pattern::Columnar,
        Pattern::SnakeVertical,
        Pattern::Checkerboard,
        Pattern::Single,
        Pattern::AlternateRows,
        Pattern::Hybrid,
        Pattern::Staggered,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Pattern::Standard => "standard",
            Pattern::Snake => "snake",
            Pattern::Columnar => "columnar",
            Pattern::SnakeVertical => "snake-vertical",
            Pattern::Checkerboard => "checkerboard",
            Pattern::Single => "single",
            Pattern::AlternateRows => "alternate-rows",
            Pattern::Hybrid => "hybrid",
            Pattern::Staggered => "staggered",
        }
    }

    /// Looks up a pattern by name, ignoring case and surrounding whitespace
    pub fn from_name(name: &str) -> Option<Pattern> {
        let wanted = name.trim().to_lowercase();
        Pattern::ALL.iter().copied().find(|p| p.name() == wanted)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Row-major desk coordinates, optionally reversing odd rows
fn row_major(rows: usize, cols: usize, snake: bool) -> Vec<(usize, usize)> {
    let mut coords = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        if snake && r % 2 == 1 {
            coords.extend((0..cols).rev().map(|c| (r, c)));
        } else {
            coords.extend((0..cols).map(|c| (r, c)));
        }
    }
    coords
}

/// Column-major desk coordinates, optionally reversing odd columns
fn column_major(rows: usize, cols: usize, snake: bool) -> Vec<(usize, usize)> {
    let mut coords = Vec::with_capacity(rows * cols);
    for c in 0..cols {
        if snake && c % 2 == 1 {
            coords.extend((0..rows).rev().map(|r| (r, c)));
        } else {
            coords.extend((0..rows).map(|r| (r, c)));
        }
    }
    coords
}

/// Produces the ordered seat slots for a room. The order returned here is the order
/// candidates are seated in. Non-positive or oversized dimensions give no slots.
pub fn seat_slots(rows: i64, cols: i64, pattern: Pattern) -> Vec<SeatSlot> {
    match room_desks(rows, cols) {
        Some(n) if n <= MAX_ROOM_DESKS => {}
        _ => return Vec::new(),
    }
    let (rows, cols) = (rows as usize, cols as usize);

    match pattern {
        Pattern::Standard => row_major(rows, cols, false)
            .into_iter()
            .map(|(r, c)| SeatSlot::pair(r, c))
            .collect(),
        Pattern::Snake => row_major(rows, cols, true)
            .into_iter()
            .map(|(r, c)| SeatSlot::pair(r, c))
            .collect(),
        Pattern::Columnar => column_major(rows, cols, false)
            .into_iter()
            .map(|(r, c)| SeatSlot::pair(r, c))
            .collect(),
        Pattern::SnakeVertical => column_major(rows, cols, true)
            .into_iter()
            .map(|(r, c)| SeatSlot::pair(r, c))
            .collect(),
        Pattern::Checkerboard => row_major(rows, cols, false)
            .into_iter()
            .filter(|(r, c)| (r + c) % 2 == 0)
            .map(|(r, c)| SeatSlot::pair(r, c))
            .collect(),
        Pattern::Single => row_major(rows, cols, false)
            .into_iter()
            .map(|(r, c)| SeatSlot::single(r, c))
            .collect(),
        Pattern::AlternateRows => row_major(rows, cols, false)
            .into_iter()
            .map(|(r, c)| if r % 2 == 0 { SeatSlot::pair(r, c) } else { SeatSlot::single(r, c) })
            .collect(),
        Pattern::Hybrid => column_major(rows, cols, false)
            .into_iter()
            .map(|(r, c)| if c % 2 == 0 { SeatSlot::pair(r, c) } else { SeatSlot::single(r, c) })
            .collect(),
        Pattern::Staggered => row_major(rows, cols, false)
            .into_iter()
            .map(|(r, c)| {
                let side = if r % 2 == 0 { Side::Left } else { Side::Right };
                SeatSlot::forced(r, c, side)
            })
            .collect(),
    }
}

/// Total number of candidates a room can take under a pattern
pub fn pattern_capacity(rows: i64, cols: i64, pattern: Pattern) -> usize {
    seat_slots(rows, cols, pattern)
        .iter()
        .map(|s| s.capacity as usize)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(slots: &[SeatSlot]) -> Vec<(usize, usize)> {
        slots.iter().map(|s| (s.row, s.col)).collect()
    }

    #[test]
    fn test_pattern_names_round_trip() {
        for p in Pattern::ALL {
            assert_eq!(Pattern::from_name(p.name()), Some(p));
        }
        assert_eq!(Pattern::from_name("  Snake-Vertical "), Some(Pattern::SnakeVertical));
        assert_eq!(Pattern::from_name("zigzag"), None);
    }

    #[test]
    fn test_standard_is_row_major() {
        let slots = seat_slots(2, 3, Pattern::Standard);
        assert_eq!(coords(&slots), vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
        assert!(slots.iter().all(|s| s.capacity == 2 && s.side.is_none()));
    }

    #[test]
    fn test_snake_reverses_odd_rows() {
        let slots = seat_slots(3, 2, Pattern::Snake);
        assert_eq!(coords(&slots), vec![(0, 0), (0, 1), (1, 1), (1, 0), (2, 0), (2, 1)]);
    }

    #[test]
    fn test_columnar_and_snake_vertical() {
        let slots = seat_slots(2, 2, Pattern::Columnar);
        assert_eq!(coords(&slots), vec![(0, 0), (1, 0), (0, 1), (1, 1)]);

        let slots = seat_slots(3, 2, Pattern::SnakeVertical);
        assert_eq!(coords(&slots), vec![(0, 0), (1, 0), (2, 0), (2, 1), (1, 1), (0, 1)]);
    }

    #[test]
    fn test_checkerboard_skips_odd_parity() {
        let slots = seat_slots(2, 2, Pattern::Checkerboard);
        assert_eq!(coords(&slots), vec![(0, 0), (1, 1)]);
        assert_eq!(pattern_capacity(2, 2, Pattern::Checkerboard), 4);
    }

    #[test]
    fn test_mixed_capacity_patterns() {
        let alt = seat_slots(2, 2, Pattern::AlternateRows);
        let caps: Vec<u8> = alt.iter().map(|s| s.capacity).collect();
        assert_eq!(caps, vec![2, 2, 1, 1]);

        let hybrid = seat_slots(2, 2, Pattern::Hybrid);
        assert_eq!(coords(&hybrid), vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
        let caps: Vec<u8> = hybrid.iter().map(|s| s.capacity).collect();
        assert_eq!(caps, vec![2, 2, 1, 1]);

        assert_eq!(pattern_capacity(3, 3, Pattern::Single), 9);
    }

    #[test]
    fn test_staggered_forces_sides() {
        let slots = seat_slots(2, 2, Pattern::Staggered);
        let sides: Vec<Option<Side>> = slots.iter().map(|s| s.side).collect();
        assert_eq!(
            sides,
            vec![Some(Side::Left), Some(Side::Left), Some(Side::Right), Some(Side::Right)]
        );
        assert!(slots.iter().all(|s| s.capacity == 1));
    }

    #[test]
    fn test_non_positive_geometry_has_no_slots() {
        assert!(seat_slots(0, 5, Pattern::Standard).is_empty());
        assert!(seat_slots(4, -2, Pattern::Snake).is_empty());
        assert_eq!(pattern_capacity(-1, -1, Pattern::Hybrid), 0);
    }

    #[test]
    fn test_oversized_geometry_has_no_slots() {
        assert!(seat_slots(i64::MAX, 2, Pattern::Standard).is_empty());
        assert!(seat_slots(4_294_967_296, 4_294_967_296, Pattern::Snake).is_empty());
        assert_eq!(seat_slots(1, MAX_ROOM_DESKS as i64, Pattern::Single).len(), MAX_ROOM_DESKS);
    }
}
