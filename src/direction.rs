//! Compass directions for the 8-connected tile grid
//!
//! Order matches the leg layout of a junction: N, NE, E, SE, S, SW, W, NW.
//! Turning is done in eighths of a circle: +1 veers right, -1 veers left,
//! +2 is a right angle, 4 reverses.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of compass directions (legs per junction)
pub const NUM_DIRECTIONS: usize = 8;

/// Relative turns, in eighths of a circle
pub const AHEAD: i32 = 0;
pub const VEER_RIGHT: i32 = 1;
pub const RIGHT: i32 = 2;
pub const BACK: i32 = 4;
pub const LEFT: i32 = -2;
pub const VEER_LEFT: i32 = -1;

/// One of the 8 compass headings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; NUM_DIRECTIONS] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Direction offsets (dx, dy); y grows southward
    const OFFSETS: [(i32, i32); NUM_DIRECTIONS] = [
        (0, -1),  // N
        (1, -1),  // NE
        (1, 0),   // E
        (1, 1),   // SE
        (0, 1),   // S
        (-1, 1),  // SW
        (-1, 0),  // W
        (-1, -1), // NW
    ];

    const NAMES: [&'static str; NUM_DIRECTIONS] = [
        "north", "northeast", "east", "southeast",
        "south", "southwest", "west", "northwest",
    ];

    const ABBREVIATIONS: [&'static str; NUM_DIRECTIONS] = [
        "N", "NE", "E", "SE", "S", "SW", "W", "NW",
    ];

    /// Leg index, 0 (north) through 7 (northwest)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Direction for any index, wrapping around the compass
    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.rem_euclid(NUM_DIRECTIONS as i32) as usize]
    }

    /// Global direction after turning `eighths` from this heading
    pub fn turned(self, eighths: i32) -> Self {
        Self::from_index(self.index() as i32 + eighths)
    }

    pub fn reverse(self) -> Self {
        self.turned(BACK)
    }

    /// True for NE, SE, SW, NW
    pub fn is_diagonal(self) -> bool {
        self.index() % 2 != 0
    }

    pub fn is_cardinal(self) -> bool {
        !self.is_diagonal()
    }

    /// (dx, dy) of one step in this direction
    pub fn offset(self) -> (i32, i32) {
        Self::OFFSETS[self.index()]
    }

    /// Angle between two headings in eighths, 0..=4
    pub fn eighths_between(self, other: Direction) -> u32 {
        let diff = (self.index() as i32 - other.index() as i32).rem_euclid(NUM_DIRECTIONS as i32);
        diff.min(NUM_DIRECTIONS as i32 - diff) as u32
    }

    /// Direction of a single step from `(dx, dy)`, or None if not a unit step
    pub fn from_offset(dx: i32, dy: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.offset() == (dx, dy))
    }

    pub fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }

    pub fn abbreviation(self) -> &'static str {
        Self::ABBREVIATIONS[self.index()]
    }

    /// Parse only north, east, south or west (full name or abbreviation)
    pub fn parse_cardinal(s: &str) -> Option<Self> {
        s.parse::<Direction>().ok().filter(|d| d.is_cardinal())
    }

    /// Random heading at a 45 degree multiple
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..NUM_DIRECTIONS)]
    }

    /// Random heading at a 90 degree multiple
    pub fn random_cardinal(rng: &mut impl Rng) -> Self {
        Self::CARDINALS[rng.gen_range(0..Self::CARDINALS.len())]
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Returned when a string names no compass direction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseDirectionError(pub String);

impl fmt::Display for ParseDirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a compass direction", self.0)
    }
}

impl std::error::Error for ParseDirectionError {}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|d| s.eq_ignore_ascii_case(d.name()) || s.eq_ignore_ascii_case(d.abbreviation()))
            .ok_or_else(|| ParseDirectionError(s.to_string()))
    }
}
