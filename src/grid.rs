//! Tile-level data: coordinates, terrain and the per-tile road junction

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::junction::Junction;
use crate::town::TownId;

/// Position of a tile; x grows east, y grows south
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: usize,
    pub y: usize,
}

impl TileCoord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Neighbor one step toward `dir`, or None if it would go below zero.
    /// The upper bound is the grid's business.
    pub fn step(self, dir: Direction) -> Option<TileCoord> {
        let (dx, dy) = dir.offset();
        let x = self.x.checked_add_signed(dx as isize)?;
        let y = self.y.checked_add_signed(dy as isize)?;
        Some(TileCoord { x, y })
    }

    /// Direction from this tile to an adjacent one; None if not adjacent
    pub fn direction_to(self, other: TileCoord) -> Option<Direction> {
        let dx = other.x as i64 - self.x as i64;
        let dy = other.y as i64 - self.y as i64;
        if dx.abs() > 1 || dy.abs() > 1 {
            return None;
        }
        Direction::from_offset(dx as i32, dy as i32)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Water,
    Land,
}

/// How a water tile's corner should be drawn. The named corner is the one
/// that stays water; the opposite half is shaded as land.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayHint {
    #[default]
    None,
    WaterNorthWest,
    WaterNorthEast,
    WaterSouthEast,
    WaterSouthWest,
}

/// One grid cell
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tile {
    pub terrain: Terrain,
    /// Owning town; only meaningful on land
    pub town: Option<TownId>,
    /// Scratch flag for region growth passes
    pub marked: bool,
    pub display_hint: DisplayHint,
    /// Present once anything road-related was written here
    pub junction: Option<Junction>,
}

impl Tile {
    pub fn is_water(&self) -> bool {
        self.terrain == Terrain::Water
    }

    pub fn is_land(&self) -> bool {
        self.terrain == Terrain::Land
    }

    /// Owning town, or None for water and unclaimed land
    pub fn town(&self) -> Option<TownId> {
        if self.is_water() {
            None
        } else {
            self.town
        }
    }

    /// Unclaimed land not already touched in this growth pass
    pub fn ok_for_town(&self) -> bool {
        self.is_land() && !self.marked && self.town.is_none()
    }

    /// Owned land that was claimed before this growth pass
    pub fn has_real_town(&self) -> bool {
        !self.marked && self.town().is_some()
    }

    /// Claim for `town` (possibly none) and mark as visited this pass
    pub fn set_town_and_mark(&mut self, town: Option<TownId>) {
        self.town = town;
        self.marked = true;
    }

    pub fn junction_or_empty(&self) -> &Junction {
        self.junction.as_ref().unwrap_or(&Junction::EMPTY)
    }

    /// Junction for writing, created on first use
    pub fn junction_mut(&mut self) -> &mut Junction {
        self.junction.get_or_insert_with(Junction::new)
    }
}
