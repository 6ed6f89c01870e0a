//! Towns: named regions of land tiles

use std::fmt;
use std::num::NonZeroU16;

use serde::{Deserialize, Serialize};

use crate::grid::TileCoord;

/// Index into the world's town table. Never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TownId(NonZeroU16);

impl TownId {
    pub fn new(id: u16) -> Option<Self> {
        NonZeroU16::new(id).map(Self)
    }

    /// Id for the town stored at `index` in the town table
    pub fn from_index(index: usize) -> Option<Self> {
        u16::try_from(index + 1).ok().and_then(Self::new)
    }

    pub fn get(self) -> u16 {
        self.0.get()
    }

    pub fn index(self) -> usize {
        self.0.get() as usize - 1
    }
}

impl fmt::Display for TownId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "town {}", self.0)
    }
}

/// A named town. Its tiles are the grid tiles carrying its id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Town {
    pub name: String,
    /// Always a land tile owned by this town once generation finishes
    pub center: TileCoord,
    /// Number of tiles owned
    pub area: usize,
}

impl Town {
    pub fn new(name: impl Into<String>, center: TileCoord) -> Self {
        Self {
            name: name.into(),
            center,
            area: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_town_id_index_round_trip() {
        let id = TownId::from_index(4).unwrap();
        assert_eq!(id.get(), 5);
        assert_eq!(id.index(), 4);
        assert!(TownId::new(0).is_none());
        assert!(TownId::from_index(u16::MAX as usize).is_none());
    }
}
