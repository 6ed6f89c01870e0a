//! Seed management for island generation
//!
//! Layout (coastline, towns, roads) and naming draw from separate generators so
//! the name dictionaries can be reshuffled without moving a single road.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seeds for every randomized system, derived from one master seed by default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Coastline carving, town placement and road layout
    pub layout: u64,
    /// Town, street and rural road names, route numbers
    pub names: u64,
}

impl WorldSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            layout: derive_seed(master, "layout"),
            names: derive_seed(master, "names"),
        }
    }

    /// Create a builder for customizing individual seeds
    pub fn builder(master: u64) -> WorldSeedsBuilder {
        WorldSeedsBuilder::new(master)
    }

    /// Generator for the layout pipeline
    pub fn layout_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.layout)
    }
}

impl Default for WorldSeeds {
    fn default() -> Self {
        Self::from_master(rand::random())
    }
}

/// Builder for overriding individual seeds while deriving others from master
pub struct WorldSeedsBuilder {
    seeds: WorldSeeds,
}

impl WorldSeedsBuilder {
    pub fn new(master: u64) -> Self {
        Self {
            seeds: WorldSeeds::from_master(master),
        }
    }

    /// Override the layout seed
    pub fn layout(mut self, seed: u64) -> Self {
        self.seeds.layout = seed;
        self
    }

    /// Override the names seed
    pub fn names(mut self, seed: u64) -> Self {
        self.seeds.names = seed;
        self
    }

    pub fn build(self) -> WorldSeeds {
        self.seeds
    }
}

/// Derive a sub-seed from a master seed and a system name.
pub(crate) fn derive_seed(master: u64, system: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    system.hash(&mut hasher);
    hasher.finish()
}

impl std::fmt::Display for WorldSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WorldSeeds {{ master: {}, layout: {}, names: {} }}",
            self.master, self.layout, self.names,
        )
    }
}
