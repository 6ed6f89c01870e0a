//! Coastline carving
//!
//! The island starts as a rectangle inset four tiles from the grid edge. The
//! rim is cut into 9x9 blocks, some of which are notched out, then 3x3 blocks
//! are pushed back and forth across every block boundary. Slab corners are
//! softened, diagonal pinches filled in, and the water tiles that should be
//! drawn as half-land recorded.

use rand_chacha::ChaCha8Rng;

use super::{chance, roll};
use crate::grid::{DisplayHint, Terrain, TileCoord};
use crate::params::GenerationParams;
use crate::world::World;

const INSET: usize = 4;
const BLOCK: usize = 9;
const NUDGE: usize = 3;

/// Carve the island outline into an all-water world
pub fn carve_coastline(world: &mut World, params: &GenerationParams, rng: &mut ChaCha8Rng) {
    let (w, h) = (world.width, world.height);
    world.fill_terrain(INSET, INSET, w - 2 * INSET, h - 2 * INSET, Terrain::Land);

    for (x, y) in rim_blocks(w, h) {
        if chance(rng, params.notch_odds) {
            world.fill_terrain(x, y, BLOCK, BLOCK, Terrain::Water);
        }
    }

    for (x, y) in rim_blocks(w, h) {
        nudge_block(world, x, y, params.edge_block_odds, rng);
    }

    for x in 1..w - 1 {
        for y in 1..h - 1 {
            fix_slab(world, x, y, params.slab_fix_odds, rng);
        }
    }
    fix_bow_ties(world);

    mark_display_hints(world);
}

/// Corners of the 9x9 blocks along the rim, in carving order. Each column
/// position yields its top and bottom block, then each row position its
/// left and right block.
fn rim_blocks(w: usize, h: usize) -> Vec<(usize, usize)> {
    let mut blocks = Vec::new();
    for x in (INSET..w.saturating_sub(BLOCK + INSET)).step_by(BLOCK) {
        blocks.push((x, INSET));
        blocks.push((x, h - BLOCK - INSET));
    }
    for y in (BLOCK + INSET..h.saturating_sub(2 * BLOCK + INSET)).step_by(BLOCK) {
        blocks.push((INSET, y));
        blocks.push((w - BLOCK - INSET, y));
    }
    blocks
}

/// Try a 3x3 push across each of the four edges of the block at (x, y)
fn nudge_block(world: &mut World, x: usize, y: usize, odds: u32, rng: &mut ChaCha8Rng) {
    nudge_vertical(world, x + NUDGE, y, odds, rng);
    nudge_vertical(world, x + NUDGE, y + BLOCK, odds, rng);
    nudge_horizontal(world, x, y + NUDGE, odds, rng);
    nudge_horizontal(world, x + BLOCK, y + NUDGE, odds, rng);
}

/// Across a horizontal boundary: the tile at (x, y) and the one above it
fn nudge_vertical(world: &mut World, x: usize, y: usize, odds: u32, rng: &mut ChaCha8Rng) {
    let (Some(up), Some(down)) = (
        world.terrain(TileCoord::new(x, y - 1)),
        world.terrain(TileCoord::new(x, y)),
    ) else {
        return;
    };
    if up == down {
        return;
    }
    let r = roll(rng);
    if r < odds {
        world.fill_terrain(x, y, NUDGE, NUDGE, up);
    } else if r < 2 * odds {
        world.fill_terrain(x, y - NUDGE, NUDGE, NUDGE, down);
    }
}

/// Across a vertical boundary: the tile at (x, y) and the one left of it
fn nudge_horizontal(world: &mut World, x: usize, y: usize, odds: u32, rng: &mut ChaCha8Rng) {
    let (Some(left), Some(right)) = (
        world.terrain(TileCoord::new(x - 1, y)),
        world.terrain(TileCoord::new(x, y)),
    ) else {
        return;
    };
    if left == right {
        return;
    }
    let r = roll(rng);
    if r < odds {
        world.fill_terrain(x, y, NUDGE, NUDGE, left);
    } else if r < 2 * odds {
        world.fill_terrain(x - NUDGE, y, NUDGE, NUDGE, right);
    }
}

/// Stair-step a slab corner: flip the center of a 3x3 that is split evenly
fn fix_slab(world: &mut World, x: usize, y: usize, odds: u32, rng: &mut ChaCha8Rng) {
    if !chance(rng, odds) {
        return;
    }
    let mut water = 0;
    for yy in y - 1..=y + 1 {
        for xx in x - 1..=x + 1 {
            if !world.is_land(TileCoord::new(xx, yy)) {
                water += 1;
            }
        }
    }
    let center = TileCoord::new(x, y);
    let center_is_land = world.is_land(center);
    let flip = match (water, center_is_land) {
        (4, false) => Some(Terrain::Land),
        (5, true) => Some(Terrain::Water),
        _ => None,
    };
    if let Some(terrain) = flip {
        world.fill_terrain(x, y, 1, 1, terrain);
    }
}

/// Sweep until no 2x2 checkerboard is left. Filling only ever adds land, so
/// this settles.
fn fix_bow_ties(world: &mut World) {
    let (w, h) = (world.width, world.height);
    loop {
        let mut changed = false;
        for x in 0..w - 1 {
            for y in 0..h - 1 {
                changed |= fix_bow_tie(world, x, y);
            }
        }
        if !changed {
            break;
        }
    }
}

/// Two land tiles touching only at a corner get filled in
fn fix_bow_tie(world: &mut World, x: usize, y: usize) -> bool {
    if !is_bow_tie(world, x, y) {
        return false;
    }
    world.fill_terrain(x, y, 2, 2, Terrain::Land);
    true
}

fn is_bow_tie(world: &World, x: usize, y: usize) -> bool {
    let ul = world.is_land(TileCoord::new(x, y));
    let ur = world.is_land(TileCoord::new(x + 1, y));
    let ll = world.is_land(TileCoord::new(x, y + 1));
    let lr = world.is_land(TileCoord::new(x + 1, y + 1));
    ul == lr && ur == ll && ul != ur
}

// Neighbor ring starting west and running counterclockwise on screen
const RING_DX: [i32; 8] = [-1, -1, 0, 1, 1, 1, 0, -1];
const RING_DY: [i32; 8] = [0, 1, 1, 1, 0, -1, -1, -1];

const NW_MASK: u8 = 0b1100_0001;
const SE_MASK: u8 = 0b0001_1100;
const NE_MASK: u8 = 0b0111_0000;
const SW_MASK: u8 = 0b0000_0111;

/// Flag water tiles whose land neighbors fill one half of the ring
fn mark_display_hints(world: &mut World) {
    let (w, h) = (world.width, world.height);
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let here = TileCoord::new(x, y);
            if world.is_land(here) {
                continue;
            }
            let mut land = 0u8;
            for bit in 0..8 {
                let nx = (x as i32 + RING_DX[bit]) as usize;
                let ny = (y as i32 + RING_DY[bit]) as usize;
                if world.is_land(TileCoord::new(nx, ny)) {
                    land |= 1 << bit;
                }
            }

            let full = |mask: u8| land & mask == mask;
            let clear = |mask: u8| land & mask == 0;
            let mut hint = DisplayHint::None;
            if full(NW_MASK) && clear(SE_MASK) {
                hint = DisplayHint::WaterSouthEast;
            }
            if full(NE_MASK) && clear(SW_MASK) {
                hint = DisplayHint::WaterSouthWest;
            }
            if full(SE_MASK) && clear(NW_MASK) {
                hint = DisplayHint::WaterNorthWest;
            }
            if full(SW_MASK) && clear(NE_MASK) {
                hint = DisplayHint::WaterNorthEast;
            }
            if let Some(tile) = world.tile_mut(here) {
                tile.display_hint = hint;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn carved(seed: u64, width: usize, height: usize) -> World {
        let params = GenerationParams {
            width,
            height,
            ..GenerationParams::default()
        };
        let mut world = World::new(width, height).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        carve_coastline(&mut world, &params, &mut rng);
        world
    }

    #[test]
    fn test_border_stays_water() {
        let world = carved(3, 100, 64);
        for (x, y, tile) in world.tiles().iter() {
            if x == 0 || y == 0 || x == world.width - 1 || y == world.height - 1 {
                assert!(tile.is_water(), "edge tile ({}, {}) is land", x, y);
            }
        }
    }

    #[test]
    fn test_interior_is_land() {
        let world = carved(11, 100, 64);
        // blocks and nudges never reach the middle of the island
        for y in 20..44 {
            for x in 20..80 {
                assert!(world.is_land(TileCoord::new(x, y)));
            }
        }
        assert!(world.land_area() > 2000);
    }

    #[test]
    fn test_hints_only_on_water() {
        let world = carved(8, 100, 64);
        for (_, _, tile) in world.tiles().iter() {
            if tile.display_hint != DisplayHint::None {
                assert!(tile.is_water());
            }
        }
    }

    #[test]
    fn test_rim_blocks_fit_small_grid() {
        assert!(rim_blocks(16, 16).is_empty());
        let world = carved(1, 16, 16);
        // only slab fixes at the corners can touch the 8x8 square
        assert!(world.land_area() <= 68);
        assert!(world.is_land(TileCoord::new(8, 8)));
    }

    #[test]
    fn test_no_checkerboards_remain() {
        for seed in 0..20 {
            let world = carved(seed, 100, 64);
            for y in 0..world.height - 1 {
                for x in 0..world.width - 1 {
                    assert!(!is_bow_tie(&world, x, y), "seed {} bow tie at ({}, {})", seed, x, y);
                }
            }
        }
    }

    #[test]
    fn test_bow_tie_fill_settles() {
        let mut world = World::new(16, 16).unwrap();
        // single tiles touching corner to corner along a diagonal
        for i in 0..6 {
            world.fill_terrain(4 + i, 4 + i, 1, 1, Terrain::Land);
        }
        fix_bow_ties(&mut world);
        for y in 0..15 {
            for x in 0..15 {
                assert!(!is_bow_tie(&world, x, y));
            }
        }
        assert!(world.is_land(TileCoord::new(5, 4)));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(carved(21, 60, 40), carved(21, 60, 40));
    }
}
