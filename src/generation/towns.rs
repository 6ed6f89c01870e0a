//! Town placement and growth
//!
//! Town seeds sit on a rough grid over the island, one short random walk per
//! cell. Every land tile is then grown into the territory of an adjacent town,
//! first slowly with a growth chance per pass, then greedily until nothing
//! changes. Each town's center is the mean of its tiles, pulled onto land it
//! owns.

use log::debug;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::network::STREETS_PER_TOWN;
use super::roll;
use crate::direction::Direction;
use crate::grid::{Tile, TileCoord};
use crate::junction::MAX_ID;
use crate::naming::NameSource;
use crate::params::GenerationParams;
use crate::town::{Town, TownId};
use crate::world::World;

/// Land tiles per town
const LAND_PER_TOWN: usize = 300;
/// Steps in each town's seeding walk
const SEED_WALK_STEPS: usize = 14;
/// Growth passes that roll the growth chance
const SLOW_GROWTH_PASSES: usize = 15;

/// Towns in the first row and first column of the placement grid. Highways
/// start from these.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeTowns {
    pub top: Vec<TownId>,
    pub left: Vec<TownId>,
}

/// Seed, grow and center every town
pub fn place_towns(
    world: &mut World,
    params: &GenerationParams,
    names: &mut impl NameSource,
    rng: &mut ChaCha8Rng,
) -> EdgeTowns {
    let edges = seed_towns(world, max_towns(params), names, rng);
    grow_towns(world, params.town_growth_odds, rng);
    fix_notches(world);
    center_towns(world);
    edges
}

/// Most towns whose city streets still leave street ids for the rural roads
fn max_towns(params: &GenerationParams) -> usize {
    (MAX_ID as usize).saturating_sub(params.rural_road_count) / STREETS_PER_TOWN
}

fn seed_towns(world: &mut World, max_towns: usize, names: &mut impl NameSource, rng: &mut ChaCha8Rng) -> EdgeTowns {
    let mut edges = EdgeTowns::default();
    let by_land = world.land_area() / LAND_PER_TOWN;
    let ntowns = by_land.min(max_towns);
    if ntowns < by_land {
        debug!("Town count capped at {} (land allows {})", ntowns, by_land);
    }
    let my_w = world.width - 8;
    let my_h = world.height - 8;

    let nrows = ((ntowns * my_h / my_w) as f64).sqrt().round().max(1.0) as usize;
    let mut columns_used = 0;
    for r in 0..nrows {
        let row_y = my_h / nrows * r + my_h / nrows / 2 + 4;
        let ncols = ntowns.saturating_sub(columns_used) / (nrows - r);
        for c in 0..ncols {
            let mut tx = my_w / ncols * c + my_w / ncols / 2 + 4;
            let mut ty = row_y;
            let mut town = None;

            for _ in 0..SEED_WALK_STEPS {
                let at = TileCoord::new(tx, ty);
                if world.tile(at).is_some_and(|t| t.ok_for_town()) {
                    let id = match town {
                        Some(id) => id,
                        None => match TownId::from_index(world.towns.len()) {
                            Some(id) => {
                                world.towns.push(Town::new(names.next_town_name(), at));
                                if r == 0 {
                                    edges.top.push(id);
                                }
                                if c == 0 {
                                    edges.left.push(id);
                                }
                                town = Some(id);
                                id
                            }
                            None => break,
                        },
                    };
                    if let Some(tile) = world.tile_mut(at) {
                        tile.town = Some(id);
                    }
                }

                match rng.gen_range(0..4) {
                    0 => ty = ty.saturating_sub(1),
                    1 => tx += 1,
                    2 => ty += 1,
                    _ => tx = tx.saturating_sub(1),
                }
                tx = tx.clamp(1, my_w - 2);
                ty = ty.clamp(1, my_h - 2);
            }
        }
        columns_used += ncols;
    }
    edges
}

/// A town owning one of the four orthogonal neighbors, picked at random
fn adjacent_town(world: &World, x: usize, y: usize, rng: &mut ChaCha8Rng) -> Option<TownId> {
    let here = TileCoord::new(x, y);
    let candidates: Vec<TownId> = Direction::CARDINALS
        .iter()
        .filter_map(|&dir| world.neighbor(here, dir))
        .filter_map(|at| world.tile(at))
        .filter(|t| t.has_real_town())
        .filter_map(|t| t.town())
        .collect();
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.gen_range(0..candidates.len())])
}

/// One sweep over the interior. With `odds`, each open tile first has to
/// win a roll before it joins a neighbor.
fn growth_pass(world: &mut World, odds: Option<u32>, rng: &mut ChaCha8Rng) -> usize {
    let (w, h) = (world.width, world.height);
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            if let Some(odds) = odds {
                if roll(rng) >= odds {
                    continue;
                }
            }
            let at = TileCoord::new(x, y);
            if !world.tile(at).is_some_and(|t| t.ok_for_town()) {
                continue;
            }
            let town = adjacent_town(world, x, y, rng);
            if let Some(tile) = world.tile_mut(at) {
                tile.set_town_and_mark(town);
            }
        }
    }

    let mut open = 0;
    for (_, _, tile) in world.tiles_mut().iter_mut() {
        tile.marked = false;
        if tile.ok_for_town() {
            open += 1;
        }
    }
    open
}

fn grow_towns(world: &mut World, odds: u32, rng: &mut ChaCha8Rng) {
    for _ in 0..SLOW_GROWTH_PASSES {
        growth_pass(world, Some(odds), rng);
    }
    let mut old_open = 0;
    loop {
        let open = growth_pass(world, None, rng);
        if open == 0 || open == old_open {
            break;
        }
        old_open = open;
    }
}

/// Hand a tile enclosed on three sides by one town over to that town
fn fix_notches(world: &mut World) {
    let (w, h) = (world.width, world.height);
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let at = TileCoord::new(x, y);
            if !world.is_land(at) {
                continue;
            }
            let around: Option<Vec<TownId>> = Direction::CARDINALS
                .iter()
                .map(|&dir| {
                    world
                        .neighbor(at, dir)
                        .and_then(|n| world.tile(n))
                        .filter(|t| t.has_real_town())
                        .and_then(|t| t.town())
                })
                .collect();
            let Some(&[north, east, south, west]) = around.as_deref() else {
                continue;
            };

            let winner = if north == east && (east == south || east == west) {
                Some(north)
            } else if north == south && south == west {
                Some(north)
            } else if east == south && south == west {
                Some(east)
            } else {
                None
            };
            if let (Some(town), Some(tile)) = (winner, world.tile_mut(at)) {
                tile.town = Some(town);
            }
        }
    }
}

/// Recompute every town's area and center
fn center_towns(world: &mut World) {
    let count = world.towns.len();
    let mut sums = vec![(0usize, 0usize, 0usize); count];
    for (x, y, tile) in world.tiles().iter() {
        if let Some(id) = tile.town() {
            if let Some(sum) = sums.get_mut(id.index()) {
                sum.0 += x;
                sum.1 += y;
                sum.2 += 1;
            }
        }
    }

    for (index, &(sx, sy, area)) in sums.iter().enumerate() {
        let Some(id) = TownId::from_index(index) else {
            continue;
        };
        let mean = if area > 0 {
            TileCoord::new(sx / area, sy / area)
        } else {
            world.towns[index].center
        };
        let center = pull_onto_town(world, mean, id)
            .or_else(|| nearest(world, mean, |t| t.town() == Some(id)))
            .or_else(|| nearest(world, mean, |t| t.is_land()))
            .unwrap_or(mean);
        let town = &mut world.towns[index];
        town.area = area;
        town.center = center;
    }
}

/// Step from `start` toward the middle of the grid until reaching a tile of
/// `id`
fn pull_onto_town(world: &World, start: TileCoord, id: TownId) -> Option<TileCoord> {
    let (mut x, mut y) = (start.x, start.y);
    for _ in 0..world.width.max(world.height) {
        let at = TileCoord::new(x, y);
        if world.town_at(at) == Some(id) {
            return Some(at);
        }
        x = if x > world.width / 2 { x - 1 } else { x + 1 };
        y = if y > world.height / 2 { y - 1 } else { y + 1 };
    }
    None
}

fn nearest(world: &World, from: TileCoord, wanted: impl Fn(&Tile) -> bool) -> Option<TileCoord> {
    world
        .tiles()
        .iter()
        .filter(|(_, _, t)| wanted(t))
        .map(|(x, y, _)| TileCoord::new(x, y))
        .min_by_key(|at| at.x.abs_diff(from.x).pow(2) + at.y.abs_diff(from.y).pow(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::coastline::carve_coastline;
    use crate::grid::Terrain;
    use crate::naming::DictionaryNames;
    use crate::params::MAX_DIMENSION;
    use rand::SeedableRng;

    fn placed(seed: u64) -> (World, EdgeTowns) {
        let params = GenerationParams::default();
        let mut world = World::new(params.width, params.height).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut names = DictionaryNames::new(seed);
        carve_coastline(&mut world, &params, &mut rng);
        let edges = place_towns(&mut world, &params, &mut names, &mut rng);
        (world, edges)
    }

    #[test]
    fn test_town_count_tracks_land() {
        let (world, _) = placed(4);
        assert!(!world.towns.is_empty());
        assert!(world.towns.len() <= world.land_area() / LAND_PER_TOWN);
    }

    #[test]
    fn test_centers_on_own_land() {
        let (world, _) = placed(12);
        for (index, town) in world.towns.iter().enumerate() {
            let id = TownId::from_index(index).unwrap();
            assert!(world.is_land(town.center), "{} center on water", town.name);
            if town.area > 0 {
                assert_eq!(world.town_at(town.center), Some(id));
            }
        }
    }

    #[test]
    fn test_areas_add_up() {
        let (world, _) = placed(30);
        let owned = world.tiles().iter().filter(|(_, _, t)| t.town().is_some()).count();
        let total: usize = world.towns.iter().map(|t| t.area).sum();
        assert_eq!(owned, total);
        assert!(world.tiles().iter().all(|(_, _, t)| !t.marked));
    }

    #[test]
    fn test_edge_towns_are_distinct() {
        let (world, edges) = placed(6);
        assert!(!edges.top.is_empty());
        assert!(!edges.left.is_empty());
        for id in edges.top.iter().chain(&edges.left) {
            assert!(world.town(*id).is_some());
        }
        let mut top = edges.top.clone();
        top.dedup();
        assert_eq!(top.len(), edges.top.len());
    }

    #[test]
    fn test_no_towns_on_tiny_island() {
        let params = GenerationParams {
            width: 16,
            height: 16,
            ..GenerationParams::default()
        };
        let mut world = World::new(16, 16).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut names = DictionaryNames::new(1);
        carve_coastline(&mut world, &params, &mut rng);
        let edges = place_towns(&mut world, &params, &mut names, &mut rng);
        assert!(world.towns.is_empty());
        assert_eq!(edges, EdgeTowns::default());
    }

    #[test]
    fn test_town_count_leaves_street_ids() {
        let params = GenerationParams {
            width: MAX_DIMENSION,
            height: MAX_DIMENSION,
            ..GenerationParams::default()
        };
        let mut world = World::new(MAX_DIMENSION, MAX_DIMENSION).unwrap();
        world.fill_terrain(4, 4, MAX_DIMENSION - 8, MAX_DIMENSION - 8, Terrain::Land);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut names = DictionaryNames::new(3);

        let limit = max_towns(&params);
        assert!(world.land_area() / LAND_PER_TOWN > limit);
        seed_towns(&mut world, limit, &mut names, &mut rng);
        assert!(!world.towns.is_empty());
        assert!(world.towns.len() <= limit);
        assert!(world.towns.len() * STREETS_PER_TOWN + params.rural_road_count <= MAX_ID as usize);
    }

    #[test]
    fn test_growth_stops_at_water_locked_land() {
        let mut world = World::new(20, 20).unwrap();
        world.fill_terrain(2, 2, 6, 6, Terrain::Land);
        // a pocket no town can reach
        world.fill_terrain(12, 12, 3, 3, Terrain::Land);
        world.towns.push(Town::new("Ashford", TileCoord::new(3, 3)));
        if let Some(tile) = world.tile_mut(TileCoord::new(3, 3)) {
            tile.town = TownId::new(1);
        }

        grow_towns(&mut world, 12, &mut ChaCha8Rng::seed_from_u64(8));

        let ashford = TownId::new(1);
        for y in 2..8 {
            for x in 2..8 {
                assert_eq!(world.town_at(TileCoord::new(x, y)), ashford);
            }
        }
        for y in 12..15 {
            for x in 12..15 {
                assert_eq!(world.town_at(TileCoord::new(x, y)), None);
            }
        }
        assert!(world.tiles().iter().all(|(_, _, t)| !t.marked));
    }
}
