//! Island generation pipeline
//!
//! One layout generator is threaded through every stage in a fixed order:
//! coastline, towns, then the road network. Names come from a separate
//! `NameSource` so they never shift the layout.

pub mod coastline;
pub mod network;
pub mod roads;
pub mod towns;

use log::info;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::error::WorldError;
use crate::naming::{DictionaryNames, NameSource};
use crate::params::GenerationParams;
use crate::seeds::WorldSeeds;
use crate::world::World;

/// A roll out of 16
pub(crate) fn roll(rng: &mut ChaCha8Rng) -> u32 {
    rng.gen_range(0..16)
}

/// True with probability `odds`/16
pub(crate) fn chance(rng: &mut ChaCha8Rng, odds: u32) -> bool {
    roll(rng) < odds
}

/// Generate a complete island with the stock dictionary names
pub fn generate(params: &GenerationParams, seeds: &WorldSeeds) -> Result<World, WorldError> {
    let mut names = DictionaryNames::new(seeds.names);
    generate_world(params, seeds, &mut names)
}

/// Generate a complete island, drawing names from `names`
pub fn generate_world(
    params: &GenerationParams,
    seeds: &WorldSeeds,
    names: &mut impl NameSource,
) -> Result<World, WorldError> {
    params.validate()?;
    let mut world = World::new(params.width, params.height)?;
    let mut rng = seeds.layout_rng();

    info!("Carving coastline ({}x{}, seed {})", params.width, params.height, seeds.master);
    coastline::carve_coastline(&mut world, params, &mut rng);
    info!("Land area: {} tiles", world.land_area());

    let edges = towns::place_towns(&mut world, params, names, &mut rng);
    info!("Placed {} towns", world.towns.len());

    network::lay_out_network(&mut world, params, names, &edges, &mut rng)?;
    info!(
        "Laid out {} numbered routes and {} named streets",
        world.routes.len(),
        world.streets.len()
    );

    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileCoord;

    #[test]
    fn test_same_seed_same_world() {
        let params = GenerationParams::default();
        let seeds = WorldSeeds::from_master(2024);
        let a = generate(&params, &seeds).unwrap();
        let b = generate(&params, &seeds).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let params = GenerationParams::default();
        let a = generate(&params, &WorldSeeds::from_master(1)).unwrap();
        let b = generate(&params, &WorldSeeds::from_master(2)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_generated_world_is_consistent() {
        let params = GenerationParams::default();
        let world = generate(&params, &WorldSeeds::from_master(77)).unwrap();

        assert!(!world.towns.is_empty());
        for town in &world.towns {
            assert!(world.is_land(town.center), "{} center {} is water", town.name, town.center);
        }

        assert!(world.routes.len() <= params.route_count);
        for route in world.routes.iter() {
            assert!(route.log_direction.is_cardinal());
            assert!(world.junction_or_empty(route.start).contains_route(route.id));
            let odd = route.number % 2 == 1;
            let north_south = matches!(
                route.log_direction,
                crate::direction::Direction::North | crate::direction::Direction::South
            );
            assert_eq!(odd, north_south, "route {} parity", route.number);
        }

        // route slots never hold duplicates and roads never touch water
        for (x, y, tile) in world.tiles().iter() {
            let Some(j) = tile.junction.as_ref() else {
                continue;
            };
            for dir in crate::direction::Direction::ALL {
                if let [Some(a), Some(b)] = j.routes_at(dir) {
                    assert_ne!(a, b);
                }
                if !j.is_empty(dir) {
                    assert!(tile.is_land(), "paved water at {}", TileCoord::new(x, y));
                }
            }
        }
    }

    #[test]
    fn test_small_grid_generates() {
        let params = GenerationParams {
            width: 16,
            height: 16,
            ..GenerationParams::default()
        };
        assert!(generate(&params, &WorldSeeds::from_master(5)).is_ok());
    }

    #[test]
    fn test_large_grid_generates() {
        let params = GenerationParams {
            width: 300,
            height: 300,
            ..GenerationParams::default()
        };
        let world = generate(&params, &WorldSeeds::from_master(5)).unwrap();
        assert!(world.streets.len() <= crate::junction::MAX_ID as usize);
        assert!(!world.routes.is_empty());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = GenerationParams {
            height: 4,
            ..GenerationParams::default()
        };
        assert!(generate(&params, &WorldSeeds::from_master(5)).is_err());
    }
}
