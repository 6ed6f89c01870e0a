//! Road network assembly
//!
//! Order matters: city streets first so highways can start on them, then
//! the numbered highways, then one backward extension per highway, then
//! rural roads.

use log::{debug, info, warn};
use rand_chacha::ChaCha8Rng;

use super::roads::{layout, pick_route_start, pick_street_start, WalkSpec};
use super::towns::EdgeTowns;
use crate::direction::Direction;
use crate::error::WorldError;
use crate::grid::TileCoord;
use crate::naming::{NameSource, ParityPreference};
use crate::params::GenerationParams;
use crate::town::TownId;
use crate::world::World;

/// Each town gets this many north-south and east-west street lines
const CITY_GRID_LINES: usize = 5;
/// Street names registered for every town, whether or not each line fits
pub(crate) const STREETS_PER_TOWN: usize = 2 * CITY_GRID_LINES;
/// Length of each city street line
const CITY_STREET_LENGTH: u32 = 4;

/// Lay out streets, highways and rural roads on a world with towns
pub fn lay_out_network(
    world: &mut World,
    params: &GenerationParams,
    names: &mut impl NameSource,
    edges: &EdgeTowns,
    rng: &mut ChaCha8Rng,
) -> Result<(), WorldError> {
    lay_out_city_streets(world, params, names, rng)?;
    info!("City streets: {}", world.streets.len());

    lay_out_highways(world, params, names, edges, rng)?;
    extend_highways_backward(world, params, rng)?;

    let city_streets = world.streets.len();
    lay_out_rural_roads(world, params, names, rng)?;
    info!("Rural roads: {}", world.streets.len() - city_streets);
    Ok(())
}

/// A 5x5 grid of short straight streets centered on every town
fn lay_out_city_streets(
    world: &mut World,
    params: &GenerationParams,
    names: &mut impl NameSource,
    rng: &mut ChaCha8Rng,
) -> Result<(), WorldError> {
    let centers: Vec<TileCoord> = world.towns.iter().map(|t| t.center).collect();
    for center in centers {
        let (cx, cy) = (center.x as isize, center.y as isize);
        for line in 0..CITY_GRID_LINES as isize {
            let offset = line - 2;
            let id = world.streets.register(names.next_street_name())?;
            if let Some(start) = signed_coord(cx + offset, cy + 2) {
                let spec = WalkSpec::city_street(id, start, Direction::North, CITY_STREET_LENGTH, params);
                layout(world, &spec, params, rng)?;
            }

            let id = world.streets.register(names.next_street_name())?;
            if let Some(start) = signed_coord(cx - 2, cy + offset) {
                let spec = WalkSpec::city_street(id, start, Direction::East, CITY_STREET_LENGTH, params);
                layout(world, &spec, params, rng)?;
            }
        }
    }
    Ok(())
}

fn signed_coord(x: isize, y: isize) -> Option<TileCoord> {
    Some(TileCoord::new(usize::try_from(x).ok()?, usize::try_from(y).ok()?))
}

/// Highways alternate: odd attempts run south from the next top-edge town,
/// even ones east from the next left-edge town. Once an edge list runs out,
/// the highest-numbered unused town is taken, then a random spot on an
/// existing road.
fn lay_out_highways(
    world: &mut World,
    params: &GenerationParams,
    names: &mut impl NameSource,
    edges: &EdgeTowns,
    rng: &mut ChaCha8Rng,
) -> Result<(), WorldError> {
    let mut used = vec![false; world.towns.len()];
    let mut top = edges.top.iter();
    let mut left = edges.left.iter();
    let max_attempts = params.max_route_attempts();
    let mut attempts = 0;

    while world.routes.len() < params.route_count {
        if attempts >= max_attempts {
            warn!(
                "Gave up after {} highway attempts with {} of {} routes laid",
                attempts,
                world.routes.len(),
                params.route_count
            );
            break;
        }
        attempts += 1;

        let mut heading = Direction::random_cardinal(rng);
        let edge_town = if (world.routes.len() + 1) % 2 == 1 {
            top.next().map(|&id| (id, Direction::South))
        } else {
            left.next().map(|&id| (id, Direction::East))
        };

        let mut start = None;
        if let Some((id, edge_heading)) = edge_town {
            mark_used(&mut used, id);
            start = world.town(id).map(|t| t.center);
            heading = edge_heading;
        }
        if start.is_none() {
            if let Some(index) = used.iter().rposition(|u| !u) {
                used[index] = true;
                start = world.towns.get(index).map(|t| t.center);
            }
        }
        if start.is_none() {
            start = pick_route_start(world, heading, true, params.start_search_tries, rng);
        }
        let Some(start) = start else {
            warn!("No start found for a highway heading {}", heading);
            continue;
        };

        let id = world.routes.next_id()?;
        let spec = WalkSpec::highway(id, start, heading, params);
        let outcome = layout(world, &spec, params, rng)?;
        if outcome.length == 0 {
            debug!("Highway from {} heading {} went nowhere", start, heading);
            continue;
        }

        let parity = match heading {
            Direction::North | Direction::South => ParityPreference::Odd,
            _ => ParityPreference::Even,
        };
        let number = names.next_route_number(parity);
        world.routes.register(number, heading, start, outcome.end)?;
        debug!("Route {} runs {} tiles from {}", number, outcome.length, start);
    }
    Ok(())
}

fn mark_used(used: &mut [bool], id: TownId) {
    if let Some(flag) = used.get_mut(id.index()) {
        *flag = true;
    }
}

/// Push each highway's start backward until it meets another road
fn extend_highways_backward(
    world: &mut World,
    params: &GenerationParams,
    rng: &mut ChaCha8Rng,
) -> Result<(), WorldError> {
    let routes: Vec<_> = world
        .routes
        .iter()
        .map(|r| (r.id, r.start, r.log_direction))
        .collect();
    for (id, start, log_direction) in routes {
        let spec = WalkSpec {
            forward: false,
            die_soon: true,
            ..WalkSpec::highway(id, start, log_direction, params)
        };
        let outcome = layout(world, &spec, params, rng)?;
        if let Some(route) = world.routes.get_mut(id) {
            route.start = outcome.end;
        }
    }
    Ok(())
}

fn lay_out_rural_roads(
    world: &mut World,
    params: &GenerationParams,
    names: &mut impl NameSource,
    rng: &mut ChaCha8Rng,
) -> Result<(), WorldError> {
    for _ in 0..params.rural_road_count {
        let heading = Direction::random_cardinal(rng);
        let Some(start) = pick_street_start(world, heading, true, params.start_search_tries, rng) else {
            warn!("No start found for a rural road heading {}", heading);
            continue;
        };
        let id = world.streets.register(names.next_rural_road_name())?;
        let spec = WalkSpec::rural_road(id, start, heading, params);
        layout(world, &spec, params, rng)?;
    }
    Ok(())
}
