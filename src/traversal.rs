//! Walking a route along its junction legs
//!
//! Steps use the strict leg lookups, so a malformed junction ends the walk.
//! Every walk is also bounded by the grid area, which stops closed loops.

use crate::grid::TileCoord;
use crate::junction::RouteId;
use crate::world::World;

/// Next tile along the route's log direction, or None at its end
pub fn next_tile(world: &World, here: TileCoord, id: RouteId) -> Option<TileCoord> {
    let dir = world.junction_or_empty(here).forward_direction_strict(id)?;
    world.neighbor(here, dir)
}

/// Previous tile along the route, or None at its start
pub fn prev_tile(world: &World, here: TileCoord, id: RouteId) -> Option<TileCoord> {
    let dir = world.junction_or_empty(here).backward_direction_strict(id)?;
    world.neighbor(here, dir)
}

/// Tiles visited walking forward from `start`, `start` included
pub fn route_tiles(world: &World, start: TileCoord, id: RouteId) -> Vec<TileCoord> {
    let limit = world.width * world.height;
    let mut tiles = vec![start];
    let mut here = start;
    while tiles.len() <= limit {
        match next_tile(world, here, id) {
            Some(next) => {
                tiles.push(next);
                here = next;
            }
            None => break,
        }
    }
    tiles
}

/// Number of hops from `start` to the route's end
pub fn route_length(world: &World, start: TileCoord, id: RouteId) -> usize {
    route_tiles(world, start, id).len() - 1
}

/// First tile in row-major order where the route starts
pub fn find_route_start(world: &World, id: RouteId) -> Option<TileCoord> {
    world
        .tiles()
        .iter()
        .find(|(_, _, tile)| tile.junction.as_ref().is_some_and(|j| j.is_route_start(id)))
        .map(|(x, y, _)| TileCoord::new(x, y))
}

/// First tile in row-major order where the route ends
pub fn find_route_end(world: &World, id: RouteId) -> Option<TileCoord> {
    world
        .tiles()
        .iter()
        .find(|(_, _, tile)| tile.junction.as_ref().is_some_and(|j| j.is_route_end(id)))
        .map(|(x, y, _)| TileCoord::new(x, y))
}

/// Rescan the grid for a route's endpoints after an edit. Endpoints that
/// can't be found (a closed loop, or the route was erased) are left as is.
pub fn refresh_route_endpoints(world: &mut World, id: RouteId) {
    let start = find_route_start(world, id);
    let end = find_route_end(world, id);
    if let Some(route) = world.routes.get_mut(id) {
        if let Some(start) = start {
            route.start = start;
        }
        if let Some(end) = end {
            route.end = end;
        }
    }
}
