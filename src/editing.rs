//! Editing an existing road network
//!
//! Single-segment operations either apply fully or leave the world alone.
//! Path operations walk a list of adjacent tiles and stop at the first step
//! that fails; the steps before it stay applied and the error says how many.

use log::debug;

use crate::direction::Direction;
use crate::error::{EditError, PathEditError};
use crate::grid::TileCoord;
use crate::junction::{Pavement, RouteId, StreetId, MAX_OVERLAPPING_ROUTES};
use crate::traversal::refresh_route_endpoints;
use crate::world::World;

/// What a numbering edit does to the route ids already on each leg
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberAction {
    /// Add the routes next to whatever is there
    Add,
    /// Take the routes off; they must exist
    Remove,
    /// Replace whatever is there with the routes
    Set,
}

/// A route number plus the heading the path runs in, as the user sees it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteSpec {
    pub number: u32,
    /// North, east, south or west: the route's log direction or its reverse
    pub log_heading: Direction,
}

impl RouteSpec {
    pub fn new(number: u32, log_heading: Direction) -> Self {
        Self { number, log_heading }
    }
}

// =============================================================================
// Single segments
// =============================================================================

/// Pave one leg pair with `pavement`, replacing what was there
pub fn pave_segment(
    world: &mut World,
    here: TileCoord,
    heading: Direction,
    pavement: Pavement,
) -> Result<TileCoord, EditError> {
    world.check_pave(here, heading)?;
    world.set_pave_both(here, heading, pavement)
}

/// Remove pavement, route ids and street from one leg pair. Routes that
/// lost a leg get their endpoints rescanned.
pub fn erase_segment(world: &mut World, here: TileCoord, heading: Direction) -> Result<TileCoord, EditError> {
    let touched: Vec<RouteId> = world
        .junction_or_empty(here)
        .routes_at(heading)
        .into_iter()
        .flatten()
        .collect();
    let next = world.clear_leg_both(here, heading)?;
    for id in touched {
        refresh_route_endpoints(world, id);
    }
    Ok(next)
}

/// Put route `number` on a paved leg pair, creating the route if the number
/// is new. A new route takes `log_heading` as its log direction; an existing
/// one needs `log_heading` to be its log direction or the reverse.
pub fn add_or_create_route_number(
    world: &mut World,
    number: u32,
    here: TileCoord,
    heading: Direction,
    log_heading: Direction,
) -> Result<RouteId, EditError> {
    let spec = RouteSpec::new(number, log_heading);
    let next = segment_end(world, here, heading)?;
    check_route_leg(world, here, heading, world.routes.id_by_number(number))?;
    let (id, forward) = resolve_route(world, spec, here, next)?;
    world.add_rid_both(here, heading, id, forward)?;
    refresh_route_endpoints(world, id);
    Ok(id)
}

/// Take a route id off a leg pair. Does nothing if the id isn't there.
pub fn remove_route_number(
    world: &mut World,
    here: TileCoord,
    heading: Direction,
    id: RouteId,
) -> Result<(), EditError> {
    world.remove_rid_both(here, heading, id)?;
    refresh_route_endpoints(world, id);
    Ok(())
}

/// Name a paved leg pair, creating the street if the name is new
pub fn add_or_create_street_name(
    world: &mut World,
    name: &str,
    here: TileCoord,
    heading: Direction,
) -> Result<StreetId, EditError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EditError::EmptyName);
    }
    segment_end(world, here, heading)?;
    check_paved(world, here, heading)?;
    let id = world.streets.get_or_create(name)?;
    world.set_street_both(here, heading, id)?;
    Ok(id)
}

fn segment_end(world: &World, here: TileCoord, heading: Direction) -> Result<TileCoord, EditError> {
    if !world.in_bounds(here) {
        return Err(EditError::OffGrid(here));
    }
    world
        .neighbor(here, heading)
        .ok_or_else(|| EditError::OffGrid(here.step(heading).unwrap_or(here)))
}

fn check_paved(world: &World, here: TileCoord, heading: Direction) -> Result<(), EditError> {
    if world.junction_or_empty(here).is_empty(heading) {
        return Err(EditError::Unpaved(here, heading));
    }
    Ok(())
}

/// Paved, and room for the route unless it is already there
fn check_route_leg(world: &World, here: TileCoord, heading: Direction, id: Option<RouteId>) -> Result<(), EditError> {
    check_paved(world, here, heading)?;
    check_room(world, here, heading, &[id])
}

/// Enough free slots for every route not yet on the leg; `None` is a route
/// still to be created
fn check_room(world: &World, here: TileCoord, heading: Direction, ids: &[Option<RouteId>]) -> Result<(), EditError> {
    let slots = world.junction_or_empty(here).routes_at(heading);
    let free = slots.iter().filter(|slot| slot.is_none()).count();
    let missing = ids
        .iter()
        .filter(|id| id.map_or(true, |id| !slots.contains(&Some(id))))
        .count();
    if missing > free {
        return Err(EditError::LegFull(here, heading));
    }
    Ok(())
}

/// Existing id for a route spec plus whether the edit runs in the route's
/// log direction; `None` if the number is new. Changes nothing.
fn route_heading(world: &World, spec: RouteSpec) -> Result<Option<(RouteId, bool)>, EditError> {
    if !spec.log_heading.is_cardinal() {
        return Err(EditError::InvalidLogDirection(spec.log_heading));
    }
    let Some(route) = world.routes.id_by_number(spec.number).and_then(|id| world.routes.get(id)) else {
        return Ok(None);
    };
    if spec.log_heading == route.log_direction {
        Ok(Some((route.id, true)))
    } else if spec.log_heading == route.log_direction.reverse() {
        Ok(Some((route.id, false)))
    } else {
        Err(EditError::WrongAxis {
            number: spec.number,
            log_direction: route.log_direction,
            heading: spec.log_heading,
        })
    }
}

/// Id for a route spec, created on first use, plus whether the edit runs in
/// the route's log direction
fn resolve_route(
    world: &mut World,
    spec: RouteSpec,
    start: TileCoord,
    end: TileCoord,
) -> Result<(RouteId, bool), EditError> {
    if let Some(found) = route_heading(world, spec)? {
        return Ok(found);
    }
    let id = world.routes.register(spec.number, spec.log_heading, start, end)?;
    debug!("created route {} heading {}", spec.number, spec.log_heading);
    Ok((id, true))
}

// =============================================================================
// Paths
// =============================================================================

/// Number of segments in a path of at least two tiles
fn segment_count(path: &[TileCoord]) -> Result<usize, PathEditError> {
    if path.len() < 2 {
        return Err(PathEditError {
            applied: 0,
            source: EditError::EmptyPath,
        });
    }
    Ok(path.len() - 1)
}

/// Direction from `path[i]` to `path[i + 1]`
fn step_direction(path: &[TileCoord], i: usize) -> Result<Direction, EditError> {
    path[i]
        .direction_to(path[i + 1])
        .ok_or(EditError::NotAdjacent(path[i], path[i + 1]))
}

/// Run `step` on every segment of the path, stopping at the first failure
fn for_each_step(
    world: &mut World,
    path: &[TileCoord],
    mut step: impl FnMut(&mut World, TileCoord, Direction) -> Result<(), EditError>,
) -> Result<usize, PathEditError> {
    let count = segment_count(path)?;
    for i in 0..count {
        let result = step_direction(path, i).and_then(|dir| step(world, path[i], dir));
        if let Err(source) = result {
            return Err(PathEditError { applied: i, source });
        }
    }
    Ok(count)
}

/// Pave along a path; returns the number of segments paved
pub fn pave_path(world: &mut World, path: &[TileCoord], pavement: Pavement) -> Result<usize, PathEditError> {
    for_each_step(world, path, |world, here, dir| {
        pave_segment(world, here, dir, pavement).map(|_| ())
    })
}

/// Erase pavement, numbers and names along a path
pub fn erase_path(world: &mut World, path: &[TileCoord]) -> Result<usize, PathEditError> {
    for_each_step(world, path, |world, here, dir| {
        erase_segment(world, here, dir).map(|_| ())
    })
}

/// Add, remove or set up to two route numbers along a path.
///
/// Remove only accepts numbers that exist. Add and Set create new numbers
/// on first use. Endpoints of every touched route are rescanned afterwards,
/// including when the path stops partway.
pub fn number_path(
    world: &mut World,
    path: &[TileCoord],
    action: NumberAction,
    routes: &[RouteSpec],
) -> Result<usize, PathEditError> {
    segment_count(path)?;
    let fail = |source| PathEditError { applied: 0, source };

    let specs = &routes[..routes.len().min(MAX_OVERLAPPING_ROUTES)];
    let mut resolved: Vec<(RouteId, bool)> = Vec::new();
    match action {
        NumberAction::Remove => {
            for spec in specs {
                let id = world
                    .routes
                    .id_by_number(spec.number)
                    .ok_or(EditError::NoSuchRoute(spec.number))
                    .map_err(fail)?;
                resolved.push((id, true));
            }
        }
        NumberAction::Add | NumberAction::Set => {
            // nothing is registered until the first segment is known to take it
            let dir = step_direction(path, 0).map_err(fail)?;
            let next = segment_end(world, path[0], dir).map_err(fail)?;
            let mut known = Vec::new();
            for &spec in specs {
                known.push(route_heading(world, spec).map_err(fail)?.map(|(id, _)| id));
            }
            check_paved(world, path[0], dir).map_err(fail)?;
            if action == NumberAction::Add {
                check_room(world, path[0], dir, &known).map_err(fail)?;
            }
            for &spec in specs {
                resolved.push(resolve_route(world, spec, path[0], next).map_err(fail)?);
            }
        }
    }

    let result = for_each_step(world, path, |world, here, dir| {
        match action {
            NumberAction::Remove => {
                segment_end(world, here, dir)?;
                for &(id, _) in &resolved {
                    world.remove_rid_both(here, dir, id)?;
                }
            }
            NumberAction::Add => {
                check_paved(world, here, dir)?;
                let ids: Vec<Option<RouteId>> = resolved.iter().map(|&(id, _)| Some(id)).collect();
                check_room(world, here, dir, &ids)?;
                for &(id, forward) in &resolved {
                    world.add_rid_both(here, dir, id, forward)?;
                }
            }
            NumberAction::Set => {
                segment_end(world, here, dir)?;
                check_paved(world, here, dir)?;
                world.clear_rids_both(here, dir)?;
                for &(id, forward) in &resolved {
                    world.add_rid_both(here, dir, id, forward)?;
                }
            }
        }
        Ok(())
    });

    for &(id, _) in &resolved {
        refresh_route_endpoints(world, id);
    }
    result
}

/// Attach a street name along a paved path, creating the street if new
pub fn name_path(world: &mut World, path: &[TileCoord], name: &str) -> Result<usize, PathEditError> {
    segment_count(path)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(PathEditError {
            applied: 0,
            source: EditError::EmptyName,
        });
    }
    let id = world.streets.get_or_create(name).map_err(|e| PathEditError {
        applied: 0,
        source: e.into(),
    })?;
    for_each_step(world, path, |world, here, dir| {
        segment_end(world, here, dir)?;
        check_paved(world, here, dir)?;
        world.set_street_both(here, dir, id).map(|_| ())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction::*;
    use crate::error::PaveRejection;
    use crate::traversal::route_length;
    use crate::world::tests::land_world;

    fn at(x: usize, y: usize) -> TileCoord {
        TileCoord::new(x, y)
    }

    fn east_path() -> Vec<TileCoord> {
        vec![at(4, 4), at(5, 4), at(6, 4)]
    }

    #[test]
    fn test_pave_and_number_new_route() {
        let mut world = land_world();
        let path = east_path();
        assert_eq!(pave_path(&mut world, &path, Pavement::Undivided2), Ok(2));
        assert_eq!(number_path(&mut world, &path, NumberAction::Add, &[RouteSpec::new(5, East)]), Ok(2));

        assert_eq!(world.routes.len(), 1);
        let id = world.routes.id_by_number(5).unwrap();
        assert_eq!(world.junction_or_empty(at(4, 4)).pavement_at(East), Pavement::Undivided2);
        assert_eq!(world.junction_or_empty(at(6, 4)).pavement_at(West), Pavement::Undivided2);
        assert_eq!(route_length(&world, at(4, 4), id), 2);

        let route = world.routes.get(id).unwrap();
        assert_eq!(route.log_direction, East);
        assert_eq!(route.start, at(4, 4));
        assert_eq!(route.end, at(6, 4));
    }

    #[test]
    fn test_single_segment_surface() {
        let mut world = land_world();
        pave_segment(&mut world, at(4, 4), East, Pavement::Undivided2).unwrap();
        pave_segment(&mut world, at(5, 4), East, Pavement::Undivided2).unwrap();
        let id = add_or_create_route_number(&mut world, 5, at(4, 4), East, East).unwrap();
        let again = add_or_create_route_number(&mut world, 5, at(5, 4), East, East).unwrap();
        assert_eq!(id, again);
        assert_eq!(world.routes.len(), 1);
        assert_eq!(route_length(&world, at(4, 4), id), 2);
    }

    #[test]
    fn test_extending_against_log_direction() {
        let mut world = land_world();
        pave_path(&mut world, &east_path(), Pavement::Undivided2).unwrap();
        number_path(&mut world, &east_path(), NumberAction::Add, &[RouteSpec::new(6, East)]).unwrap();

        // renumbering the same road drawn westward changes nothing
        let before = world.clone();
        let reversed: Vec<TileCoord> = east_path().into_iter().rev().collect();
        number_path(&mut world, &reversed, NumberAction::Add, &[RouteSpec::new(6, West)]).unwrap();
        assert_eq!(world, before);

        // a westward extension becomes the route's new start
        let extension = vec![at(4, 4), at(3, 4)];
        pave_path(&mut world, &extension, Pavement::Undivided2).unwrap();
        number_path(&mut world, &extension, NumberAction::Add, &[RouteSpec::new(6, West)]).unwrap();
        let id = world.routes.id_by_number(6).unwrap();
        assert_eq!(world.routes.get(id).unwrap().start, at(3, 4));
        assert_eq!(route_length(&world, at(3, 4), id), 3);
    }

    #[test]
    fn test_numbering_validates_heading() {
        let mut world = land_world();
        pave_path(&mut world, &east_path(), Pavement::Undivided2).unwrap();
        add_or_create_route_number(&mut world, 5, at(4, 4), East, East).unwrap();

        assert_eq!(
            add_or_create_route_number(&mut world, 5, at(5, 4), East, North),
            Err(EditError::WrongAxis {
                number: 5,
                log_direction: East,
                heading: North
            })
        );
        assert_eq!(
            add_or_create_route_number(&mut world, 9, at(5, 4), East, NorthEast),
            Err(EditError::InvalidLogDirection(NorthEast))
        );
        assert_eq!(world.routes.len(), 1);
    }

    #[test]
    fn test_numbering_needs_pavement_and_room() {
        let mut world = land_world();
        assert_eq!(
            add_or_create_route_number(&mut world, 5, at(4, 4), East, East),
            Err(EditError::Unpaved(at(4, 4), East))
        );
        pave_segment(&mut world, at(4, 4), East, Pavement::Undivided2).unwrap();
        add_or_create_route_number(&mut world, 1, at(4, 4), East, East).unwrap();
        add_or_create_route_number(&mut world, 2, at(4, 4), East, East).unwrap();
        assert_eq!(
            add_or_create_route_number(&mut world, 3, at(4, 4), East, East),
            Err(EditError::LegFull(at(4, 4), East))
        );
        // re-adding a route already on the leg is fine
        assert!(add_or_create_route_number(&mut world, 1, at(4, 4), East, East).is_ok());
    }

    #[test]
    fn test_remove_missing_route_is_noop() {
        let mut world = land_world();
        pave_path(&mut world, &east_path(), Pavement::Undivided2).unwrap();
        number_path(&mut world, &east_path(), NumberAction::Add, &[RouteSpec::new(5, East)]).unwrap();
        let other = world.routes.register(8, North, at(9, 9), at(9, 8)).unwrap();

        let before = world.clone();
        assert_eq!(remove_route_number(&mut world, at(4, 4), East, other), Ok(()));
        assert_eq!(remove_route_number(&mut world, at(9, 9), North, other), Ok(()));
        assert!(world.junction(at(9, 9)).is_none());
        assert_eq!(world.junction_or_empty(at(4, 4)), before.junction_or_empty(at(4, 4)));
        assert_eq!(world.junction_or_empty(at(5, 4)), before.junction_or_empty(at(5, 4)));
    }

    #[test]
    fn test_remove_path_requires_existing_number() {
        let mut world = land_world();
        pave_path(&mut world, &east_path(), Pavement::Undivided2).unwrap();
        let err = number_path(&mut world, &east_path(), NumberAction::Remove, &[RouteSpec::new(40, East)]).unwrap_err();
        assert_eq!(err.applied, 0);
        assert_eq!(err.source, EditError::NoSuchRoute(40));
        assert!(world.routes.is_empty());
    }

    #[test]
    fn test_failed_numbering_creates_no_route() {
        let mut world = land_world();
        let err = number_path(&mut world, &east_path(), NumberAction::Add, &[RouteSpec::new(5, East)]).unwrap_err();
        assert_eq!(err.applied, 0);
        assert_eq!(err.source, EditError::Unpaved(at(4, 4), East));
        let err = number_path(&mut world, &east_path(), NumberAction::Set, &[RouteSpec::new(5, East)]).unwrap_err();
        assert_eq!(err.source, EditError::Unpaved(at(4, 4), East));
        assert!(world.routes.is_empty());

        // a bad second number keeps the first from being created
        pave_path(&mut world, &east_path(), Pavement::Undivided2).unwrap();
        world.routes.register(7, North, at(9, 9), at(9, 8)).unwrap();
        let err = number_path(
            &mut world,
            &east_path(),
            NumberAction::Add,
            &[RouteSpec::new(5, East), RouteSpec::new(7, East)],
        )
        .unwrap_err();
        assert_eq!(err.applied, 0);
        assert!(matches!(err.source, EditError::WrongAxis { number: 7, .. }));
        assert_eq!(world.routes.len(), 1);
        assert!(world.routes.id_by_number(5).is_none());
        assert!(world.junction_or_empty(at(4, 4)).has_no_routes(East));
    }

    #[test]
    fn test_set_replaces_existing_numbers() {
        let mut world = land_world();
        let path = east_path();
        pave_path(&mut world, &path, Pavement::Undivided2).unwrap();
        number_path(&mut world, &path, NumberAction::Add, &[RouteSpec::new(5, East)]).unwrap();
        let err = number_path(&mut world, &path, NumberAction::Set, &[RouteSpec::new(5, North)]).unwrap_err();
        assert_eq!(err.applied, 0);
        number_path(&mut world, &path, NumberAction::Set, &[RouteSpec::new(8, East)]).unwrap();

        let five = world.routes.id_by_number(5).unwrap();
        let eight = world.routes.id_by_number(8).unwrap();
        let j = world.junction_or_empty(at(5, 4));
        assert!(!j.contains_route(five));
        assert!(j.contains_route(eight));
    }

    #[test]
    fn test_erase_clears_both_legs() {
        let mut world = land_world();
        pave_path(&mut world, &east_path(), Pavement::Undivided2).unwrap();
        number_path(&mut world, &east_path(), NumberAction::Add, &[RouteSpec::new(5, East)]).unwrap();
        name_path(&mut world, &east_path(), "Harbor Rd").unwrap();

        erase_segment(&mut world, at(4, 4), East).unwrap();
        assert!(world.junction(at(4, 4)).is_none());
        assert_eq!(*world.junction_or_empty(at(4, 4)).leg(East), crate::junction::Leg::EMPTY);
        assert_eq!(*world.junction_or_empty(at(5, 4)).leg(West), crate::junction::Leg::EMPTY);
        // the rest of the road is untouched and the route now starts later
        assert!(!world.junction_or_empty(at(5, 4)).is_empty(East));
        let id = world.routes.id_by_number(5).unwrap();
        assert_eq!(world.routes.get(id).unwrap().start, at(5, 4));
    }

    #[test]
    fn test_pave_path_stops_at_water() {
        let mut world = land_world();
        let path = vec![at(2, 4), at(1, 4), at(0, 4)];
        let err = pave_path(&mut world, &path, Pavement::Dirt).unwrap_err();
        assert_eq!(err.applied, 1);
        assert_eq!(err.source, EditError::Rejected(PaveRejection::NeighborWater(at(0, 4))));
        // first step stays applied
        assert_eq!(world.junction_or_empty(at(2, 4)).pavement_at(West), Pavement::Dirt);
    }

    #[test]
    fn test_path_with_gap_is_rejected() {
        let mut world = land_world();
        let path = vec![at(4, 4), at(5, 4), at(7, 4)];
        let err = pave_path(&mut world, &path, Pavement::Dirt).unwrap_err();
        assert_eq!(err.applied, 1);
        assert_eq!(err.source, EditError::NotAdjacent(at(5, 4), at(7, 4)));
        assert_eq!(pave_path(&mut world, &[at(4, 4)], Pavement::Dirt).unwrap_err().source, EditError::EmptyPath);
    }

    #[test]
    fn test_name_path() {
        let mut world = land_world();
        pave_path(&mut world, &east_path(), Pavement::Undivided2).unwrap();
        assert_eq!(name_path(&mut world, &east_path(), "Harbor Rd"), Ok(2));
        let id = world.streets.id_by_name("harbor rd").unwrap();
        assert_eq!(world.junction_or_empty(at(6, 4)).street_at(West), Some(id));
        assert_eq!(name_path(&mut world, &east_path(), "  ").unwrap_err().source, EditError::EmptyName);
        assert_eq!(
            add_or_create_street_name(&mut world, "harbor rd", at(4, 4), East),
            Ok(id)
        );
        assert_eq!(world.streets.len(), 1);
    }
}
