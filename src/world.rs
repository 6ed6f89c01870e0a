//! World data container module
//!
//! Bundles the tile grid, towns, routes and streets, and provides the
//! primitives every other part writes roads through. A road segment always
//! touches two tiles: the leg leaving `here` and the reciprocal leg entering
//! the neighbor, so the `*_both` writers are the only way roads get laid.

use serde::Serialize;

use crate::direction::Direction;
use crate::error::{EditError, PaveRejection, RenameError, WorldError};
use crate::grid::{Terrain, Tile, TileCoord};
use crate::junction::{Junction, JunctionLabels, Pavement, RouteId, StreetId, StreetSlot};
use crate::params::validate_dimensions;
use crate::route::RouteRegistry;
use crate::street::StreetRegistry;
use crate::tilemap::Tilemap;
use crate::town::{Town, TownId};

/// Everything known about one leg, for tools that pick up road attributes
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LegInfo {
    pub pavement: Pavement,
    pub route_numbers: Vec<u32>,
    pub street: Option<String>,
    pub town: Option<String>,
}

/// All island data bundled together
#[derive(Clone, Debug, PartialEq)]
pub struct World {
    /// Map width in tiles
    pub width: usize,
    /// Map height in tiles
    pub height: usize,
    tiles: Tilemap<Tile>,
    /// Town table; `TownId::index` points here
    pub towns: Vec<Town>,
    pub routes: RouteRegistry,
    pub streets: StreetRegistry,
}

impl World {
    /// An all-water world with no towns or roads
    pub fn new(width: usize, height: usize) -> Result<Self, WorldError> {
        validate_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            tiles: Tilemap::new(width, height),
            towns: Vec::new(),
            routes: RouteRegistry::new(),
            streets: StreetRegistry::new(),
        })
    }

    pub fn tiles(&self) -> &Tilemap<Tile> {
        &self.tiles
    }

    pub(crate) fn tiles_mut(&mut self) -> &mut Tilemap<Tile> {
        &mut self.tiles
    }

    pub fn in_bounds(&self, at: TileCoord) -> bool {
        self.tiles.in_bounds(at.x, at.y)
    }

    pub fn tile(&self, at: TileCoord) -> Option<&Tile> {
        self.tiles.get(at.x, at.y)
    }

    pub fn tile_mut(&mut self, at: TileCoord) -> Option<&mut Tile> {
        self.tiles.get_mut(at.x, at.y)
    }

    /// Neighbor toward `dir`, if it is on the grid
    pub fn neighbor(&self, at: TileCoord, dir: Direction) -> Option<TileCoord> {
        at.step(dir).filter(|&next| self.in_bounds(next))
    }

    // =========================================================================
    // Terrain and towns
    // =========================================================================

    pub fn terrain(&self, at: TileCoord) -> Option<Terrain> {
        self.tile(at).map(|t| t.terrain)
    }

    /// Off-grid counts as not land
    pub fn is_land(&self, at: TileCoord) -> bool {
        self.tile(at).is_some_and(Tile::is_land)
    }

    /// Fill a rectangle with one terrain type, clipped to the grid
    pub fn fill_terrain(&mut self, x0: usize, y0: usize, w: usize, h: usize, terrain: Terrain) {
        let x1 = (x0 + w).min(self.width);
        let y1 = (y0 + h).min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                if let Some(tile) = self.tiles.get_mut(x, y) {
                    tile.terrain = terrain;
                }
            }
        }
    }

    /// Count of land tiles
    pub fn land_area(&self) -> usize {
        self.tiles.iter().filter(|(_, _, t)| t.is_land()).count()
    }

    pub fn town_at(&self, at: TileCoord) -> Option<TownId> {
        self.tile(at).and_then(Tile::town)
    }

    pub fn town(&self, id: TownId) -> Option<&Town> {
        self.towns.get(id.index())
    }

    /// Display name of an optional town; unowned land reads as "rural"
    pub fn town_name(&self, id: Option<TownId>) -> &str {
        id.and_then(|id| self.town(id)).map_or("rural", |t| t.name.as_str())
    }

    /// Case-insensitive town lookup
    pub fn town_by_name(&self, name: &str) -> Option<TownId> {
        self.towns
            .iter()
            .position(|t| t.name.eq_ignore_ascii_case(name))
            .and_then(TownId::from_index)
    }

    /// Town whose center is exactly this tile
    pub fn town_center_at(&self, at: TileCoord) -> Option<TownId> {
        self.towns
            .iter()
            .position(|t| t.center == at)
            .and_then(TownId::from_index)
    }

    // =========================================================================
    // Junctions
    // =========================================================================

    /// Junction of a tile that has one
    pub fn junction(&self, at: TileCoord) -> Option<&Junction> {
        self.tile(at).and_then(|t| t.junction.as_ref())
    }

    /// Junction of a tile, or a shared empty one; never allocates
    pub fn junction_or_empty(&self, at: TileCoord) -> &Junction {
        self.tile(at).map_or(&Junction::EMPTY, Tile::junction_or_empty)
    }

    // =========================================================================
    // Pave checks
    // =========================================================================

    /// Can a leg be paved out of `at` toward `heading`? Returns the neighbor.
    pub fn check_pave(&self, at: TileCoord, heading: Direction) -> Result<TileCoord, PaveRejection> {
        if !self.is_land(at) {
            return Err(PaveRejection::Water(at));
        }
        if !self.junction_or_empty(at).is_suitable_for_leg(heading) {
            return Err(PaveRejection::UnsuitableLeg(at, heading));
        }
        let next = self
            .neighbor(at, heading)
            .ok_or(PaveRejection::OffGrid(at, heading))?;
        if !self.is_land(next) {
            return Err(PaveRejection::NeighborWater(next));
        }
        let reverse = heading.reverse();
        if !self.junction_or_empty(next).is_suitable_for_leg(reverse) {
            return Err(PaveRejection::NeighborUnsuitable(next, reverse));
        }

        // no X where two diagonals would cross between tiles
        if heading.is_diagonal() {
            let crossing = [
                (heading.turned(-1), heading.turned(2)),
                (heading.turned(1), heading.turned(-2)),
            ];
            for (side, leg) in crossing {
                let blocked = self
                    .neighbor(at, side)
                    .is_some_and(|flank| !self.junction_or_empty(flank).is_empty(leg));
                if blocked {
                    return Err(PaveRejection::CrossesDiagonal(at, heading));
                }
            }
        }
        Ok(next)
    }

    pub fn cant_pave(&self, at: TileCoord, heading: Direction) -> bool {
        self.check_pave(at, heading).is_err()
    }

    /// Route ids can't go here: bad pavement or both route slots taken
    pub fn cant_add_route(&self, at: TileCoord, heading: Direction) -> bool {
        self.cant_pave(at, heading) || self.junction_or_empty(at).is_full(heading)
    }

    /// Streets need their own fresh leg
    pub fn cant_add_street(&self, at: TileCoord, heading: Direction) -> bool {
        self.cant_pave(at, heading) || !self.junction_or_empty(at).is_empty(heading)
    }

    // =========================================================================
    // Two-tile writers
    // =========================================================================

    /// Both ends of a segment, checked to be on the grid
    fn segment(&self, here: TileCoord, heading: Direction) -> Result<TileCoord, EditError> {
        if !self.in_bounds(here) {
            return Err(EditError::OffGrid(here));
        }
        self.neighbor(here, heading)
            .ok_or(EditError::Rejected(PaveRejection::OffGrid(here, heading)))
    }

    /// Apply `edit` to the leg out of `here` and the reciprocal leg of the
    /// neighbor; returns the neighbor. Junctions are created only when
    /// `create` is set and dropped again once they hold nothing.
    fn edit_both(
        &mut self,
        here: TileCoord,
        heading: Direction,
        create: bool,
        mut edit: impl FnMut(&mut Junction, Direction, bool),
    ) -> Result<TileCoord, EditError> {
        let next = self.segment(here, heading)?;
        self.edit_tile(here, create, |j| edit(j, heading, true));
        self.edit_tile(next, create, |j| edit(j, heading.reverse(), false));
        Ok(next)
    }

    fn edit_tile(&mut self, at: TileCoord, create: bool, edit: impl FnOnce(&mut Junction)) {
        let Some(tile) = self.tile_mut(at) else {
            return;
        };
        if create {
            edit(tile.junction_mut());
        } else if let Some(j) = tile.junction.as_mut() {
            edit(j);
        }
        if tile.junction.as_ref().is_some_and(Junction::is_blank) {
            tile.junction = None;
        }
    }

    /// Widen the pavement and add the route id on both tiles
    pub fn add_route_both(
        &mut self,
        here: TileCoord,
        heading: Direction,
        id: RouteId,
        pavement: Pavement,
        forward: bool,
    ) -> Result<TileCoord, EditError> {
        self.edit_both(here, heading, true, |j, dir, _| j.set_wider_pavement(dir, pavement))?;
        self.add_rid_both(here, heading, id, forward)
    }

    /// Add a route id to both tiles without touching pavement.
    ///
    /// `heading` is the segment's compass heading. With `forward` the route's
    /// log direction runs along it, so the leg out of `here` carries the
    /// forward flag; otherwise the neighbor's leg does.
    pub fn add_rid_both(
        &mut self,
        here: TileCoord,
        heading: Direction,
        id: RouteId,
        forward: bool,
    ) -> Result<TileCoord, EditError> {
        self.edit_both(here, heading, true, |j, dir, is_here| j.add_rid(dir, id, is_here == forward))
    }

    pub fn remove_rid_both(&mut self, here: TileCoord, heading: Direction, id: RouteId) -> Result<TileCoord, EditError> {
        self.edit_both(here, heading, false, |j, dir, _| j.remove_rid(dir, id))
    }

    pub fn clear_rids_both(&mut self, here: TileCoord, heading: Direction) -> Result<TileCoord, EditError> {
        self.edit_both(here, heading, false, |j, dir, _| j.clear_rids(dir))
    }

    /// Add a street on both tiles, widening pavement
    pub fn add_street_both(
        &mut self,
        here: TileCoord,
        heading: Direction,
        id: StreetId,
        pavement: Pavement,
        forward: bool,
    ) -> Result<TileCoord, EditError> {
        self.edit_both(here, heading, true, |j, dir, is_here| {
            j.add_street(dir, id, pavement, is_here == forward)
        })
    }

    /// Overwrite the street id on both tiles; pavement untouched
    pub fn set_street_both(&mut self, here: TileCoord, heading: Direction, id: StreetId) -> Result<TileCoord, EditError> {
        self.edit_both(here, heading, true, |j, dir, is_here| {
            j.set_street(dir, StreetSlot { id, forward: is_here }, true)
        })
    }

    /// Overwrite pavement on both tiles
    pub fn set_pave_both(&mut self, here: TileCoord, heading: Direction, pavement: Pavement) -> Result<TileCoord, EditError> {
        self.edit_both(here, heading, true, |j, dir, _| j.set_pavement(dir, pavement))
    }

    /// Remove pavement, routes and street from both legs
    pub fn clear_leg_both(&mut self, here: TileCoord, heading: Direction) -> Result<TileCoord, EditError> {
        self.edit_both(here, heading, false, |j, dir, _| j.clear_leg(dir))
    }

    // =========================================================================
    // Renames
    // =========================================================================

    pub fn rename_route(&mut self, old: u32, new: u32) -> Result<RouteId, RenameError> {
        let id = self
            .routes
            .id_by_number(old)
            .ok_or_else(|| RenameError::NotFound(old.to_string()))?;
        if self.routes.id_by_number(new).is_some_and(|other| other != id) {
            return Err(RenameError::AlreadyExists(new.to_string()));
        }
        if let Some(route) = self.routes.get_mut(id) {
            route.number = new;
        }
        Ok(id)
    }

    pub fn rename_street(&mut self, old: &str, new: &str) -> Result<StreetId, RenameError> {
        self.streets.rename(old, new)
    }

    pub fn rename_town(&mut self, old: &str, new: &str) -> Result<TownId, RenameError> {
        let id = self
            .town_by_name(old)
            .ok_or_else(|| RenameError::NotFound(old.to_string()))?;
        if self.town_by_name(new).is_some_and(|other| other != id) {
            return Err(RenameError::AlreadyExists(new.to_string()));
        }
        self.towns[id.index()].name = new.to_string();
        Ok(id)
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Route numbers, street name, pavement and town of one leg
    pub fn inspect_leg(&self, at: TileCoord, dir: Direction) -> LegInfo {
        let j = self.junction_or_empty(at);
        LegInfo {
            pavement: j.pavement_at(dir),
            route_numbers: j
                .routes_at(dir)
                .into_iter()
                .flatten()
                .filter_map(|id| self.routes.number_of(id))
                .collect(),
            street: j.street_at(dir).and_then(|id| self.streets.name(id)).map(str::to_string),
            town: self.town_at(at).and_then(|id| self.town(id)).map(|t| t.name.clone()),
        }
    }
}

impl JunctionLabels for World {
    fn route_number(&self, id: RouteId) -> Option<u32> {
        self.routes.number_of(id)
    }

    fn street_name(&self, id: StreetId) -> Option<&str> {
        self.streets.name(id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use Direction::*;

    /// 20x20 world with land everywhere but a 1-tile water rim
    pub(crate) fn land_world() -> World {
        let mut world = World::new(20, 20).unwrap();
        world.fill_terrain(1, 1, 18, 18, Terrain::Land);
        world
    }

    fn at(x: usize, y: usize) -> TileCoord {
        TileCoord::new(x, y)
    }

    #[test]
    fn test_new_rejects_small_grids() {
        assert!(matches!(World::new(10, 40), Err(WorldError::InvalidDimensions { .. })));
        let world = World::new(16, 16).unwrap();
        assert_eq!(world.land_area(), 0);
    }

    #[test]
    fn test_fill_terrain_clips() {
        let mut world = World::new(16, 16).unwrap();
        world.fill_terrain(10, 10, 20, 20, Terrain::Land);
        assert_eq!(world.land_area(), 36);
    }

    #[test]
    fn test_reads_never_create_junctions() {
        let world = land_world();
        assert!(world.junction_or_empty(at(5, 5)).is_blank());
        assert!(world.junction(at(5, 5)).is_none());
        assert!(world.junction_or_empty(at(50, 5)).is_blank());
    }

    #[test]
    fn test_check_pave_rejects_water_and_edges() {
        let world = land_world();
        assert_eq!(world.check_pave(at(0, 5), East), Err(PaveRejection::Water(at(0, 5))));
        assert_eq!(world.check_pave(at(1, 5), West), Err(PaveRejection::NeighborWater(at(0, 5))));
        assert_eq!(world.check_pave(at(5, 5), East), Ok(at(6, 5)));

        let mut edge = World::new(16, 16).unwrap();
        edge.fill_terrain(0, 0, 16, 16, Terrain::Land);
        assert_eq!(edge.check_pave(at(0, 0), North), Err(PaveRejection::OffGrid(at(0, 0), North)));
    }

    #[test]
    fn test_check_pave_blocks_crossing_diagonals() {
        let mut world = land_world();
        // (6,5) -> (5,6) runs southwest; (5,5) -> (6,6) southeast would cross it
        world.set_pave_both(at(6, 5), SouthWest, Pavement::Undivided2).unwrap();
        assert_eq!(
            world.check_pave(at(5, 5), SouthEast),
            Err(PaveRejection::CrossesDiagonal(at(5, 5), SouthEast))
        );
        assert!(!world.cant_pave(at(5, 5), East));
    }

    #[test]
    fn test_check_pave_reports_unsuitable_neighbor() {
        let mut world = land_world();
        // give (6,5) a north leg and a northeast leg; an incoming west leg
        // then squeezes three legs into a half circle
        world.set_pave_both(at(6, 5), North, Pavement::Undivided2).unwrap();
        world.set_pave_both(at(6, 5), NorthEast, Pavement::Undivided2).unwrap();
        assert!(!world.junction_or_empty(at(6, 5)).is_suitable_for_leg(East));
        assert!(world.cant_pave(at(7, 5), West));
    }

    #[test]
    fn test_add_rid_both_sets_flags() {
        let mut world = land_world();
        let id = RouteId::new(1).unwrap();
        world.add_route_both(at(5, 5), East, id, Pavement::Undivided2, true).unwrap();
        let here = world.junction_or_empty(at(5, 5));
        let next = world.junction_or_empty(at(6, 5));
        assert!(here.is_route_forward_at(East, 0));
        assert_eq!(next.route_at(West, 0), Some(id));
        assert!(!next.is_route_forward_at(West, 0));
        assert_eq!(next.pavement_at(West), Pavement::Undivided2);

        world.add_rid_both(at(5, 6), East, id, false).unwrap();
        assert!(!world.junction_or_empty(at(5, 6)).is_route_forward_at(East, 0));
        assert!(world.junction_or_empty(at(6, 6)).is_route_forward_at(West, 0));
    }

    #[test]
    fn test_clear_leg_both_clears_reciprocal() {
        let mut world = land_world();
        let street = world.streets.register("Harbor Rd").unwrap();
        world.add_street_both(at(5, 5), South, street, Pavement::Dirt, true).unwrap();
        world.add_rid_both(at(5, 5), South, RouteId::new(1).unwrap(), true).unwrap();
        world.clear_leg_both(at(5, 5), South).unwrap();
        assert!(world.junction_or_empty(at(5, 5)).is_blank());
        assert!(world.junction_or_empty(at(5, 6)).is_blank());
    }

    #[test]
    fn test_clearing_never_leaves_junctions() {
        let mut world = land_world();
        let id = RouteId::new(1).unwrap();
        world.remove_rid_both(at(5, 5), East, id).unwrap();
        world.clear_rids_both(at(5, 5), East).unwrap();
        world.clear_leg_both(at(5, 5), East).unwrap();
        assert!(world.junction(at(5, 5)).is_none());
        assert!(world.junction(at(6, 5)).is_none());

        world.set_pave_both(at(5, 5), East, Pavement::Dirt).unwrap();
        world.set_pave_both(at(5, 5), South, Pavement::Dirt).unwrap();
        world.clear_leg_both(at(5, 5), East).unwrap();
        assert!(world.junction(at(6, 5)).is_none());
        assert!(world.junction(at(5, 5)).is_some());
        world.clear_leg_both(at(5, 5), South).unwrap();
        assert!(world.junction(at(5, 5)).is_none());
        assert!(world.junction(at(5, 6)).is_none());
    }

    #[test]
    fn test_writers_reject_off_grid_segments() {
        let mut world = land_world();
        assert!(world.set_pave_both(at(19, 5), East, Pavement::Dirt).is_err());
        assert!(world.set_pave_both(at(30, 5), East, Pavement::Dirt).is_err());
        assert!(world.junction(at(19, 5)).is_none());
    }

    #[test]
    fn test_renames() {
        let mut world = land_world();
        world.towns.push(Town::new("Ashford", at(3, 3)));
        world.towns.push(Town::new("Oakdale", at(9, 9)));
        world.routes.register(5, East, at(1, 1), at(2, 1)).unwrap();
        world.routes.register(7, North, at(1, 1), at(1, 0)).unwrap();

        assert_eq!(world.rename_route(9, 11), Err(RenameError::NotFound("9".to_string())));
        assert_eq!(world.rename_route(5, 7), Err(RenameError::AlreadyExists("7".to_string())));
        let five = world.routes.id_by_number(5);
        assert_eq!(world.rename_route(5, 5).ok(), five);
        assert!(world.rename_route(5, 12).is_ok());
        assert!(world.routes.id_by_number(12).is_some());

        assert_eq!(
            world.rename_town("oakdale", "ASHFORD"),
            Err(RenameError::AlreadyExists("ASHFORD".to_string()))
        );
        assert!(world.rename_town("oakdale", "Oak Harbor").is_ok());
        assert_eq!(world.town_by_name("oak harbor"), TownId::new(2));
        assert_eq!(world.town_center_at(at(9, 9)), TownId::new(2));
    }

    #[test]
    fn test_inspect_leg() {
        let mut world = land_world();
        world.towns.push(Town::new("Ashford", at(5, 5)));
        if let Some(tile) = world.tile_mut(at(5, 5)) {
            tile.town = TownId::new(1);
        }
        let id = world.routes.register(4, East, at(5, 5), at(6, 5)).unwrap();
        let street = world.streets.register("Main St").unwrap();
        world.add_street_both(at(5, 5), East, street, Pavement::Undivided4, true).unwrap();
        world.add_rid_both(at(5, 5), East, id, true).unwrap();

        let info = world.inspect_leg(at(5, 5), East);
        assert_eq!(info.pavement, Pavement::Undivided4);
        assert_eq!(info.route_numbers, vec![4]);
        assert_eq!(info.street.as_deref(), Some("Main St"));
        assert_eq!(info.town.as_deref(), Some("Ashford"));
        assert_eq!(world.inspect_leg(at(5, 5), North), LegInfo::default());
    }
}
