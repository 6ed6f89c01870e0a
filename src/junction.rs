//! Per-tile intersection layout
//!
//! Every tile that carries road owns one `Junction`. A junction has a leg for
//! each of the 8 compass directions; a leg holds the pavement type heading out
//! of the tile, up to two concurrent route ids, and one street id.
//!
//! Route and street ids are weak references into the registries. A forward
//! flag on a slot means the route's log direction leaves the tile through that
//! leg; the neighboring tile's reciprocal leg carries the same id entering.

use std::fmt;
use std::num::NonZeroU16;

use serde::{Deserialize, Serialize};

use crate::direction::{Direction, NUM_DIRECTIONS};

/// Highest id a route or street may have (10-bit id space, 0 reserved)
pub const MAX_ID: u16 = 1023;

/// How many numbered routes can share one leg
pub const MAX_OVERLAPPING_ROUTES: usize = 2;

/// Index into the route registry. Never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteId(NonZeroU16);

impl RouteId {
    /// Valid ids are 1..=MAX_ID
    pub fn new(id: u16) -> Option<Self> {
        if id > MAX_ID {
            return None;
        }
        NonZeroU16::new(id).map(Self)
    }

    pub fn get(self) -> u16 {
        self.0.get()
    }

    /// Zero-based slot in a registry table
    pub fn index(self) -> usize {
        self.0.get() as usize - 1
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rid {}", self.0)
    }
}

/// Index into the street registry. Never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StreetId(NonZeroU16);

impl StreetId {
    /// Valid ids are 1..=MAX_ID
    pub fn new(id: u16) -> Option<Self> {
        if id > MAX_ID {
            return None;
        }
        NonZeroU16::new(id).map(Self)
    }

    pub fn get(self) -> u16 {
        self.0.get()
    }

    pub fn index(self) -> usize {
        self.0.get() as usize - 1
    }
}

impl fmt::Display for StreetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sid {}", self.0)
    }
}

/// Road width/surface class of a leg. Ordered narrowest to widest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pavement {
    #[default]
    None,
    Dirt,
    Undivided2,
    Undivided4,
    Divided4,
    Divided6,
}

impl Pavement {
    pub fn label(self) -> &'static str {
        match self {
            Pavement::None => "no road",
            Pavement::Dirt => "dirt road",
            Pavement::Undivided2 => "2 lane",
            Pavement::Undivided4 => "4 lane",
            Pavement::Divided4 => "4 lane div",
            Pavement::Divided6 => "6 lane div",
        }
    }

    pub fn is_divided(self) -> bool {
        matches!(self, Pavement::Divided4 | Pavement::Divided6)
    }

    pub fn lanes(self) -> u32 {
        match self {
            Pavement::None => 0,
            Pavement::Dirt | Pavement::Undivided2 => 2,
            Pavement::Undivided4 | Pavement::Divided4 => 4,
            Pavement::Divided6 => 6,
        }
    }
}

/// Route id on a leg plus whether the route's log direction exits here
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RouteSlot {
    pub id: RouteId,
    pub forward: bool,
}

/// Street id on a leg plus direction flag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StreetSlot {
    pub id: StreetId,
    pub forward: bool,
}

/// One of the 8 legs of a junction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Leg {
    pub pavement: Pavement,
    /// Filled low to high, no gaps, no duplicate ids
    pub routes: [Option<RouteSlot>; MAX_OVERLAPPING_ROUTES],
    pub street: Option<StreetSlot>,
}

impl Leg {
    pub const EMPTY: Leg = Leg {
        pavement: Pavement::None,
        routes: [None; MAX_OVERLAPPING_ROUTES],
        street: None,
    };

    fn has_route(&self, id: RouteId) -> bool {
        self.routes.iter().flatten().any(|slot| slot.id == id)
    }

    fn has_route_slot(&self, id: RouteId, forward: bool) -> bool {
        self.routes.iter().flatten().any(|slot| slot.id == id && slot.forward == forward)
    }
}

/// Shape of the intersection, from the count of paved legs
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntersectionType {
    Empty,
    DeadEnd,
    Straight,
    Curve,
    ThreeWay,
    FourWay,
    /// More than 4 legs
    Unknown,
}

/// Lookup of display labels for the ids a junction stores
pub trait JunctionLabels {
    fn route_number(&self, id: RouteId) -> Option<u32>;
    fn street_name(&self, id: StreetId) -> Option<&str>;
}

/// Layout of the roads meeting in one tile
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Junction {
    legs: [Leg; NUM_DIRECTIONS],
}

impl Junction {
    pub const EMPTY: Junction = Junction {
        legs: [Leg::EMPTY; NUM_DIRECTIONS],
    };

    pub fn new() -> Self {
        Self::EMPTY
    }

    pub fn leg(&self, dir: Direction) -> &Leg {
        &self.legs[dir.index()]
    }

    /// Remove pavement, route ids and street id from one leg
    pub fn clear_leg(&mut self, dir: Direction) {
        self.legs[dir.index()] = Leg::EMPTY;
    }

    /// True if nothing at all is stored on any leg
    pub fn is_blank(&self) -> bool {
        self.legs.iter().all(|leg| *leg == Leg::EMPTY)
    }

    // =========================================================================
    // Pavement
    // =========================================================================

    pub fn pavement_at(&self, dir: Direction) -> Pavement {
        self.legs[dir.index()].pavement
    }

    pub fn is_empty(&self, dir: Direction) -> bool {
        self.pavement_at(dir) == Pavement::None
    }

    /// Overwrite the pavement type of a leg
    pub fn set_pavement(&mut self, dir: Direction, pavement: Pavement) {
        self.legs[dir.index()].pavement = pavement;
    }

    /// Set the pavement only if the existing one is narrower
    pub fn set_wider_pavement(&mut self, dir: Direction, pavement: Pavement) {
        if self.pavement_at(dir) < pavement {
            self.set_pavement(dir, pavement);
        }
    }

    pub fn is_divided(&self, dir: Direction) -> bool {
        self.pavement_at(dir).is_divided()
    }

    pub fn count_lanes(&self, dir: Direction) -> u32 {
        self.pavement_at(dir).lanes()
    }

    fn paved_legs(&self) -> usize {
        self.legs.iter().filter(|leg| leg.pavement != Pavement::None).count()
    }

    // =========================================================================
    // Route ids
    // =========================================================================

    pub fn route_at(&self, dir: Direction, slot: usize) -> Option<RouteId> {
        self.legs[dir.index()].routes.get(slot).copied().flatten().map(|s| s.id)
    }

    pub fn routes_at(&self, dir: Direction) -> [Option<RouteId>; MAX_OVERLAPPING_ROUTES] {
        self.legs[dir.index()].routes.map(|slot| slot.map(|s| s.id))
    }

    pub fn is_route_forward_at(&self, dir: Direction, slot: usize) -> bool {
        matches!(self.legs[dir.index()].routes.get(slot), Some(Some(s)) if s.forward)
    }

    /// There might be a road here, but no numbered route
    pub fn has_no_routes(&self, dir: Direction) -> bool {
        self.legs[dir.index()].routes[0].is_none()
    }

    /// No room to add another route to this leg
    pub fn is_full(&self, dir: Direction) -> bool {
        self.legs[dir.index()].routes.iter().all(Option::is_some)
    }

    /// Append a route id to the first free slot of a leg. Pavement is left
    /// alone. Does nothing if the id is already there or the leg is full;
    /// check `is_full` first.
    pub fn add_rid(&mut self, dir: Direction, id: RouteId, forward: bool) {
        let leg = &mut self.legs[dir.index()];
        if leg.has_route(id) {
            return;
        }
        if let Some(free) = leg.routes.iter_mut().find(|slot| slot.is_none()) {
            *free = Some(RouteSlot { id, forward });
        }
    }

    /// Remove a route id from a leg regardless of its flag; the remaining
    /// slot moves down to index 0.
    pub fn remove_rid(&mut self, dir: Direction, id: RouteId) {
        let leg = &mut self.legs[dir.index()];
        let kept: Vec<RouteSlot> = leg.routes.iter().flatten().copied().filter(|s| s.id != id).collect();
        leg.routes = [None; MAX_OVERLAPPING_ROUTES];
        for (slot, value) in leg.routes.iter_mut().zip(kept) {
            *slot = Some(value);
        }
    }

    pub fn clear_rids(&mut self, dir: Direction) {
        self.legs[dir.index()].routes = [None; MAX_OVERLAPPING_ROUTES];
    }

    /// Does this junction carry the route on any leg?
    pub fn contains_route(&self, id: RouteId) -> bool {
        self.legs.iter().any(|leg| leg.has_route(id))
    }

    /// First route id found that isn't `id`
    pub fn any_route_except(&self, id: RouteId) -> Option<RouteId> {
        self.legs
            .iter()
            .flat_map(|leg| leg.routes.iter().flatten())
            .map(|slot| slot.id)
            .find(|&other| other != id)
    }

    /// First leg where the route leaves the tile in its log direction
    pub fn forward_direction(&self, id: RouteId) -> Option<Direction> {
        self.find_route_leg(id, true)
    }

    /// First leg where the route enters the tile
    pub fn backward_direction(&self, id: RouteId) -> Option<Direction> {
        self.find_route_leg(id, false)
    }

    fn find_route_leg(&self, id: RouteId, forward: bool) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|&dir| self.legs[dir.index()].has_route_slot(id, forward))
    }

    /// Leg where the route leaves the tile, or None unless exactly one leg
    /// matches and the route touches at most two legs here. Malformed
    /// junctions stop a traversal instead of looping it.
    pub fn forward_direction_strict(&self, id: RouteId) -> Option<Direction> {
        self.find_route_leg_strict(id, true)
    }

    /// Leg where the route enters the tile; same strictness as
    /// `forward_direction_strict`.
    pub fn backward_direction_strict(&self, id: RouteId) -> Option<Direction> {
        self.find_route_leg_strict(id, false)
    }

    fn find_route_leg_strict(&self, id: RouteId, forward: bool) -> Option<Direction> {
        let total_legs = self.legs.iter().filter(|leg| leg.has_route(id)).count();
        if total_legs > 2 {
            return None;
        }
        let mut matching = Direction::ALL
            .into_iter()
            .filter(|&dir| self.legs[dir.index()].has_route_slot(id, forward));
        match (matching.next(), matching.next()) {
            (Some(dir), None) => Some(dir),
            _ => None,
        }
    }

    /// The route leaves but does not enter this tile
    pub fn is_route_start(&self, id: RouteId) -> bool {
        self.forward_direction(id).is_some() && self.backward_direction(id).is_none()
    }

    /// The route enters but does not leave this tile
    pub fn is_route_end(&self, id: RouteId) -> bool {
        self.backward_direction(id).is_some() && self.forward_direction(id).is_none()
    }

    pub fn route_leaves_diagonally(&self, id: RouteId) -> bool {
        self.forward_direction(id).is_some_and(Direction::is_diagonal)
    }

    /// Two or more distinct routes meet here
    pub fn is_route_junction(&self) -> bool {
        let mut ids = self.legs.iter().flat_map(|leg| leg.routes.iter().flatten()).map(|s| s.id);
        match ids.next() {
            Some(first) => ids.any(|id| id != first),
            None => false,
        }
    }

    /// Anything other than the same one or two routes passing through on
    /// exactly two legs
    pub fn is_route_inflection(&self) -> bool {
        let route_legs: Vec<&Leg> = self.legs.iter().filter(|leg| leg.routes[0].is_some()).collect();
        if route_legs.len() != 2 {
            return true;
        }
        let (first, second) = (route_legs[0], route_legs[1]);
        second.routes.iter().flatten().any(|slot| !first.has_route(slot.id))
    }

    // =========================================================================
    // Street ids
    // =========================================================================

    pub fn street_at(&self, dir: Direction) -> Option<StreetId> {
        self.legs[dir.index()].street.map(|s| s.id)
    }

    /// Set the street of a leg; with `overwrite` false an existing street is kept
    pub fn set_street(&mut self, dir: Direction, slot: StreetSlot, overwrite: bool) {
        let leg = &mut self.legs[dir.index()];
        if leg.street.is_none() || overwrite {
            leg.street = Some(slot);
        }
    }

    pub fn clear_street(&mut self, dir: Direction) {
        self.legs[dir.index()].street = None;
    }

    /// Put a street on a leg, widening (never narrowing) its pavement
    pub fn add_street(&mut self, dir: Direction, id: StreetId, pavement: Pavement, forward: bool) {
        self.set_street(dir, StreetSlot { id, forward }, true);
        self.set_wider_pavement(dir, pavement);
    }

    // =========================================================================
    // Intersection shape
    // =========================================================================

    pub fn intersection_type(&self) -> IntersectionType {
        let mut paved = 0;
        let mut two_ways = 0;
        for i in 0..NUM_DIRECTIONS / 2 {
            let a = !self.is_empty(Direction::ALL[i]);
            let b = !self.is_empty(Direction::ALL[i + 4]);
            if a && b {
                two_ways += 1;
            }
            paved += a as usize + b as usize;
        }

        match paved {
            0 => IntersectionType::Empty,
            1 => IntersectionType::DeadEnd,
            2 if two_ways > 0 => IntersectionType::Straight,
            2 => IntersectionType::Curve,
            3 => IntersectionType::ThreeWay,
            4 => IntersectionType::FourWay,
            _ => IntersectionType::Unknown,
        }
    }

    /// Only one paved leg; the only way on is back
    pub fn is_dead_end(&self) -> bool {
        self.paved_legs() <= 1
    }

    /// Road passes through: straight or curve
    pub fn is_two_way(&self) -> bool {
        matches!(self.intersection_type(), IntersectionType::Straight | IntersectionType::Curve)
    }

    /// Two-way with every paved leg divided
    pub fn is_two_way_divided(&self) -> bool {
        self.is_two_way()
            && Direction::ALL
                .into_iter()
                .all(|dir| self.is_empty(dir) || self.is_divided(dir))
    }

    pub fn is_three_way_or_more(&self) -> bool {
        self.intersection_type() >= IntersectionType::ThreeWay
    }

    /// Is it ok to add an outgoing leg toward `dir`?
    ///
    /// Counts the axis pairs (N/S, NE/SW, E/W, SE/NW) touched by existing legs
    /// plus the proposed one. More than two axes are only allowed while there
    /// are at most three legs, and three legs must not all fit inside a half
    /// circle (no squeezed Y shapes).
    pub fn is_suitable_for_leg(&self, dir: Direction) -> bool {
        let occupied = |d: Direction| !self.is_empty(d) || d == dir;

        let mut axes = 0;
        let mut legs = 0;
        for i in 0..NUM_DIRECTIONS / 2 {
            let a = occupied(Direction::ALL[i]);
            let b = occupied(Direction::ALL[i + 4]);
            if a || b {
                axes += 1;
            }
            legs += a as usize + b as usize;
        }

        if axes > 2 && legs == 3 {
            let at: Vec<i32> = Direction::ALL
                .into_iter()
                .filter(|&d| occupied(d))
                .map(|d| d.index() as i32)
                .collect();
            let gaps = [at[1] - at[0], at[2] - at[1], at[0] - at[2] + NUM_DIRECTIONS as i32];
            return gaps[0] + gaps[1] >= 4 && gaps[1] + gaps[2] >= 4 && gaps[2] + gaps[0] >= 4;
        }

        axes <= 2 || legs <= 3
    }

    // =========================================================================
    // Description
    // =========================================================================

    /// Human-readable note for a highway log entry, seen from route `exclude`.
    ///
    /// Reports overlaps starting or ending here, then other routes crossing;
    /// if neither, the names of cross streets. Empty when nothing is notable.
    pub fn describe(&self, exclude: RouteId, labels: &impl JunctionLabels) -> String {
        if self.intersection_type() == IntersectionType::DeadEnd {
            return "Dead end".to_string();
        }

        let fwd = self.forward_direction(exclude);
        let rev = self.backward_direction(exclude);
        let partner = |dir: Option<Direction>| {
            dir.and_then(|d| self.legs[d.index()].routes.iter().flatten().map(|s| s.id).find(|&id| id != exclude))
        };
        let fwd_overlap = partner(fwd);
        let rev_overlap = partner(rev);
        let number = |id: RouteId| labels.route_number(id).map_or_else(|| "?".to_string(), |n| n.to_string());

        let mut parts: Vec<String> = Vec::new();
        if fwd_overlap != rev_overlap {
            if let Some(id) = fwd_overlap {
                parts.push(format!("Begin overlap rte {}", number(id)));
            }
            if let Some(id) = rev_overlap {
                parts.push(format!("End overlap rte {}", number(id)));
            }
        }

        let is_route_leg = |dir: Direction| Some(dir) == fwd || Some(dir) == rev;
        let mut crossing: Vec<RouteId> = Vec::new();
        for dir in Direction::ALL.into_iter().filter(|&d| !is_route_leg(d)) {
            for slot in self.legs[dir.index()].routes.iter().flatten() {
                let id = slot.id;
                if Some(id) != fwd_overlap && Some(id) != rev_overlap && !crossing.contains(&id) {
                    crossing.push(id);
                }
            }
        }
        if !crossing.is_empty() {
            let list: Vec<String> = crossing.iter().map(|&id| format!("rte {}", number(id))).collect();
            parts.push(format!("Jct {}", list.join(" ")));
        }

        if parts.is_empty() {
            let mut seen: Vec<StreetId> = Vec::new();
            for dir in Direction::ALL.into_iter().filter(|&d| !is_route_leg(d)) {
                if let Some(id) = self.street_at(dir) {
                    if !seen.contains(&id) {
                        seen.push(id);
                        if let Some(name) = labels.street_name(id) {
                            parts.push(name.to_string());
                        }
                    }
                }
            }
        }

        parts.join(" ")
    }
}
