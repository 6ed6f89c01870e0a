//! Road walks
//!
//! One walk lays out one numbered route or one street, a tile at a time,
//! choosing among five headings fixed at the start: the initial heading and
//! up to 90 degrees to either side. Weights come from a prior, a drifting
//! direction bias, and the shape of the junction being left. Routes may ride
//! along other routes' legs; streets always need fresh pavement.

use log::debug;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::roll;
use crate::direction::Direction;
use crate::error::EditError;
use crate::grid::TileCoord;
use crate::junction::{Pavement, RouteId, StreetId};
use crate::params::GenerationParams;
use crate::world::World;

/// Weight added to a leg the walk opts into sharing with another route
const OVERLAP_BOOST: u32 = 20;
/// Steps during which turning away from the initial heading is halved
const STRAIGHT_START: u32 = 3;

/// What a walk writes onto the junctions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoadClass {
    Route(RouteId),
    Street(StreetId),
}

/// Everything one walk needs to know up front
#[derive(Clone, Debug, PartialEq)]
pub struct WalkSpec {
    pub class: RoadClass,
    pub start: TileCoord,
    /// Log heading of the road; the walk runs against it when `forward` is false
    pub heading: Direction,
    pub pavement: Pavement,
    pub max_length: u32,
    pub forward: bool,
    /// Stop at the first real intersection, or as soon as only one way is open
    pub die_soon: bool,
    /// Never turn
    pub keep_straight: bool,
    /// Weights for {sharp left, left, straight, right, sharp right}
    pub prior: [u32; 5],
}

impl WalkSpec {
    /// A highway leg starting fresh in its log direction
    pub fn highway(id: RouteId, start: TileCoord, heading: Direction, params: &GenerationParams) -> Self {
        Self {
            class: RoadClass::Route(id),
            start,
            heading,
            pavement: Pavement::Undivided2,
            max_length: params.highway_max_length,
            forward: true,
            die_soon: false,
            keep_straight: false,
            prior: params.route_prior,
        }
    }

    /// A straight city block line
    pub fn city_street(id: StreetId, start: TileCoord, heading: Direction, length: u32, params: &GenerationParams) -> Self {
        Self {
            class: RoadClass::Street(id),
            start,
            heading,
            pavement: Pavement::Undivided2,
            max_length: length,
            forward: true,
            die_soon: false,
            keep_straight: true,
            prior: params.route_prior,
        }
    }

    /// A curvy country road
    pub fn rural_road(id: StreetId, start: TileCoord, heading: Direction, params: &GenerationParams) -> Self {
        Self {
            class: RoadClass::Street(id),
            start,
            heading,
            pavement: Pavement::Undivided2,
            max_length: params.rural_road_max_length,
            forward: true,
            die_soon: false,
            keep_straight: false,
            prior: params.rural_prior,
        }
    }
}

/// Where a walk stopped and how many segments it laid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WalkOutcome {
    pub end: TileCoord,
    pub length: u32,
}

/// Drifting preference for one of the three middle bins.
///
/// Each walk gets a natural lean (left, none or right). Every so often the
/// current lean is re-rolled, either back to the natural one or to a random
/// one, so roads curve for a while and then straighten out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirBias {
    pub natural: i32,
    pub current: i32,
    length: u32,
}

impl DirBias {
    pub fn new(rng: &mut ChaCha8Rng) -> Self {
        let natural = match roll(rng) {
            r if r < 3 => -1,
            r if r > 12 => 1,
            _ => 0,
        };
        Self {
            natural,
            current: 0,
            length: 0,
        }
    }

    /// Bin index the bias boosts
    pub fn bin(&self) -> usize {
        (2 + self.current) as usize
    }

    /// Advance one tile, maybe re-rolling the lean
    pub fn step(&mut self, params: &GenerationParams, rng: &mut ChaCha8Rng) {
        self.length += 1;
        if self.length > params.bias_min_length && roll(rng) < params.bias_change_odds {
            let r = roll(rng);
            self.current = if r < params.bias_return_odds {
                self.natural
            } else {
                (r % 3) as i32 - 1
            };
            self.length = 0;
        }
    }
}

/// Forbid turns sharper than 90 degrees from the current heading and halve
/// exact right angles. With `keep_straight` only the current heading survives.
pub fn check_turns(bins: &[Direction; 5], chances: &mut [u32; 5], heading: Direction, keep_straight: bool) {
    for (dir, chance) in bins.iter().zip(chances.iter_mut()) {
        if keep_straight && *dir != heading {
            *chance = 0;
            continue;
        }
        match heading.eighths_between(*dir) {
            0 | 1 => {}
            2 => *chance /= 2,
            _ => *chance = 0,
        }
    }
}

/// Lay out one road. Errors only if a chosen segment falls off the grid,
/// which the pave checks rule out.
pub fn layout(
    world: &mut World,
    spec: &WalkSpec,
    params: &GenerationParams,
    rng: &mut ChaCha8Rng,
) -> Result<WalkOutcome, EditError> {
    let route = match spec.class {
        RoadClass::Route(id) => Some(id),
        RoadClass::Street(_) => None,
    };
    let (persistence, min_persist) = match route {
        Some(_) => (params.route_persistence, params.route_min_persist_length),
        None => (params.street_persistence, params.street_min_persist_length),
    };

    let mut heading = if spec.forward { spec.heading } else { spec.heading.reverse() };
    let bins: [Direction; 5] = std::array::from_fn(|i| heading.turned(i as i32 - 2));
    let mut bias = DirBias::new(rng);

    let mut here = spec.start;
    let mut length = 0;
    let mut doubling = false;
    let mut forced = 0;
    let mut last_seen: Option<RouteId> = None;
    let mut since_seen = 0;

    loop {
        let j = *world.junction_or_empty(here);
        let old_heading = heading;

        let at_intersection = match route {
            Some(_) => !doubling && j.is_route_junction(),
            None => j.is_three_way_or_more(),
        };
        if at_intersection {
            if spec.die_soon {
                break;
            }
            if length > min_persist && roll(rng) > persistence {
                break;
            }
            if let Some(id) = route {
                if let Some(other) = j.any_route_except(id) {
                    last_seen = Some(other);
                    since_seen = 0;
                }
            }
        }

        let mut chances = spec.prior;
        chances[bias.bin()] += params.bias_boost;
        bias.step(params, rng);
        check_turns(&bins, &mut chances, old_heading, spec.keep_straight);

        let mut viable = 0;
        let mut encouraged = false;
        for (i, &dir) in bins.iter().enumerate() {
            if chances[i] == 0 {
                continue;
            }
            let blocked = match route {
                Some(_) => world.cant_add_route(here, dir),
                None => world.cant_add_street(here, dir),
            };
            if blocked {
                chances[i] = 0;
                continue;
            }

            if route.is_some() && !j.has_no_routes(dir) {
                // never start out on top of another route
                if length == 0 {
                    chances[i] = 0;
                    continue;
                }
                if !doubling {
                    if roll(rng) >= params.overlap_odds {
                        chances[i] = 0;
                        continue;
                    }
                    chances[i] += OVERLAP_BOOST;
                    encouraged = true;
                }
            }

            if length < STRAIGHT_START && i != 2 {
                chances[i] /= 2;
            }
            viable += 1;
        }

        if viable == 1 {
            forced += 1;
            if forced > params.max_forced_steps && length > params.forced_min_length {
                debug!("walk boxed in after {} tiles at {}", length, here);
                break;
            }
            if spec.die_soon {
                break;
            }
        } else {
            forced = 0;
        }

        // keep away from the route we just crossed for a while
        if let Some(seen) = last_seen {
            if route.is_some() && !doubling && !encouraged && since_seen < params.remeet_window {
                for (i, &dir) in bins.iter().enumerate() {
                    if chances[i] == 0 {
                        continue;
                    }
                    let remeets = world
                        .neighbor(here, dir)
                        .is_some_and(|next| world.junction_or_empty(next).contains_route(seen));
                    if remeets {
                        chances[i] = 0;
                    }
                }
            }
        }

        let total: u32 = chances.iter().sum();
        if total == 0 {
            break;
        }
        let sample = rng.gen_range(0..total);
        let mut running = 0;
        for (i, &dir) in bins.iter().enumerate() {
            if chances[i] == 0 {
                continue;
            }
            running += chances[i];
            if sample < running {
                heading = dir;
                break;
            }
        }

        if route.is_some() {
            doubling = !j.has_no_routes(heading);
        }
        since_seen += 1;

        here = match spec.class {
            RoadClass::Route(id) => world.add_route_both(here, heading, id, spec.pavement, spec.forward)?,
            RoadClass::Street(id) => world.add_street_both(here, heading, id, spec.pavement, spec.forward)?,
        };
        length += 1;
        if length >= spec.max_length {
            break;
        }
    }

    debug!("{:?} walked {} tiles from {} to {}", spec.class, length, spec.start, here);
    Ok(WalkOutcome { end: here, length })
}

/// Random tile in the two thirds of the grid behind `heading`, if a leg
/// could be paved out of it that way
pub fn pick_pavement_start(world: &World, heading: Direction, rng: &mut ChaCha8Rng) -> Option<TileCoord> {
    use Direction::*;

    let (w, h) = (world.width, world.height);
    let dx = rng.gen_range(0..2 * w / 3);
    let x = match heading {
        North | East | NorthEast | SouthEast => dx,
        _ => w - 1 - dx,
    };
    let dy = rng.gen_range(0..2 * h / 3);
    let y = match heading {
        East | South | SouthWest | SouthEast => dy,
        _ => h - 1 - dy,
    };

    let at = TileCoord::new(x, y);
    (!world.cant_pave(at, heading)).then_some(at)
}

/// Start for a new route. Probes `tries` times for a leg free of routes,
/// then as many again for a spot on an existing two-way road. With
/// `find_existing` only the second kind is accepted.
pub fn pick_route_start(
    world: &World,
    heading: Direction,
    find_existing: bool,
    tries: u32,
    rng: &mut ChaCha8Rng,
) -> Option<TileCoord> {
    for attempt in 0..2 * tries {
        let Some(at) = pick_pavement_start(world, heading, rng) else {
            continue;
        };
        let j = world.junction_or_empty(at);
        let accept = if find_existing || attempt >= tries {
            j.is_two_way() && j.is_empty(heading)
        } else {
            j.has_no_routes(heading) && j.is_suitable_for_leg(heading)
        };
        if accept {
            return Some(at);
        }
    }
    None
}

/// Start for a new street: the heading leg must be unpaved
pub fn pick_street_start(
    world: &World,
    heading: Direction,
    find_existing: bool,
    tries: u32,
    rng: &mut ChaCha8Rng,
) -> Option<TileCoord> {
    for attempt in 0..2 * tries {
        let Some(at) = pick_pavement_start(world, heading, rng) else {
            continue;
        };
        let j = world.junction_or_empty(at);
        if !j.is_empty(heading) {
            continue;
        }
        let accept = if find_existing || attempt >= tries {
            j.is_two_way()
        } else {
            j.is_suitable_for_leg(heading)
        };
        if accept {
            return Some(at);
        }
    }
    None
}
