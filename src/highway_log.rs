//! Highway logs: mileposts along each numbered route
//!
//! Distances are kept in centimiles (1/100 mile) so long routes add up
//! exactly.

use std::fmt::Write;

use crate::junction::RouteId;
use crate::traversal::next_tile;
use crate::world::World;

/// Length of one tile-to-tile step. Diagonal steps use the same length.
pub const STEP_CENTIMILES: u32 = 20;

/// "3.70" for 370
pub fn format_centimiles(centimiles: u32) -> String {
    format!("{}.{:02}", centimiles / 100, centimiles % 100)
}

/// Rebuild the log text of one route, store it on the route and return the
/// route's length in centimiles. Unknown ids log nothing.
pub fn log_route(world: &mut World, id: RouteId) -> u32 {
    let Some((log, length)) = build_log(world, id) else {
        return 0;
    };
    if let Some(route) = world.routes.get_mut(id) {
        route.log = log;
    }
    length
}

/// Mileage of a route without touching its cached log
pub fn route_mileage(world: &World, id: RouteId) -> u32 {
    build_log(world, id).map_or(0, |(_, length)| length)
}

fn build_log(world: &World, id: RouteId) -> Option<(String, u32)> {
    let route = world.routes.get(id)?;
    let mut log = String::new();

    let start_town = world.town_at(route.start);
    let end_town = world.town_at(route.end);
    let _ = writeln!(log, "Route {}", route.number);
    let _ = writeln!(
        log,
        "From: {} {}",
        world.junction_or_empty(route.start).describe(id, world),
        world.town_name(start_town)
    );
    let _ = writeln!(
        log,
        "To: {} {}",
        world.junction_or_empty(route.end).describe(id, world),
        world.town_name(end_town)
    );
    let _ = writeln!(log, "Log dir: {}", route.log_direction.name());
    let _ = writeln!(log, "Mileposts:");

    let limit = world.width * world.height;
    let mut centimiles = 0;
    let mut here = route.start;
    let mut town = start_town;
    for _ in 0..=limit {
        let note = world.junction_or_empty(here).describe(id, world);
        if !note.is_empty() {
            let _ = writeln!(log, "{}: {}", format_centimiles(centimiles), note);
        }

        let Some(next) = next_tile(world, here, id) else {
            break;
        };
        here = next;

        // town lines sit halfway between tile centers
        let next_town = world.town_at(here);
        if next_town != town {
            let _ = writeln!(
                log,
                "{}: {} - {} TL",
                format_centimiles(centimiles + STEP_CENTIMILES / 2),
                world.town_name(town),
                world.town_name(next_town)
            );
        }
        town = next_town;
        centimiles += STEP_CENTIMILES;
    }

    Some((log, centimiles))
}

/// Logs of every route sorted by number, then the route count and total mileage
pub fn full_report(world: &mut World) -> String {
    let ids: Vec<RouteId> = world.routes.ids().collect();
    let mut total = 0;
    for &id in &ids {
        total += log_route(world, id);
    }

    let mut sorted: Vec<_> = world.routes.iter().collect();
    sorted.sort_by_key(|r| r.number);

    let mut report = String::new();
    for route in sorted {
        report.push_str(&route.log);
        report.push('\n');
    }
    let _ = writeln!(report, "Numbered routes: {}", world.routes.len());
    let _ = writeln!(report, "Total mileage: {}", format_centimiles(total));
    report
}

/// Log of the route showing `number`
pub fn route_report(world: &mut World, number: u32) -> String {
    match world.routes.id_by_number(number) {
        Some(id) => {
            log_route(world, id);
            world.routes.get(id).map(|r| r.log.clone()).unwrap_or_default()
        }
        None => format!("Route {} doesn't exist.", number),
    }
}
