//! JSON summary export
//!
//! Writes the towns, numbered routes (with mileage) and street names of a
//! world as one pretty-printed JSON document.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use serde::Serialize;

use crate::direction::Direction;
use crate::grid::TileCoord;
use crate::highway_log::{format_centimiles, route_mileage};
use crate::town::Town;
use crate::world::World;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WorldSummary {
    pub width: usize,
    pub height: usize,
    pub land_tiles: usize,
    pub towns: Vec<Town>,
    pub routes: Vec<RouteSummary>,
    pub streets: Vec<String>,
    /// Sum of all route mileage, "m.mm"
    pub total_mileage: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteSummary {
    pub number: u32,
    pub log_direction: Direction,
    pub start: TileCoord,
    pub end: TileCoord,
    pub start_town: String,
    pub end_town: String,
    pub centimiles: u32,
}

/// Build the summary; routes are sorted by number
pub fn summarize(world: &World) -> WorldSummary {
    let mut routes: Vec<RouteSummary> = world
        .routes
        .iter()
        .map(|route| RouteSummary {
            number: route.number,
            log_direction: route.log_direction,
            start: route.start,
            end: route.end,
            start_town: world.town_name(world.town_at(route.start)).to_string(),
            end_town: world.town_name(world.town_at(route.end)).to_string(),
            centimiles: route_mileage(world, route.id),
        })
        .collect();
    routes.sort_by_key(|r| r.number);
    let total: u32 = routes.iter().map(|r| r.centimiles).sum();

    WorldSummary {
        width: world.width,
        height: world.height,
        land_tiles: world.land_area(),
        towns: world.towns.clone(),
        routes,
        streets: world.streets.iter().map(str::to_string).collect(),
        total_mileage: format_centimiles(total),
    }
}

/// Export the summary to a JSON file
pub fn export_summary_json(world: &World, path: impl AsRef<Path>) -> io::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &summarize(world))?;
    Ok(())
}
