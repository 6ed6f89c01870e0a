//! ASCII rendering and export module for island maps
//!
//! Provides functions to render a world as ASCII text and export it to files.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;

use crate::direction::Direction;
use crate::grid::{DisplayHint, Tile, TileCoord};
use crate::highway_log::{format_centimiles, route_mileage};
use crate::world::World;

/// Letter used for a town's land; cycles through the alphabet
pub fn town_char(index: usize) -> char {
    (b'a' + (index % 26) as u8) as char
}

/// Get ASCII character for one tile
pub fn tile_char(world: &World, at: TileCoord, tile: &Tile) -> char {
    if tile.is_water() {
        return match tile.display_hint {
            DisplayHint::None => '~',
            DisplayHint::WaterNorthWest | DisplayHint::WaterSouthEast => '/',
            DisplayHint::WaterNorthEast | DisplayHint::WaterSouthWest => '\\',
        };
    }
    if world.town_center_at(at).is_some() {
        return '*';
    }
    if let Some(j) = &tile.junction {
        if Direction::ALL.into_iter().any(|dir| !j.has_no_routes(dir)) {
            return '#';
        }
        if !j.is_blank() {
            return '+';
        }
    }
    match tile.town() {
        Some(id) => town_char(id.index()),
        None => '.',
    }
}

/// Render the island to an ASCII string, one line per row
pub fn render_ascii(world: &World) -> String {
    let mut result = String::with_capacity((world.width + 1) * world.height);
    for y in 0..world.height {
        for x in 0..world.width {
            let at = TileCoord::new(x, y);
            let ch = world.tile(at).map_or(' ', |tile| tile_char(world, at, tile));
            result.push(ch);
        }
        result.push('\n');
    }
    result
}

/// Generate legend for map characters
pub fn legend() -> String {
    let mut legend = String::new();
    legend.push_str("=== LEGEND ===\n");
    legend.push_str("  ~ water        / \\ shoreline corner\n");
    legend.push_str("  # numbered route   + other road\n");
    legend.push_str("  * town center  a-z town land   . unowned land\n");
    legend
}

/// Export the map, legend and counts to a text file
pub fn export_ascii(world: &World, seed: u64, path: impl AsRef<Path>) -> io::Result<()> {
    let mut file = File::create(path)?;

    // Header
    writeln!(file, "=== ISLAND ROADS MAP FILE ===")?;
    writeln!(file, "Seed: {}", seed)?;
    writeln!(file, "Size: {}x{}", world.width, world.height)?;
    writeln!(file, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(file)?;

    writeln!(file, "=== MAP ===")?;
    write!(file, "{}", render_ascii(world))?;
    writeln!(file)?;

    write!(file, "{}", legend())?;
    writeln!(file)?;

    // Statistics
    let total = world.width * world.height;
    let land = world.land_area();
    let paved = world
        .tiles()
        .iter()
        .filter(|(_, _, t)| t.junction.as_ref().is_some_and(|j| !j.is_blank()))
        .count();
    writeln!(file, "=== STATISTICS ===")?;
    writeln!(file, "Total tiles: {}", total)?;
    writeln!(file, "Land: {} ({:.1}%)", land, 100.0 * land as f64 / total as f64)?;
    writeln!(file, "Paved tiles: {}", paved)?;
    writeln!(file, "Towns: {}", world.towns.len())?;
    writeln!(file, "Numbered routes: {}", world.routes.len())?;
    writeln!(file, "Named streets: {}", world.streets.len())?;
    writeln!(file)?;

    writeln!(file, "Towns:")?;
    for (index, town) in world.towns.iter().enumerate() {
        writeln!(
            file,
            "  {} {:20} center {} area {}",
            town_char(index),
            town.name,
            town.center,
            town.area
        )?;
    }
    writeln!(file)?;

    let mut routes: Vec<_> = world.routes.iter().collect();
    routes.sort_by_key(|r| r.number);
    writeln!(file, "Routes:")?;
    for route in routes {
        writeln!(
            file,
            "  {:>4} {:5} {} -> {}  {} mi",
            route.number,
            route.log_direction.name(),
            route.start,
            route.end,
            format_centimiles(route_mileage(world, route.id))
        )?;
    }
    Ok(())
}
