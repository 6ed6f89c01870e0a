use std::error::Error;

use clap::Parser;
use log::info;

use island_roads::ascii;
use island_roads::export;
use island_roads::generation;
use island_roads::highway_log;
use island_roads::params::GenerationParams;
use island_roads::seeds::WorldSeeds;

#[derive(Parser, Debug)]
#[command(name = "island_roads")]
#[command(about = "Generate an island with towns and a numbered highway network")]
struct Args {
    /// Width of the island grid in tiles
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Height of the island grid in tiles
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Number of numbered routes to lay out
    #[arg(short, long)]
    routes: Option<usize>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON file with generation parameters; flags above override it
    #[arg(short, long)]
    config: Option<String>,

    /// Print only the log of this route number
    #[arg(long)]
    route: Option<u32>,

    /// Don't print the ASCII map
    #[arg(long)]
    no_map: bool,

    /// Export the map, legend and counts to a text file
    #[arg(long)]
    export_ascii: Option<String>,

    /// Export towns, routes and streets to a JSON file
    #[arg(long)]
    export_summary: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut params = match &args.config {
        Some(path) => GenerationParams::load_json(path)?,
        None => GenerationParams::default(),
    };
    if let Some(width) = args.width {
        params.width = width;
    }
    if let Some(height) = args.height {
        params.height = height;
    }
    if let Some(routes) = args.routes {
        params.route_count = routes;
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    let seeds = WorldSeeds::from_master(seed);
    println!("Generating island with seed: {}", seed);
    println!("Map size: {}x{}", params.width, params.height);

    let mut world = generation::generate(&params, &seeds)?;

    if !args.no_map {
        println!();
        print!("{}", ascii::render_ascii(&world));
        println!();
    }

    match args.route {
        Some(number) => println!("{}", highway_log::route_report(&mut world, number)),
        None => print!("{}", highway_log::full_report(&mut world)),
    }

    if let Some(path) = &args.export_ascii {
        ascii::export_ascii(&world, seed, path)?;
        info!("Exported map to {}", path);
    }
    if let Some(path) = &args.export_summary {
        export::export_summary_json(&world, path)?;
        info!("Exported summary to {}", path);
    }

    Ok(())
}
