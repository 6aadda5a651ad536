use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use tileworld::ascii;
use tileworld::export;
use tileworld::noisegen::NoiseParams;
use tileworld::terrain::TerrainClass;
use tileworld::tilemap::Cell;
use tileworld::wander::{WanderConfig, WanderPlanner};
use tileworld::world::{RegenPolicy, WorldConfig, WorldMap};

#[derive(Parser, Debug)]
#[command(name = "tileworld")]
#[command(about = "Generate procedural tile maps with autotiled shorelines and wandering agents")]
struct Args {
    /// Map width in cells
    #[arg(short = 'W', long, default_value = "100")]
    width: usize,

    /// Map height in cells
    #[arg(short = 'H', long, default_value = "100")]
    height: usize,

    /// Random seed (uses a random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Noise zoom factor (higher = larger features)
    #[arg(long, default_value = "50.0")]
    scale: f64,

    /// Noise octave count
    #[arg(long, default_value = "4")]
    octaves: u32,

    /// Amplitude decay per octave
    #[arg(long, default_value = "0.5")]
    persistence: f64,

    /// Frequency growth per octave
    #[arg(long, default_value = "2.0")]
    lacunarity: f64,

    /// Manual noise offset, x component
    #[arg(long, default_value = "0.0")]
    offset_x: f64,

    /// Manual noise offset, y component
    #[arg(long, default_value = "0.0")]
    offset_y: f64,

    /// Quantization level count
    #[arg(long, default_value = "2")]
    levels: u32,

    /// Keep hand-placed property edits across regenerations
    #[arg(long)]
    preserve_edits: bool,

    /// Print the terrain map to stdout
    #[arg(long)]
    ascii: bool,

    /// Export the noise field to a grayscale PNG
    #[arg(long)]
    export_noise: Option<String>,

    /// Export the terrain classes to a colored PNG
    #[arg(long)]
    export_terrain: Option<String>,

    /// Export a JSON snapshot of the grids
    #[arg(long)]
    export_json: Option<String>,

    /// Export terrain and variant views to a text file
    #[arg(long)]
    export_ascii: Option<String>,

    /// Number of wandering agents to simulate
    #[arg(long, default_value = "0")]
    agents: usize,

    /// Simulation ticks to run
    #[arg(long, default_value = "200")]
    ticks: u32,

    /// Seconds per simulated tick
    #[arg(long, default_value = "0.1")]
    tick_dt: f32,
}

fn main() {
    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(|| rand::random());
    println!(
        "Generating {}x{} tile world with seed {}",
        args.width, args.height, seed
    );

    let config = WorldConfig {
        noise: NoiseParams {
            width: args.width,
            height: args.height,
            scale: args.scale,
            octaves: args.octaves,
            persistence: args.persistence,
            lacunarity: args.lacunarity,
            offset: (args.offset_x, args.offset_y),
            seed,
        },
        levels: args.levels,
        regen_policy: if args.preserve_edits {
            RegenPolicy::PreserveEdits
        } else {
            RegenPolicy::DiscardEdits
        },
        ..Default::default()
    };

    let world = match WorldMap::generate(config) {
        Ok(world) => world,
        Err(err) => {
            eprintln!("world generation failed: {}", err);
            std::process::exit(1);
        }
    };

    let total = world.width() * world.height();
    let grass = world
        .terrain()
        .iter()
        .filter(|(_, _, class)| **class == TerrainClass::Grass)
        .count();
    println!(
        "Terrain: {} grass / {} water cells ({:.1}% land)",
        grass,
        total - grass,
        grass as f64 / total as f64 * 100.0
    );

    if args.ascii {
        print!("{}", ascii::terrain_to_string(world.terrain()));
    }

    if let Some(path) = &args.export_noise {
        match export::export_noise_map(world.noise_map(), path) {
            Ok(()) => println!("Noise map exported to {}", path),
            Err(err) => eprintln!("noise export failed: {}", err),
        }
    }

    if let Some(path) = &args.export_terrain {
        match export::export_terrain_map(world.terrain(), path) {
            Ok(()) => println!("Terrain map exported to {}", path),
            Err(err) => eprintln!("terrain export failed: {}", err),
        }
    }

    if let Some(path) = &args.export_json {
        match export::export_world_json(&world, path) {
            Ok(()) => println!("JSON snapshot exported to {}", path),
            Err(err) => eprintln!("JSON export failed: {}", err),
        }
    }

    if let Some(path) = &args.export_ascii {
        match ascii::export_ascii(&world, path) {
            Ok(()) => println!("ASCII dump exported to {}", path),
            Err(err) => eprintln!("ASCII export failed: {}", err),
        }
    }

    if args.agents > 0 {
        simulate(&world, &args, seed);
    }
}

/// Run a handful of wandering agents over the generated map and report
/// where they ended up.
fn simulate(world: &WorldMap, args: &Args, seed: u64) {
    let walkable: Vec<Cell> = world
        .terrain()
        .iter()
        .filter(|(_, _, class)| **class == TerrainClass::Grass)
        .map(|(x, y, _)| Cell::new(x as i32, y as i32))
        .collect();

    if walkable.is_empty() {
        println!("No walkable cells; skipping agent simulation");
        return;
    }

    println!(
        "Simulating {} agents for {} ticks ({}s each)",
        args.agents, args.ticks, args.tick_dt
    );

    let mut spawn_rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
    let mut planners: Vec<WanderPlanner> = (0..args.agents)
        .map(|i| {
            let start = walkable[spawn_rng.gen_range(0..walkable.len())];
            WanderPlanner::new(start, WanderConfig::default(), seed.wrapping_add(i as u64))
        })
        .collect();

    let store = world.properties();
    for _ in 0..args.ticks {
        for planner in &mut planners {
            if let Err(err) = planner.tick(args.tick_dt, store) {
                eprintln!("agent tick failed: {}", err);
                return;
            }
        }
    }

    for (i, planner) in planners.iter().enumerate() {
        let pos = planner.position();
        println!(
            "Agent {}: position ({:.1}, {:.1}), phase {:?}, idle cycles {}",
            i,
            pos.x,
            pos.y,
            planner.phase(),
            planner.idle_cycles()
        );
    }
}
