//! # Delve Main Entry Point
//!
//! Generates a level or a maze from the command line and prints it as text.

use clap::{Parser, ValueEnum};
use delve::{
    BiasedRecursiveBacktracker, BinaryTree, Builder, DelveResult, DungeonRng, GenerationConfig,
    Map, MazeFiller, RecursiveBacktracker, SideWinder, Tile,
};
use log::{error, info, LevelFilter};

/// Which generator lays out the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algo {
    /// Rooms in split areas, chained by straight corridors
    Level,
    /// Random rooms, then a binary tree maze around them
    BinaryTree,
    /// Random rooms, then a sidewinder maze around them
    Sidewinder,
    /// Random rooms, then a recursive backtracker maze around them
    Backtracker,
    /// Random rooms, then a biased backtracker maze with loops
    Biased,
}

/// Command line arguments for Delve.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Procedural dungeon maps printed as text")]
#[command(version)]
struct Args {
    /// Random seed for generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Map width in tiles
    #[arg(long)]
    width: Option<i32>,

    /// Map height in tiles
    #[arg(long)]
    height: Option<i32>,

    /// Generation settings as a JSON file
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Generator to run
    #[arg(short, long, value_enum, default_value_t = Algo::Level)]
    algo: Algo,

    /// Print coordinates along the margins
    #[arg(long)]
    axes: bool,

    /// Overlay distances from a random open position
    #[arg(long)]
    metrics: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    if let Err(e) = run(&args) {
        error!("Generation failed: {}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn initialize_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Warn,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .init();
}

fn load_config(args: &Args) -> DelveResult<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => GenerationConfig::from_json_file(path)?,
        None => GenerationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    Ok(config)
}

fn run(args: &Args) -> DelveResult<()> {
    let config = load_config(args)?;
    info!(
        "Delve v{}: {:?} on {}x{} with seed {}",
        delve::VERSION,
        args.algo,
        config.width,
        config.height,
        config.seed
    );

    let mut rng = config.rng();
    let mut map = build(config, args.algo, &mut rng)?;

    if args.metrics {
        let start = map.random_pos(true, &mut rng)?;
        let metrics = map.dist_metrics(start, None, None);
        info!(
            "{} positions reachable from {}, furthest at {}",
            metrics.len(),
            start,
            metrics.furthest().1
        );
        map.add_metrics_overlay(&metrics);
    }

    println!("{}", map.to_text(args.axes));
    Ok(())
}

fn build(config: GenerationConfig, algo: Algo, rng: &mut DungeonRng) -> DelveResult<Map> {
    let map = Map::try_new(config.width, config.height, Tile::SolidRock)?;
    let mut builder = Builder::with_map(map, config);
    if algo == Algo::Level {
        builder.generate_level(rng)?;
        builder.staircase(None, '>', None, rng)?;
        builder.staircase(None, '<', None, rng)?;
        builder.validate_connectivity()?;
        return Ok(builder.into_map());
    }

    let config = builder.config().clone();
    let nb_rooms = rng.rint(2, 5);
    for _ in 0..nb_rooms {
        builder.random_room(
            config.room_width_range,
            config.room_height_range,
            config.room_retries,
            rng,
        );
    }

    let rect = builder.map().rect();
    let mut filler: Box<dyn MazeFiller> = match algo {
        Algo::BinaryTree => Box::new(BinaryTree::new(rect)),
        Algo::Sidewinder => Box::new(SideWinder::with_branching(rect, config.branching_factor)),
        Algo::Backtracker | Algo::Level => Box::new(RecursiveBacktracker::new(rect)),
        Algo::Biased => Box::new(
            BiasedRecursiveBacktracker::new(rect)
                .with_straight_line_bias(config.straight_line_bias)
                .with_reconnect_prob(0.2),
        ),
    };
    builder.maze_fill(filler.as_mut(), rng)?;
    Ok(builder.into_map())
}
