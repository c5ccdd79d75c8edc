use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use intersection_sim::render::TextRenderer;
use intersection_sim::simulation::{
    Engine, FeedGenerator, Shutdown, SimConfig, BATCH_INTERVAL, DEFAULT_FEED_FILE,
};

#[derive(Parser)]
#[command(name = "intersection_sim")]
#[command(about = "Four-way intersection traffic simulation")]
struct Cli {
    /// Number of update/render frames to run
    #[arg(long, default_value = "1800")]
    ticks: u64,

    /// Milliseconds between frames
    #[arg(long, default_value = "16")]
    tick_ms: u64,

    /// Number of vehicle slots
    #[arg(long, default_value = "100")]
    capacity: usize,

    /// Vehicle feed file to poll
    #[arg(long, default_value = DEFAULT_FEED_FILE)]
    feed: PathBuf,

    /// Do not poll the feed file
    #[arg(long)]
    no_feed: bool,

    /// Disable the random spawner
    #[arg(long)]
    no_random: bool,

    /// Milliseconds between random spawns
    #[arg(long, default_value = "1000")]
    spawn_ms: u64,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Print the map every N frames
    #[arg(long, default_value = "60")]
    frame_every: u64,

    /// Append generated vehicles to the feed file instead of simulating
    #[arg(long)]
    generate: bool,

    /// Number of batches to generate (runs forever when omitted)
    #[arg(long)]
    batches: Option<u64>,
}

impl Cli {
    fn config(&self) -> SimConfig {
        SimConfig {
            capacity: self.capacity,
            tick_interval: Duration::from_millis(self.tick_ms),
            spawn_interval: Duration::from_millis(self.spawn_ms),
            random_spawns: !self.no_random,
            feed_path: (!self.no_feed).then(|| self.feed.clone()),
            seed: self.seed,
            ..SimConfig::default()
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = if cli.generate {
        run_generator(&cli)
    } else {
        run_headless(&cli)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run the simulation with the text renderer (no window)
fn run_headless(cli: &Cli) -> Result<()> {
    let config = cli.config();
    info!(
        "Running intersection simulation: {} frames every {:?}, capacity {}",
        cli.ticks, config.tick_interval, config.capacity
    );
    match &config.feed_path {
        Some(path) => info!("Polling vehicle feed {}", path.display()),
        None => info!("Vehicle feed disabled"),
    }

    let mut engine = Engine::new(config);
    let tasks = engine.start()?;
    let mut renderer = TextRenderer::new(cli.frame_every);

    let frames = engine.run_frames(cli.ticks, &mut renderer);
    tasks.stop();

    let stats = engine.stats();
    info!("=== SIMULATION COMPLETE ===");
    info!("Frames: {}", frames);
    info!("Total vehicles spawned: {}", stats.spawned);
    info!("Total vehicles departed: {}", stats.released);
    info!("Turns completed: {}", stats.turns_completed);
    info!(
        "Dropped spawns: {} (registry full), {} (no-entry sublane)",
        stats.rejected_full, stats.rejected_forbidden
    );
    info!("Active vehicles: {}", engine.registry().active_count());
    info!("Peak vehicles on screen: {}", renderer.peak_vehicle_count);
    Ok(())
}

/// Append random vehicles to the feed file
fn run_generator(cli: &Cli) -> Result<()> {
    let config = cli.config();
    let mut generator = FeedGenerator::new(cli.feed.clone(), config.rng_for(0));
    info!("Generating vehicles into {}", generator.path().display());

    match cli.batches {
        Some(batches) => {
            for batch in 0..batches {
                let written = generator.write_batch()?;
                info!("Batch {}: generated {} vehicles", batch + 1, written);
                if batch + 1 < batches {
                    std::thread::sleep(BATCH_INTERVAL);
                }
            }
            Ok(())
        }
        None => generator.run(&Shutdown::new(), BATCH_INTERVAL),
    }
}
