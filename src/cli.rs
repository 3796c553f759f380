use antforage::SimConfig;
use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the foraging simulation
#[derive(Parser, Debug)]
#[command(name = "antforage", about = "Ant foraging on an evaporating pheromone field")]
pub struct Args {
    /// Run without a window and print a summary
    #[arg(long, default_value_t = false)]
    pub headless: bool,

    /// Ticks to run in headless mode
    #[arg(long, default_value_t = 1_000)]
    pub ticks: u64,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of ants (clamped to 10..=300)
    #[arg(short = 'n', long)]
    pub population: Option<usize>,

    /// Number of food sources
    #[arg(long)]
    pub food: Option<usize>,

    /// Arena width
    #[arg(long, default_value_t = 800)]
    pub width: usize,

    /// Arena height
    #[arg(long, default_value_t = 600)]
    pub height: usize,

    /// Write PNG frames and metadata to this directory (headless mode)
    #[arg(long)]
    pub record: Option<PathBuf>,

    /// Capture a frame every N ticks when recording
    #[arg(long, default_value_t = 10)]
    pub record_every: u64,

    /// Log statistics every N ticks (0 disables)
    #[arg(long, default_value_t = 100)]
    pub report_every: u64,
}

impl Args {
    pub fn sim_config(&self) -> SimConfig {
        let defaults = SimConfig::default();
        SimConfig {
            population: self.population.unwrap_or(defaults.population),
            food_count: self.food.unwrap_or(defaults.food_count),
            ..defaults
        }
    }
}
