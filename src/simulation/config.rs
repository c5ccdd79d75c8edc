//! Engine configuration

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Duration;

use super::types::MAX_VEHICLES;

/// Default feed file, shared with the generator
pub const DEFAULT_FEED_FILE: &str = "vehicles.data";

#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of registry slots
    pub capacity: usize,
    /// Delay between update/render frames
    pub tick_interval: Duration,
    /// Pause between random spawns
    pub spawn_interval: Duration,
    /// Whether the random spawner runs
    pub random_spawns: bool,
    /// Feed file to poll, if any
    pub feed_path: Option<PathBuf>,
    pub feed_poll_interval: Duration,
    /// Delay before retrying an unreadable feed
    pub feed_retry_delay: Duration,
    /// Length of one signal dwell unit
    pub signal_time_unit: Duration,
    /// Seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            capacity: MAX_VEHICLES,
            tick_interval: Duration::from_millis(16),
            spawn_interval: Duration::from_secs(1),
            random_spawns: true,
            feed_path: Some(PathBuf::from(DEFAULT_FEED_FILE)),
            feed_poll_interval: Duration::from_secs(2),
            feed_retry_delay: Duration::from_secs(2),
            signal_time_unit: Duration::from_secs(1),
            seed: None,
        }
    }
}

impl SimConfig {
    /// RNG for one background task. Seeded runs give every task its own
    /// deterministic stream.
    pub fn rng_for(&self, stream: u64) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }
}
