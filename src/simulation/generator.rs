//! Feed generator
//!
//! Appends batches of random vehicles to a feed file in the format the
//! feed reader consumes. Used to drive the simulation from a separate
//! process.

use anyhow::{Context, Result};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::shutdown::Shutdown;
use super::spawner::random_vehicle_id;
use super::types::Lane;

pub const MIN_BATCH_PER_LANE: usize = 1;
pub const MAX_BATCH_PER_LANE: usize = 5;

/// Pause between batches
pub const BATCH_INTERVAL: Duration = Duration::from_secs(2);

pub struct FeedGenerator {
    path: PathBuf,
    rng: StdRng,
}

impl FeedGenerator {
    pub fn new(path: impl Into<PathBuf>, rng: StdRng) -> Self {
        Self {
            path: path.into(),
            rng,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open feed {} for appending", self.path.display()))
    }

    /// Append one batch, 1 to 5 vehicles for each approach in A, B, C, D order.
    /// Returns the number of records written.
    pub fn write_batch(&mut self) -> Result<usize> {
        let mut writer = BufWriter::new(self.open()?);
        let mut written = 0;

        for lane in Lane::ALL {
            let count = self
                .rng
                .random_range(MIN_BATCH_PER_LANE..=MAX_BATCH_PER_LANE);
            for _ in 0..count {
                let id = random_vehicle_id(&mut self.rng);
                writeln!(writer, "{}:{}", id, lane)
                    .with_context(|| format!("Failed to write to {}", self.path.display()))?;
                debug!("Generated for lane {}: {}", lane, id);
                written += 1;
            }
        }

        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))?;
        Ok(written)
    }

    /// Write batches until shutdown is requested
    pub fn run(mut self, shutdown: &Shutdown, interval: Duration) -> Result<()> {
        info!("Appending generated vehicles to {}", self.path.display());
        loop {
            let written = self.write_batch()?;
            info!("Generated {} vehicles", written);
            if !shutdown.sleep(interval) {
                return Ok(());
            }
        }
    }
}
