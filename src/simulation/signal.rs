//! Signal lights and the background scheduler
//!
//! The scheduler is the only writer and the render boundary the only reader.
//! The green approach is handed over through a single atomic, so a reader
//! always sees exactly one published choice.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::shutdown::Shutdown;
use super::types::Lane;

/// Shortest dwell, in time units
pub const MIN_DWELL_UNITS: u32 = 1;
/// Longest dwell, in time units
pub const MAX_DWELL_UNITS: u32 = 10;

/// Light state for one approach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal {
    pub lane: Lane,
    pub green: bool,
}

const NONE_GREEN: u8 = 0;

/// One-slot mailbox holding the currently green approach
#[derive(Debug, Default)]
pub struct SignalBoard {
    green: AtomicU8,
}

impl SignalBoard {
    /// All lights start red
    pub fn new() -> Self {
        Self {
            green: AtomicU8::new(NONE_GREEN),
        }
    }

    /// Make `lane` the only green approach
    pub fn set_green(&self, lane: Lane) {
        self.green.store(lane.index() as u8 + 1, Ordering::Release);
    }

    pub fn set_all_red(&self) {
        self.green.store(NONE_GREEN, Ordering::Release);
    }

    pub fn green(&self) -> Option<Lane> {
        match self.green.load(Ordering::Acquire) {
            NONE_GREEN => None,
            code => Lane::from_index(usize::from(code) - 1),
        }
    }

    /// State of all four lights, in `Lane::ALL` order
    pub fn signals(&self) -> [Signal; 4] {
        let green = self.green();
        Lane::ALL.map(|lane| Signal {
            lane,
            green: green == Some(lane),
        })
    }
}

/// Picks a random approach to turn green, independent of traffic
pub struct SignalScheduler {
    board: Arc<SignalBoard>,
    rng: StdRng,
    time_unit: Duration,
}

impl SignalScheduler {
    pub fn new(board: Arc<SignalBoard>, rng: StdRng, time_unit: Duration) -> Self {
        Self {
            board,
            rng,
            time_unit,
        }
    }

    /// Publish a new green approach and return how long it should stay green
    pub fn step(&mut self) -> (Lane, Duration) {
        let lane = Lane::ALL[self.rng.random_range(0..Lane::ALL.len())];
        self.board.set_green(lane);
        let units = self.rng.random_range(MIN_DWELL_UNITS..=MAX_DWELL_UNITS);
        debug!("Signal {} green for {} units", lane, units);
        (lane, self.time_unit * units)
    }

    /// Run until shutdown is requested
    pub fn run(mut self, shutdown: &Shutdown) {
        info!("Signal scheduler started");
        loop {
            let (_, dwell) = self.step();
            if !shutdown.sleep(dwell) {
                break;
            }
        }
        info!("Signal scheduler stopped");
    }
}
