//! Synthetic traffic: random spawn requests at a fixed interval

use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use super::geometry::is_spawn_allowed;
use super::registry::VehicleRegistry;
use super::shutdown::Shutdown;
use super::types::{Lane, SpawnRequest, Sublane};

fn random_letter<R: Rng>(rng: &mut R) -> char {
    char::from(rng.random_range(b'A'..=b'Z'))
}

fn random_digit<R: Rng>(rng: &mut R) -> char {
    char::from(rng.random_range(b'0'..=b'9'))
}

/// Generate a plate-style identifier: two letters, a digit, two letters,
/// three digits (e.g. `KD4TR071`)
pub fn random_vehicle_id<R: Rng>(rng: &mut R) -> String {
    [
        random_letter(rng),
        random_letter(rng),
        random_digit(rng),
        random_letter(rng),
        random_letter(rng),
        random_digit(rng),
        random_digit(rng),
        random_digit(rng),
    ]
    .iter()
    .collect()
}

pub struct RandomSpawner {
    registry: Arc<VehicleRegistry>,
    rng: StdRng,
    interval: Duration,
}

impl RandomSpawner {
    pub fn new(registry: Arc<VehicleRegistry>, rng: StdRng, interval: Duration) -> Self {
        Self {
            registry,
            rng,
            interval,
        }
    }

    /// Draw a random approach and sublane, re-drawing no-entry combinations
    pub fn next_request(&mut self) -> SpawnRequest {
        loop {
            let lane = Lane::ALL[self.rng.random_range(0..Lane::ALL.len())];
            let sublane = Sublane::ALL[self.rng.random_range(0..Sublane::ALL.len())];
            if is_spawn_allowed(lane, sublane) {
                let id = random_vehicle_id(&mut self.rng);
                return SpawnRequest::new(id, lane, sublane);
            }
        }
    }

    /// Submit one request. A full registry drops it.
    pub fn spawn_one(&mut self) -> bool {
        let request = self.next_request();
        let id = request.id.clone();
        match self.registry.spawn(request) {
            Ok(_) => true,
            Err(rejected) => {
                debug!("Random vehicle {} dropped: {}", id, rejected);
                false
            }
        }
    }

    /// Run until shutdown is requested
    pub fn run(mut self, shutdown: &Shutdown) {
        info!("Random spawner started, interval {:?}", self.interval);
        loop {
            self.spawn_one();
            if !shutdown.sleep(self.interval) {
                break;
            }
        }
        info!("Random spawner stopped");
    }
}
