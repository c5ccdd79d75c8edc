//! Simulation engine
//!
//! Owns the shared registry and signal board, starts the background tasks
//! (signal scheduler, feed reader, random spawner) and drives the fixed-rate
//! update/render cycle.

use anyhow::{Context, Result};
use log::{info, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::config::SimConfig;
use super::feed::FeedReader;
use super::registry::{PassSummary, RegistryStats, VehicleRegistry};
use super::shutdown::Shutdown;
use super::signal::{Signal, SignalBoard, SignalScheduler};
use super::spawner::RandomSpawner;
use super::vehicle::Vehicle;

const SCHEDULER_STREAM: u64 = 1;
const SPAWNER_STREAM: u64 = 2;

/// Point-in-time copy of everything the presentation layer draws
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub frame: u64,
    pub vehicles: Vec<Vehicle>,
    pub signals: [Signal; 4],
}

/// Consumer of one snapshot per frame
pub trait FrameSink {
    fn present(&mut self, snapshot: &Snapshot);
}

/// Running background tasks
pub struct BackgroundTasks {
    shutdown: Arc<Shutdown>,
    handles: Vec<JoinHandle<()>>,
}

impl BackgroundTasks {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Ask every task to stop and wait for them
    pub fn stop(self) {
        self.shutdown.request();
        for handle in self.handles {
            let name = handle.thread().name().unwrap_or("task").to_string();
            if handle.join().is_err() {
                warn!("Background task {} panicked", name);
            }
        }
    }
}

pub struct Engine {
    config: SimConfig,
    registry: Arc<VehicleRegistry>,
    signals: Arc<SignalBoard>,
    shutdown: Arc<Shutdown>,
    frame: u64,
}

impl Engine {
    pub fn new(config: SimConfig) -> Self {
        Self {
            registry: Arc::new(VehicleRegistry::with_capacity(config.capacity)),
            signals: Arc::new(SignalBoard::new()),
            shutdown: Arc::new(Shutdown::new()),
            frame: 0,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<VehicleRegistry> {
        &self.registry
    }

    pub fn signals(&self) -> &Arc<SignalBoard> {
        &self.signals
    }

    /// Start the scheduler, feed reader and random spawner threads
    pub fn start(&self) -> Result<BackgroundTasks> {
        let mut handles = Vec::new();

        let scheduler = SignalScheduler::new(
            Arc::clone(&self.signals),
            self.config.rng_for(SCHEDULER_STREAM),
            self.config.signal_time_unit,
        );
        handles.push(self.spawn_task("signal-scheduler", move |shutdown| {
            scheduler.run(shutdown)
        })?);

        if let Some(path) = &self.config.feed_path {
            let reader = FeedReader::new(
                path.clone(),
                Arc::clone(&self.registry),
                self.config.feed_poll_interval,
                self.config.feed_retry_delay,
            );
            handles.push(self.spawn_task("feed-reader", move |shutdown| reader.run(shutdown))?);
        }

        if self.config.random_spawns {
            let spawner = RandomSpawner::new(
                Arc::clone(&self.registry),
                self.config.rng_for(SPAWNER_STREAM),
                self.config.spawn_interval,
            );
            handles.push(self.spawn_task("random-spawner", move |shutdown| {
                spawner.run(shutdown)
            })?);
        }

        info!("Started {} background tasks", handles.len());
        Ok(BackgroundTasks {
            shutdown: Arc::clone(&self.shutdown),
            handles,
        })
    }

    fn spawn_task<F>(&self, name: &str, task: F) -> Result<JoinHandle<()>>
    where
        F: FnOnce(&Shutdown) + Send + 'static,
    {
        let shutdown = Arc::clone(&self.shutdown);
        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || task(&shutdown))
            .with_context(|| format!("Failed to start {} thread", name))
    }

    /// Advance every vehicle by one tick
    pub fn tick(&mut self) -> PassSummary {
        self.frame += 1;
        self.registry.advance_all()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            frame: self.frame,
            vehicles: self.registry.snapshot(),
            signals: self.signals.signals(),
        }
    }

    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    /// Run `frames` update/render cycles at the configured tick rate.
    /// Stops early if a shutdown is requested.
    pub fn run_frames<S: FrameSink>(&mut self, frames: u64, sink: &mut S) -> u64 {
        let mut completed = 0;
        while completed < frames {
            self.tick();
            sink.present(&self.snapshot());
            completed += 1;
            if !self.shutdown.sleep(self.config.tick_interval) {
                break;
            }
        }
        completed
    }
}
