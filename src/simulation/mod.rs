//! Intersection simulation engine
//!
//! Everything that mutates simulation state lives here: the vehicle
//! registry, per-vehicle turn logic, the signal scheduler and the two
//! traffic producers. It has no presentation dependencies and can be driven
//! from tests or the headless binary.

mod config;
mod engine;
mod feed;
mod generator;
mod geometry;
mod registry;
mod shutdown;
mod signal;
mod spawner;
mod types;
mod vehicle;

pub use config::{SimConfig, DEFAULT_FEED_FILE};
pub use engine::{BackgroundTasks, Engine, FrameSink, Snapshot};
pub use feed::{ingest_reader, parse_record, FeedError, FeedReader, IngestReport, DEFAULT_SUBLANE};
pub use generator::{FeedGenerator, BATCH_INTERVAL, MAX_BATCH_PER_LANE, MIN_BATCH_PER_LANE};
pub use geometry::{
    entry_mark, is_spawn_allowed, lane_line, position_for, route_type, turn_rule, RouteType,
    TurnRule, FOOTPRINT_LEFT, FOOTPRINT_TOP, SPAWN_DENYLIST, TURN_PROXIMITY,
};
pub use registry::{PassSummary, RegistryStats, SlotId, SpawnRejected, VehicleRegistry};
pub use shutdown::Shutdown;
pub use signal::{Signal, SignalBoard, SignalScheduler, MAX_DWELL_UNITS, MIN_DWELL_UNITS};
pub use spawner::{random_vehicle_id, RandomSpawner};
pub use types::{
    Axis, Lane, Position, SpawnRequest, Sublane, VehicleId, CENTER_X, CENTER_Y, LANE_WIDTH,
    MAX_ID_LEN, MAX_VEHICLES, ROAD_WIDTH, SIM_HEIGHT, SIM_WIDTH, VEHICLE_SPEED,
};
pub use vehicle::{TurnState, Vehicle, VehicleUpdateResult};
