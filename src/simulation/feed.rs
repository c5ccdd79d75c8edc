//! Vehicle feed ingestion
//!
//! The feed is a text file of `<id>:<lane>[:<sublane>]` records that an
//! external generator keeps appending to. Every poll re-opens the file and
//! submits every record again from the start; truncating the file is the
//! generator's business.

use anyhow::{Context, Result};
use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::registry::{SpawnRejected, VehicleRegistry};
use super::shutdown::Shutdown;
use super::types::{Lane, SpawnRequest, Sublane, VehicleId};

/// Sublane used when a record omits it
pub const DEFAULT_SUBLANE: Sublane = Sublane::STRAIGHT;

/// A feed line that could not be turned into a spawn request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("missing lane field")]
    MissingField,
    #[error("empty vehicle id")]
    EmptyId,
    #[error("invalid lane {0:?}")]
    InvalidLane(String),
    #[error("invalid sublane {0:?}")]
    InvalidSublane(String),
    #[error("unexpected extra fields")]
    TooManyFields,
}

/// Parse one feed record
pub fn parse_record(line: &str) -> Result<SpawnRequest, FeedError> {
    let mut fields = line.trim().split(':').map(str::trim);

    let id = fields.next().unwrap_or_default();
    if id.is_empty() {
        return Err(FeedError::EmptyId);
    }

    let lane_field = fields.next().ok_or(FeedError::MissingField)?;
    let mut lane_chars = lane_field.chars();
    let lane = match (lane_chars.next(), lane_chars.next()) {
        (Some(c), None) => Lane::from_char(c),
        _ => None,
    }
    .ok_or_else(|| FeedError::InvalidLane(lane_field.to_string()))?;

    let sublane = match fields.next() {
        None => DEFAULT_SUBLANE,
        Some(field) => field
            .parse::<u8>()
            .ok()
            .and_then(Sublane::new)
            .ok_or_else(|| FeedError::InvalidSublane(field.to_string()))?,
    };

    if fields.next().is_some() {
        return Err(FeedError::TooManyFields);
    }

    Ok(SpawnRequest {
        id: VehicleId::new(id),
        lane,
        sublane,
    })
}

/// Counts from one pass over the feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub accepted: usize,
    pub malformed: usize,
    pub rejected_full: usize,
    pub rejected_forbidden: usize,
}

impl IngestReport {
    pub fn lines(&self) -> usize {
        self.accepted + self.malformed + self.rejected_full + self.rejected_forbidden
    }
}

/// Submit every record from `reader` to the registry
pub fn ingest_reader<R: BufRead>(reader: R, registry: &VehicleRegistry) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    // Split on raw bytes so one undecodable record does not end the pass
    for (number, bytes) in reader.split(b'\n').enumerate() {
        let bytes = bytes.with_context(|| format!("Failed to read feed line {}", number + 1))?;
        let line = match std::str::from_utf8(&bytes) {
            Ok(line) => line,
            Err(e) => {
                warn!(
                    "Invalid format on line {}: {:?} ({})",
                    number + 1,
                    String::from_utf8_lossy(&bytes),
                    e
                );
                report.malformed += 1;
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let request = match parse_record(line) {
            Ok(request) => request,
            Err(e) => {
                warn!("Invalid format on line {}: {:?} ({})", number + 1, line, e);
                report.malformed += 1;
                continue;
            }
        };

        match registry.spawn(request) {
            Ok(_) => report.accepted += 1,
            Err(SpawnRejected::RegistryFull) => report.rejected_full += 1,
            Err(SpawnRejected::ForbiddenRoute { .. }) => report.rejected_forbidden += 1,
        }
    }

    Ok(report)
}

/// Polls the feed file and injects its records into the registry
pub struct FeedReader {
    path: PathBuf,
    registry: Arc<VehicleRegistry>,
    poll_interval: Duration,
    retry_delay: Duration,
}

impl FeedReader {
    pub fn new(
        path: impl Into<PathBuf>,
        registry: Arc<VehicleRegistry>,
        poll_interval: Duration,
        retry_delay: Duration,
    ) -> Self {
        Self {
            path: path.into(),
            registry,
            poll_interval,
            retry_delay,
        }
    }

    /// Read the whole feed once from the beginning
    pub fn ingest_once(&self) -> Result<IngestReport> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open vehicle feed {}", self.path.display()))?;
        ingest_reader(BufReader::new(file), &self.registry)
    }

    /// Poll until shutdown is requested. Feed errors are logged and retried.
    pub fn run(self, shutdown: &Shutdown) {
        info!("Feed reader started on {}", self.path.display());
        loop {
            let pause = match self.ingest_once() {
                Ok(report) => {
                    if report.lines() > 0 {
                        info!(
                            "Feed pass: {} accepted, {} malformed, {} dropped (full), {} dropped (no-entry)",
                            report.accepted,
                            report.malformed,
                            report.rejected_full,
                            report.rejected_forbidden
                        );
                    }
                    self.poll_interval
                }
                Err(e) => {
                    warn!("Vehicle feed unavailable: {:#}", e);
                    self.retry_delay
                }
            };
            if !shutdown.sleep(pause) {
                break;
            }
        }
        info!("Feed reader stopped");
    }
}
