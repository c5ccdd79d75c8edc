//! Fixed-capacity vehicle registry
//!
//! The registry exclusively owns every vehicle. All access goes through one
//! mutex so that spawns, the per-tick update pass and snapshots are each a
//! single indivisible critical section.

use log::{debug, trace};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use super::geometry;
use super::types::{Lane, SpawnRequest, Sublane};
use super::vehicle::{Vehicle, VehicleUpdateResult};

/// Stable index of a registry slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub usize);

/// Why a spawn request was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpawnRejected {
    #[error("registry is full")]
    RegistryFull,
    #[error("lane {lane} sublane {sublane} does not accept new vehicles")]
    ForbiddenRoute { lane: Lane, sublane: Sublane },
}

/// Running totals kept alongside the slots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub spawned: u64,
    pub rejected_full: u64,
    pub rejected_forbidden: u64,
    pub released: u64,
    pub turns_completed: u64,
}

/// Outcome of one update pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub advanced: usize,
    pub turns_completed: usize,
    pub released: usize,
}

struct Slots {
    slots: Vec<Option<Vehicle>>,
    stats: RegistryStats,
}

pub struct VehicleRegistry {
    inner: Mutex<Slots>,
}

impl Default for VehicleRegistry {
    fn default() -> Self {
        Self::with_capacity(super::types::MAX_VEHICLES)
    }
}

impl VehicleRegistry {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Slots {
                slots: vec![None; capacity],
                stats: RegistryStats::default(),
            }),
        }
    }

    // A panic while holding the lock cannot leave a slot half written, so a
    // poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> usize {
        self.lock().slots.len()
    }

    /// Place a vehicle in the first free slot.
    ///
    /// The scan, validation and initialisation all happen under the lock, so
    /// two racing spawns never claim the same slot.
    pub fn spawn(&self, request: SpawnRequest) -> Result<SlotId, SpawnRejected> {
        let mut guard = self.lock();
        let inner = &mut *guard;

        let Some(index) = inner.slots.iter().position(Option::is_none) else {
            inner.stats.rejected_full += 1;
            trace!("Dropping vehicle {}: registry full", request.id);
            return Err(SpawnRejected::RegistryFull);
        };

        if !geometry::is_spawn_allowed(request.lane, request.sublane) {
            inner.stats.rejected_forbidden += 1;
            trace!(
                "Dropping vehicle {}: lane {} sublane {} is no-entry",
                request.id,
                request.lane,
                request.sublane
            );
            return Err(SpawnRejected::ForbiddenRoute {
                lane: request.lane,
                sublane: request.sublane,
            });
        }

        let vehicle = Vehicle::from_request(request);
        debug!(
            "Spawned vehicle {} on {}{} in slot {}",
            vehicle.id, vehicle.lane, vehicle.sublane, index
        );
        inner.slots[index] = Some(vehicle);
        inner.stats.spawned += 1;
        Ok(SlotId(index))
    }

    /// Mark a slot free. Returns false if it was already free or out of range.
    pub fn release(&self, slot: SlotId) -> bool {
        let mut guard = self.lock();
        let inner = &mut *guard;
        match inner.slots.get_mut(slot.0) {
            Some(entry @ Some(_)) => {
                *entry = None;
                inner.stats.released += 1;
                true
            }
            _ => false,
        }
    }

    /// Copy every active vehicle, in slot order
    pub fn snapshot(&self) -> Vec<Vehicle> {
        self.lock().slots.iter().flatten().cloned().collect()
    }

    pub fn get(&self, slot: SlotId) -> Option<Vehicle> {
        self.lock().slots.get(slot.0).cloned().flatten()
    }

    /// Apply `f` to every active vehicle in slot order under one lock
    pub fn for_each_active<F>(&self, mut f: F)
    where
        F: FnMut(SlotId, &mut Vehicle),
    {
        let mut guard = self.lock();
        for (index, slot) in guard.slots.iter_mut().enumerate() {
            if let Some(vehicle) = slot {
                f(SlotId(index), vehicle);
            }
        }
    }

    /// Advance every active vehicle by one tick, releasing the ones that left
    /// the visible area. The whole pass runs under one lock.
    pub fn advance_all(&self) -> PassSummary {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let mut summary = PassSummary::default();

        for slot in inner.slots.iter_mut() {
            let Some(vehicle) = slot else { continue };
            summary.advanced += 1;
            match vehicle.update() {
                VehicleUpdateResult::Continue => {}
                VehicleUpdateResult::TurnCompleted => summary.turns_completed += 1,
                VehicleUpdateResult::Depart => {
                    trace!("Vehicle {} left the intersection", vehicle.id);
                    *slot = None;
                    summary.released += 1;
                }
            }
        }

        inner.stats.released += summary.released as u64;
        inner.stats.turns_completed += summary.turns_completed as u64;
        summary
    }

    pub fn active_count(&self) -> usize {
        self.lock().slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn stats(&self) -> RegistryStats {
        self.lock().stats
    }
}
