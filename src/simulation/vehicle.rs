//! Vehicle movement and the turn state machine
//!
//! A vehicle moves along the primary axis of its approach. On a turning
//! sublane it starts drifting along the secondary axis once it reaches the
//! junction, and takes on the destination approach's identity when it
//! crosses the centre on that axis.

use log::debug;

use super::geometry::{self, entry_mark, has_reached, lane_line, out_of_bounds};
use super::types::{Lane, Position, SpawnRequest, Sublane, VehicleId, VEHICLE_SPEED};

/// Where a vehicle is in its trip through the junction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Driving towards the junction on the spawn approach
    Approaching,
    /// Blending from the origin axis onto the target approach
    Turning { target: Lane, sublane: Sublane },
    /// Past the junction (straight through or turn finished), heading out
    Crossed,
    /// Left the visible area, slot should be released
    Departed,
}

/// Result of a vehicle update indicating what the registry should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleUpdateResult {
    Continue,
    /// Turn finished this tick, lane/sublane/direction were reassigned
    TurnCompleted,
    /// Vehicle left the visible area
    Depart,
}

/// A vehicle in the simulation
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub id: VehicleId,
    pub position: Position,
    pub lane: Lane,
    pub sublane: Sublane,
    /// Travel sense along the current primary axis (+1 or -1)
    pub direction: i8,
    pub state: TurnState,
}

impl Vehicle {
    /// Create a vehicle at the entry point of its approach
    pub fn new(id: VehicleId, lane: Lane, sublane: Sublane) -> Self {
        Self {
            id,
            position: geometry::position_for(lane, sublane),
            lane,
            sublane,
            direction: lane.direction(),
            state: TurnState::Approaching,
        }
    }

    pub fn from_request(request: SpawnRequest) -> Self {
        Self::new(request.id, request.lane, request.sublane)
    }

    pub fn is_turning(&self) -> bool {
        matches!(self.state, TurnState::Turning { .. })
    }

    /// Advance the vehicle by one tick
    pub fn update(&mut self) -> VehicleUpdateResult {
        let axis = self.lane.axis();
        let step = VEHICLE_SPEED * f32::from(self.direction);
        let primary = self.position.get(axis) + step;
        self.position.set(axis, primary);

        let mut result = VehicleUpdateResult::Continue;

        match self.state {
            TurnState::Approaching => {
                if has_reached(primary, entry_mark(self.lane), self.direction) {
                    self.state = match geometry::turn_rule(self.lane, self.sublane) {
                        Some(rule) => {
                            debug!(
                                "Vehicle {} entering {:?} turn {}{} -> {}{}",
                                self.id,
                                rule.route,
                                self.lane,
                                self.sublane,
                                rule.target,
                                rule.target_sublane
                            );
                            TurnState::Turning {
                                target: rule.target,
                                sublane: rule.target_sublane,
                            }
                        }
                        None => TurnState::Crossed,
                    };
                }
            }
            TurnState::Turning { target, sublane } => {
                let secondary_axis = axis.other();
                let turn_direction = target.direction();
                let secondary =
                    self.position.get(secondary_axis) + VEHICLE_SPEED * f32::from(turn_direction);
                self.position.set(secondary_axis, secondary);

                if has_reached(secondary, secondary_axis.center(), turn_direction) {
                    self.complete_turn(target, sublane);
                    result = VehicleUpdateResult::TurnCompleted;
                }
            }
            TurnState::Crossed | TurnState::Departed => {}
        }

        let axis = self.lane.axis();
        if out_of_bounds(axis, self.position.get(axis)) {
            self.state = TurnState::Departed;
            return VehicleUpdateResult::Depart;
        }

        result
    }

    /// Take on the destination approach's identity in a single step
    fn complete_turn(&mut self, target: Lane, sublane: Sublane) {
        debug!(
            "Vehicle {} completed turn {}{} -> {}{}",
            self.id, self.lane, self.sublane, target, sublane
        );
        self.lane = target;
        self.sublane = sublane;
        self.direction = target.direction();
        // Snap onto the destination lane line
        self.position
            .set(target.axis().other(), lane_line(target, sublane));
        self.state = TurnState::Crossed;
    }
}
