//! Core types for the intersection simulation
//!
//! These are plain value types shared by the registry, the turn logic and
//! the presentation layer.

use log::trace;
use std::fmt;

/// Width of the simulation area
pub const SIM_WIDTH: f32 = 1280.0;

/// Height of the simulation area
pub const SIM_HEIGHT: f32 = 720.0;

/// Width of each road (three sublanes)
pub const ROAD_WIDTH: f32 = 150.0;

/// Width of a single sublane
pub const LANE_WIDTH: f32 = 50.0;

/// Distance a vehicle travels per tick
pub const VEHICLE_SPEED: f32 = 2.0;

/// Default number of registry slots
pub const MAX_VEHICLES: usize = 100;

/// Longest identifier kept for a vehicle, longer ids are truncated
pub const MAX_ID_LEN: usize = 16;

/// Centre of the intersection
pub const CENTER_X: f32 = SIM_WIDTH / 2.0;
pub const CENTER_Y: f32 = SIM_HEIGHT / 2.0;

/// One of the four approaches feeding the intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    /// Enters from the left edge, travels east
    A,
    /// Enters from the right edge, travels west
    B,
    /// Enters from the top edge, travels south
    C,
    /// Enters from the bottom edge, travels north
    D,
}

/// Axis a vehicle travels along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    /// Size of the simulation area along this axis
    pub fn extent(self) -> f32 {
        match self {
            Axis::X => SIM_WIDTH,
            Axis::Y => SIM_HEIGHT,
        }
    }

    /// Intersection centre along this axis
    pub fn center(self) -> f32 {
        match self {
            Axis::X => CENTER_X,
            Axis::Y => CENTER_Y,
        }
    }
}

impl Lane {
    pub const ALL: [Lane; 4] = [Lane::A, Lane::B, Lane::C, Lane::D];

    pub fn from_char(c: char) -> Option<Lane> {
        match c {
            'A' => Some(Lane::A),
            'B' => Some(Lane::B),
            'C' => Some(Lane::C),
            'D' => Some(Lane::D),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Lane::A => 'A',
            Lane::B => 'B',
            Lane::C => 'C',
            Lane::D => 'D',
        }
    }

    /// Stable index in `Lane::ALL`
    pub fn index(self) -> usize {
        match self {
            Lane::A => 0,
            Lane::B => 1,
            Lane::C => 2,
            Lane::D => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Lane> {
        Lane::ALL.get(index).copied()
    }

    pub fn axis(self) -> Axis {
        match self {
            Lane::A | Lane::B => Axis::X,
            Lane::C | Lane::D => Axis::Y,
        }
    }

    /// Travel sense along the lane's axis: A and C move positive, B and D negative
    pub fn direction(self) -> i8 {
        match self {
            Lane::A | Lane::C => 1,
            Lane::B | Lane::D => -1,
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One of the three parallel lanes within an approach, numbered 1 to 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sublane(u8);

impl Sublane {
    /// Exit lane, used by vehicles leaving after a turn
    pub const EXIT: Sublane = Sublane(1);
    pub const STRAIGHT: Sublane = Sublane(2);
    pub const TURN: Sublane = Sublane(3);

    pub const ALL: [Sublane; 3] = [Sublane::EXIT, Sublane::STRAIGHT, Sublane::TURN];

    pub fn new(number: u8) -> Option<Sublane> {
        (1..=3).contains(&number).then_some(Sublane(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Sublane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A vehicle identifier, e.g. a number plate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VehicleId(String);

impl VehicleId {
    pub fn new(id: &str) -> Self {
        let kept: String = id.chars().take(MAX_ID_LEN).collect();
        if kept.len() < id.len() {
            trace!("Vehicle id {:?} truncated to {:?}", id, kept);
        }
        Self(kept)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleId {
    fn from(id: &str) -> Self {
        VehicleId::new(id)
    }
}

impl From<String> for VehicleId {
    fn from(id: String) -> Self {
        VehicleId::new(&id)
    }
}

/// A 2D position in simulation space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    pub fn set(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
        }
    }
}

/// A request to place a vehicle on an approach
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub id: VehicleId,
    pub lane: Lane,
    pub sublane: Sublane,
}

impl SpawnRequest {
    pub fn new(id: impl Into<VehicleId>, lane: Lane, sublane: Sublane) -> Self {
        Self {
            id: id.into(),
            lane,
            sublane,
        }
    }
}
