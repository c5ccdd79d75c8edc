//! Lane geometry and routing tables
//!
//! Pure functions only: where a vehicle appears for a given approach and
//! sublane, which sublanes may be entered, and where each turning sublane
//! leads.

use super::types::{Axis, Lane, Position, Sublane, LANE_WIDTH, ROAD_WIDTH, SIM_HEIGHT, SIM_WIDTH};

/// Near edge of the intersection footprint on the x axis
pub const FOOTPRINT_LEFT: f32 = (SIM_WIDTH - ROAD_WIDTH) / 2.0;
/// Near edge of the intersection footprint on the y axis
pub const FOOTPRINT_TOP: f32 = (SIM_HEIGHT - ROAD_WIDTH) / 2.0;

/// Distance before the intersection centre at which a vehicle counts as
/// having entered the junction
pub const TURN_PROXIMITY: f32 = 0.0;

/// Kind of movement a vehicle makes through the junction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteType {
    Left,
    Straight,
    Right,
}

/// An entry of the turn table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnRule {
    pub target: Lane,
    pub target_sublane: Sublane,
    pub route: RouteType,
}

/// Sublanes vehicles may not be spawned on. Sublane 1 of every approach is
/// the exit lane used by vehicles leaving after a turn.
pub const SPAWN_DENYLIST: [(Lane, Sublane); 4] = [
    (Lane::A, Sublane::EXIT),
    (Lane::B, Sublane::EXIT),
    (Lane::C, Sublane::EXIT),
    (Lane::D, Sublane::EXIT),
];

pub fn is_spawn_allowed(lane: Lane, sublane: Sublane) -> bool {
    !SPAWN_DENYLIST.contains(&(lane, sublane))
}

/// Coordinate where a vehicle on `lane`/`sublane` appears.
///
/// Approaches anchor on their own edge of the simulation area. The
/// perpendicular offset is measured from the near side of the footprint for
/// A and C and from the far side for B and D.
pub fn position_for(lane: Lane, sublane: Sublane) -> Position {
    let offset = f32::from(sublane.number() - 1) * LANE_WIDTH + LANE_WIDTH / 2.0;
    match lane {
        Lane::A => Position::new(0.0, FOOTPRINT_TOP + offset),
        Lane::B => Position::new(SIM_WIDTH, FOOTPRINT_TOP + ROAD_WIDTH - offset),
        Lane::C => Position::new(FOOTPRINT_LEFT + offset, 0.0),
        Lane::D => Position::new(FOOTPRINT_LEFT + ROAD_WIDTH - offset, SIM_HEIGHT),
    }
}

/// Coordinate of the lane line perpendicular to the lane's travel axis
pub fn lane_line(lane: Lane, sublane: Sublane) -> f32 {
    position_for(lane, sublane).get(lane.axis().other())
}

/// Turn table lookup. Only the turning sublane of each approach has an entry.
pub fn turn_rule(lane: Lane, sublane: Sublane) -> Option<TurnRule> {
    if sublane != Sublane::TURN {
        return None;
    }
    let (target, route) = match lane {
        Lane::A => (Lane::D, RouteType::Left),
        Lane::B => (Lane::C, RouteType::Left),
        Lane::C => (Lane::B, RouteType::Right),
        Lane::D => (Lane::A, RouteType::Right),
    };
    Some(TurnRule {
        target,
        target_sublane: Sublane::EXIT,
        route,
    })
}

/// Route classification for a source approach/sublane heading to `target`.
/// Anything not listed in the turn table is straight.
pub fn route_type(source: Lane, sublane: Sublane, target: Lane) -> RouteType {
    match turn_rule(source, sublane) {
        Some(rule) if rule.target == target => rule.route,
        _ => RouteType::Straight,
    }
}

/// Whether `coord` has reached or passed `mark` when travelling in `direction`
pub fn has_reached(coord: f32, mark: f32, direction: i8) -> bool {
    if direction > 0 {
        coord >= mark
    } else {
        coord <= mark
    }
}

/// Primary-axis mark at which a vehicle on `lane` enters the junction
pub fn entry_mark(lane: Lane) -> f32 {
    lane.axis().center() - f32::from(lane.direction()) * TURN_PROXIMITY
}

/// True when `coord` lies outside the visible area on `axis`
pub fn out_of_bounds(axis: Axis, coord: f32) -> bool {
    coord < 0.0 || coord > axis.extent()
}
