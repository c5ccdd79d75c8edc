//! Turn state machine and lane geometry

use intersection_sim::simulation::{
    is_spawn_allowed, lane_line, position_for, route_type, turn_rule, Lane, RouteType,
    SpawnRequest, Sublane, TurnState, Vehicle, VehicleId, VehicleRegistry, VehicleUpdateResult,
    CENTER_X, CENTER_Y, SIM_HEIGHT, SIM_WIDTH, VEHICLE_SPEED,
};

fn vehicle(lane: Lane, sublane: Sublane) -> Vehicle {
    Vehicle::new(VehicleId::new("T1"), lane, sublane)
}

#[test]
fn test_position_for_anchors_on_each_edge() {
    assert_eq!(position_for(Lane::A, Sublane::EXIT).x, 0.0);
    assert_eq!(position_for(Lane::B, Sublane::EXIT).x, SIM_WIDTH);
    assert_eq!(position_for(Lane::C, Sublane::EXIT).y, 0.0);
    assert_eq!(position_for(Lane::D, Sublane::EXIT).y, SIM_HEIGHT);

    // A and C measure from the near side of the footprint, B and D from the far side
    let ys: Vec<f32> = Sublane::ALL.iter().map(|s| position_for(Lane::A, *s).y).collect();
    assert_eq!(ys, vec![310.0, 360.0, 410.0]);
    let ys: Vec<f32> = Sublane::ALL.iter().map(|s| position_for(Lane::B, *s).y).collect();
    assert_eq!(ys, vec![410.0, 360.0, 310.0]);
    let xs: Vec<f32> = Sublane::ALL.iter().map(|s| position_for(Lane::C, *s).x).collect();
    assert_eq!(xs, vec![590.0, 640.0, 690.0]);
    let xs: Vec<f32> = Sublane::ALL.iter().map(|s| position_for(Lane::D, *s).x).collect();
    assert_eq!(xs, vec![690.0, 640.0, 590.0]);
}

#[test]
fn test_position_for_is_deterministic() {
    for lane in Lane::ALL {
        for sublane in Sublane::ALL {
            assert_eq!(position_for(lane, sublane), position_for(lane, sublane));
        }
    }
}

#[test]
fn test_sublane_range() {
    assert!(Sublane::new(0).is_none());
    assert!(Sublane::new(4).is_none());
    assert_eq!(Sublane::new(3), Some(Sublane::TURN));
}

#[test]
fn test_spawn_allowed_table() {
    let allowed = Lane::ALL
        .iter()
        .flat_map(|lane| Sublane::ALL.iter().map(move |s| (*lane, *s)))
        .filter(|(lane, s)| is_spawn_allowed(*lane, *s))
        .count();
    assert_eq!(allowed, 8);
    assert!(!is_spawn_allowed(Lane::C, Sublane::EXIT));
    assert!(is_spawn_allowed(Lane::B, Sublane::TURN));
}

#[test]
fn test_route_type_table() {
    assert_eq!(route_type(Lane::A, Sublane::TURN, Lane::D), RouteType::Left);
    assert_eq!(route_type(Lane::B, Sublane::TURN, Lane::C), RouteType::Left);
    assert_eq!(route_type(Lane::C, Sublane::TURN, Lane::B), RouteType::Right);
    assert_eq!(route_type(Lane::D, Sublane::TURN, Lane::A), RouteType::Right);

    // Not in the table
    assert_eq!(route_type(Lane::A, Sublane::STRAIGHT, Lane::B), RouteType::Straight);
    assert_eq!(route_type(Lane::A, Sublane::TURN, Lane::C), RouteType::Straight);
    assert!(turn_rule(Lane::D, Sublane::STRAIGHT).is_none());
}

#[test]
fn test_straight_vehicle_moves_monotonically_until_exit() {
    let registry = VehicleRegistry::with_capacity(4);
    registry
        .spawn(SpawnRequest::new("S1", Lane::A, Sublane::STRAIGHT))
        .unwrap();

    let start = position_for(Lane::A, Sublane::STRAIGHT);
    let mut last_x = start.x;
    let mut ticks = 0;
    loop {
        let summary = registry.advance_all();
        ticks += 1;
        match registry.snapshot().first() {
            Some(v) => {
                assert_eq!(summary.released, 0);
                assert_eq!(v.position.x, last_x + VEHICLE_SPEED);
                assert_eq!(v.position.y, start.y);
                assert!(!v.is_turning());
                last_x = v.position.x;
            }
            None => {
                assert_eq!(summary.released, 1);
                break;
            }
        }
        assert!(ticks < 10_000, "vehicle never left");
    }

    // Released on the first tick past the right edge, not before
    assert_eq!(ticks as f32, (SIM_WIDTH / VEHICLE_SPEED).floor() + 1.0);
    assert_eq!(registry.stats().released, 1);
}

#[test]
fn test_straight_vehicle_state_progression() {
    let mut v = vehicle(Lane::B, Sublane::STRAIGHT);
    assert_eq!(v.state, TurnState::Approaching);
    while v.position.x > CENTER_X {
        assert_eq!(v.state, TurnState::Approaching);
        assert_eq!(v.update(), VehicleUpdateResult::Continue);
    }
    assert_eq!(v.state, TurnState::Crossed);
    assert_eq!(v.lane, Lane::B);
}

fn drive_turn(lane: Lane) {
    let rule = turn_rule(lane, Sublane::TURN).expect("turning sublane has a rule");
    let mut v = vehicle(lane, Sublane::TURN);
    let origin_axis = lane.axis();
    let secondary_axis = origin_axis.other();
    let start_secondary = v.position.get(secondary_axis);

    let mut completions = 0;
    let mut saw_diagonal = false;
    let mut ticks = 0;

    loop {
        let before = v.position;
        let was_turning = v.is_turning();
        let result = v.update();
        ticks += 1;

        if was_turning {
            // Both coordinates change while turning
            assert_ne!(before.get(origin_axis), v.position.get(origin_axis));
            assert_ne!(before.get(secondary_axis), v.position.get(secondary_axis));
            saw_diagonal = true;
        } else if completions == 0 {
            assert_eq!(v.position.get(secondary_axis), start_secondary);
        }

        match result {
            VehicleUpdateResult::TurnCompleted => {
                completions += 1;
                assert_eq!(v.lane, rule.target);
                assert_eq!(v.sublane, rule.target_sublane);
                assert_eq!(v.direction, rule.target.direction());
                assert_eq!(v.state, TurnState::Crossed);
                // The secondary coordinate is at the centre on the completing tick
                assert_eq!(v.position.get(secondary_axis), secondary_axis.center());
                assert_eq!(
                    v.position.get(origin_axis),
                    lane_line(rule.target, rule.target_sublane)
                );
            }
            VehicleUpdateResult::Depart => break,
            VehicleUpdateResult::Continue => {}
        }
        assert!(ticks < 10_000, "vehicle never left");
    }

    assert!(saw_diagonal);
    assert_eq!(completions, 1, "turn must complete exactly once");
    assert_eq!(v.state, TurnState::Departed);
    assert_eq!(v.lane, rule.target);
}

#[test]
fn test_turn_from_a_completes_once() {
    drive_turn(Lane::A);
}

#[test]
fn test_turn_from_b_completes_once() {
    drive_turn(Lane::B);
}

#[test]
fn test_turn_from_c_completes_once() {
    drive_turn(Lane::C);
}

#[test]
fn test_turn_from_d_completes_once() {
    drive_turn(Lane::D);
}

#[test]
fn test_turn_starts_at_intersection_centre() {
    let mut v = vehicle(Lane::A, Sublane::TURN);
    while v.position.x < CENTER_X - VEHICLE_SPEED {
        v.update();
        assert_eq!(v.state, TurnState::Approaching);
    }
    v.update();
    assert_eq!(v.position.x, CENTER_X);
    assert_eq!(
        v.state,
        TurnState::Turning {
            target: Lane::D,
            sublane: Sublane::EXIT
        }
    );

    // Turning vehicle heads north, towards the centre line
    v.update();
    assert_eq!(v.position.y, position_for(Lane::A, Sublane::TURN).y - VEHICLE_SPEED);
    assert!(v.position.y > CENTER_Y);
}

#[test]
fn test_registry_pass_counts_turns() {
    let registry = VehicleRegistry::with_capacity(8);
    for lane in Lane::ALL {
        registry
            .spawn(SpawnRequest::new("T", lane, Sublane::TURN))
            .unwrap();
    }

    let mut turns = 0;
    let mut released = 0;
    for _ in 0..2_000 {
        let summary = registry.advance_all();
        turns += summary.turns_completed;
        released += summary.released;
    }

    assert_eq!(turns, 4);
    assert_eq!(released, 4);
    assert_eq!(registry.active_count(), 0);
    assert_eq!(registry.stats().turns_completed, 4);
}
