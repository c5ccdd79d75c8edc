//! Text presentation layer
//!
//! Draws each snapshot as a coarse ASCII map of the intersection. This is
//! the replaceable part of the system: it only reads snapshots.

use log::info;

use crate::simulation::{
    FrameSink, Lane, Snapshot, TurnState, FOOTPRINT_LEFT, FOOTPRINT_TOP, ROAD_WIDTH,
};

/// Simulation units per map column
const CELL_WIDTH: f32 = 20.0;
/// Simulation units per map row (terminal cells are roughly twice as tall)
const CELL_HEIGHT: f32 = 40.0;

/// Map size, SIM_WIDTH / CELL_WIDTH by SIM_HEIGHT / CELL_HEIGHT
const COLUMNS: usize = 64;
const ROWS: usize = 18;

fn to_cell(x: f32, y: f32) -> (usize, usize) {
    let col = (x / CELL_WIDTH).max(0.0) as usize;
    let row = (y / CELL_HEIGHT).max(0.0) as usize;
    (row.min(ROWS - 1), col.min(COLUMNS - 1))
}

/// Render a snapshot as text, one line per map row followed by a legend
pub fn render_map(snapshot: &Snapshot) -> String {
    let mut grid = vec![vec![' '; COLUMNS]; ROWS];

    let (road_top, _) = to_cell(0.0, FOOTPRINT_TOP);
    let (road_bottom, _) = to_cell(0.0, FOOTPRINT_TOP + ROAD_WIDTH - 1.0);
    let (_, road_left) = to_cell(FOOTPRINT_LEFT, 0.0);
    let (_, road_right) = to_cell(FOOTPRINT_LEFT + ROAD_WIDTH - 1.0, 0.0);

    for (row, line) in grid.iter_mut().enumerate() {
        for (col, cell) in line.iter_mut().enumerate() {
            let horizontal = (road_top..=road_bottom).contains(&row);
            let vertical = (road_left..=road_right).contains(&col);
            *cell = match (horizontal, vertical) {
                (true, true) => '+',
                (true, false) => '-',
                (false, true) => '|',
                (false, false) => ' ',
            };
        }
    }

    for vehicle in &snapshot.vehicles {
        let (row, col) = to_cell(vehicle.position.x, vehicle.position.y);
        grid[row][col] = match vehicle.state {
            TurnState::Turning { .. } => '*',
            _ => vehicle.lane.as_char(),
        };
    }

    let lights: Vec<String> = snapshot
        .signals
        .iter()
        .map(|signal| {
            format!(
                "{}={}",
                signal.lane,
                if signal.green { "green" } else { "red" }
            )
        })
        .collect();

    let mut out = String::new();
    for line in &grid {
        out.extend(line.iter());
        out.push('\n');
    }
    out.push_str(&format!(
        "Legend: A/B/C/D=vehicle by approach, *=turning | Lights: {}\n",
        lights.join(" ")
    ));
    out
}

/// Prints the map every `every` frames and logs a one-line summary
pub struct TextRenderer {
    every: u64,
    frames_seen: u64,
    pub peak_vehicle_count: usize,
}

impl TextRenderer {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            frames_seen: 0,
            peak_vehicle_count: 0,
        }
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }
}

impl FrameSink for TextRenderer {
    fn present(&mut self, snapshot: &Snapshot) {
        self.frames_seen += 1;
        self.peak_vehicle_count = self.peak_vehicle_count.max(snapshot.vehicles.len());

        if snapshot.frame % self.every != 0 {
            return;
        }

        let green = snapshot
            .signals
            .iter()
            .find(|signal| signal.green)
            .map(|signal| signal.lane);
        let per_lane: Vec<String> = Lane::ALL
            .iter()
            .map(|lane| {
                let count = snapshot
                    .vehicles
                    .iter()
                    .filter(|vehicle| vehicle.lane == *lane)
                    .count();
                format!("{}:{}", lane, count)
            })
            .collect();
        info!(
            "--- Frame {} --- vehicles: {} ({}), green: {}",
            snapshot.frame,
            snapshot.vehicles.len(),
            per_lane.join(" "),
            green.map_or("none".to_string(), |lane| lane.to_string())
        );
        println!("{}", render_map(snapshot));
    }
}
