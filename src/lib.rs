//! Intersection Simulation Library
//!
//! A concurrent four-way intersection simulation: a bounded vehicle registry
//! fed by a random spawner and an external feed file, a per-tick turn state
//! machine, and an independent signal scheduler.

pub mod render;
pub mod simulation;
