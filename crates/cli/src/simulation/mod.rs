//! Batch simulation of synthetic traffic.

mod runner;
mod stats;

pub use runner::{Simulation, SimulationConfig};
pub use stats::SimulationStats;
