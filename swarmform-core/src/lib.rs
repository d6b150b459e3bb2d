//! swarmform core - Decentralized Pattern Formation
//!
//! Drones on a toroidal grid see only which neighbouring cells are occupied,
//! yet converge on a target pattern without any central coordination. This
//! crate holds the simulation engine (patterns, drones, world ticks) and the
//! batch harness that measures how quickly a swarm forms a pattern.

pub mod core;
pub mod error;
pub mod rng;
pub mod swarm;
pub mod utils;

// Re-export key types
pub use crate::core::config::{BatchConfig, DroneCount};
pub use error::{Result, SwarmError};
pub use swarm::{
    CellState, Drone, DroneId, DroneState, OccupancyGrid, Pattern, PatternSketch, SwarmConfig,
    TickReport, World,
};
pub use utils::batch::{BatchRunner, BatchSummary, RunOutcome, RunRecord};

/// Initialize tracing for the library.
pub fn setup_logging(level: Option<String>) {
    let filter = level.unwrap_or_else(|| "info".to_string());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
