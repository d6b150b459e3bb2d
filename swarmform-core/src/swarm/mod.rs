//! Swarm Engine
//!
//! Drones on a toroidal grid forming a target pattern from local occupancy
//! alone. Leaves first: [`Pattern`], [`OccupancyGrid`], [`Drone`], then the
//! [`World`] that ticks them.

pub mod drone;
pub mod grid;
pub mod pattern;
pub mod sketch;
pub mod world;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SwarmError};

pub use drone::{Direction, Drone, DroneId, DroneState};
pub use grid::OccupancyGrid;
pub use pattern::Pattern;
pub use sketch::PatternSketch;
pub use world::{CellState, TickReport, World};

/// Configuration for a single world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Grid columns. Coordinates wrap modulo this value.
    pub world_width: usize,
    /// Grid rows. Coordinates wrap modulo this value.
    pub world_height: usize,
    /// Smallest wait limit a drone may draw (inclusive).
    pub wait_limit_min: u32,
    /// Largest wait limit a drone may draw (inclusive).
    pub wait_limit_max: u32,
    /// Seed for every random draw the world makes: spawn cells, walk
    /// directions and wait limits.
    pub seed: u64,
}

impl SwarmConfig {
    pub fn new(world_width: usize, world_height: usize) -> Self {
        SwarmConfig {
            world_width,
            world_height,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn capacity(&self) -> usize {
        self.world_width * self.world_height
    }

    pub fn validate(&self) -> Result<()> {
        if self.world_width == 0 || self.world_height == 0 {
            return Err(SwarmError::Config(format!(
                "world must be at least 1x1, got {}x{}",
                self.world_width, self.world_height
            )));
        }
        if i32::try_from(self.world_width).is_err() || i32::try_from(self.world_height).is_err() {
            return Err(SwarmError::Config(format!(
                "world {}x{} exceeds the coordinate range",
                self.world_width, self.world_height
            )));
        }
        if self.wait_limit_min > self.wait_limit_max {
            return Err(SwarmError::Config(format!(
                "wait_limit_min {} is above wait_limit_max {}",
                self.wait_limit_min, self.wait_limit_max
            )));
        }
        Ok(())
    }
}

impl Default for SwarmConfig {
    fn default() -> Self {
        SwarmConfig {
            world_width: 20,
            world_height: 20,
            wait_limit_min: 80,
            wait_limit_max: 99,
            seed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_reference_grid() {
        let cfg = SwarmConfig::default();
        assert_eq!((cfg.world_width, cfg.world_height), (20, 20));
        assert_eq!((cfg.wait_limit_min, cfg.wait_limit_max), (80, 99));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_world() {
        let cfg = SwarmConfig::new(0, 5);
        assert!(matches!(cfg.validate(), Err(SwarmError::Config(_))));
    }

    #[test]
    fn validate_rejects_inverted_wait_limits() {
        let cfg = SwarmConfig {
            wait_limit_min: 10,
            wait_limit_max: 5,
            ..SwarmConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(SwarmError::Config(_))));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: SwarmConfig = serde_json::from_str(r#"{"world_width": 7}"#).unwrap();
        assert_eq!(cfg.world_width, 7);
        assert_eq!(cfg.world_height, 20);
        assert_eq!(cfg.wait_limit_max, 99);
    }
}
