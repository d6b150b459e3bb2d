use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SwarmError};
use crate::swarm::SwarmConfig;

/// How many drones each run of a batch spawns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DroneCount {
    /// Same count for every run.
    Fixed(usize),
    /// Uniform over `min, min + step, ..` up to `max`.
    Range { min: usize, max: usize, step: usize },
}

impl DroneCount {
    /// A degenerate range (`step == 0` or `min > max`) always yields `min`.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match *self {
            DroneCount::Fixed(n) => n,
            DroneCount::Range { min, max, step } => {
                min + step * rng.gen_range(0..=Self::steps(min, max, step))
            }
        }
    }

    pub fn max(&self) -> usize {
        match *self {
            DroneCount::Fixed(n) => n,
            DroneCount::Range { min, max, step } => min + step * Self::steps(min, max, step),
        }
    }

    fn steps(min: usize, max: usize, step: usize) -> usize {
        max.checked_sub(min)
            .and_then(|span| span.checked_div(step))
            .unwrap_or(0)
    }
}

impl Default for DroneCount {
    fn default() -> Self {
        DroneCount::Range {
            min: 10,
            max: 95,
            step: 5,
        }
    }
}

/// Main parameters for a batch of runs
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub swarm: SwarmConfig,
    /// How many runs of the world to try.
    pub runs: usize,
    /// How many ticks to try before giving up on a run.
    pub tick_limit: u64,
    pub drones: DroneCount,
    /// Base seed for the batch. `None` draws one from the OS.
    pub seed: Option<u64>,
    pub patterns_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl BatchConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| SwarmError::io(path, e))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let cfg: BatchConfig = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.swarm.validate()?;

        if self.runs == 0 {
            return Err(SwarmError::Config("runs must be at least 1".to_string()));
        }
        if self.tick_limit == 0 {
            return Err(SwarmError::Config("tick_limit must be at least 1".to_string()));
        }
        if let DroneCount::Range { min, max, step } = self.drones {
            if step == 0 || min > max {
                return Err(SwarmError::Config(format!(
                    "drone range {}..={} step {} is empty",
                    min, max, step
                )));
            }
        }
        let capacity = self.swarm.capacity();
        if self.drones.max() > capacity {
            return Err(SwarmError::Config(format!(
                "up to {} drones do not fit on a {}x{} grid",
                self.drones.max(),
                self.swarm.world_width,
                self.swarm.world_height
            )));
        }
        Ok(())
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            swarm: SwarmConfig::default(),
            runs: 1000,
            tick_limit: 10_000,
            drones: DroneCount::default(),
            seed: None,
            patterns_dir: PathBuf::from("data/patterns"),
            log_dir: PathBuf::from("logs"),
        }
    }
}
