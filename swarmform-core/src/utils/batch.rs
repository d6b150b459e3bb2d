use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::config::BatchConfig;
use crate::error::{Result, SwarmError};
use crate::rng::{create_rng, derive_run_seed};
use crate::swarm::{Pattern, SwarmConfig, World};

/// How a single run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// The pattern first appeared on this tick.
    Formed { ticks: u64 },
    /// The tick budget ran out first.
    Failed,
}

impl RunOutcome {
    pub fn of(world: &World) -> Self {
        if world.pattern_created() {
            RunOutcome::Formed {
                ticks: world.ticks(),
            }
        } else {
            RunOutcome::Failed
        }
    }

    pub fn is_formed(&self) -> bool {
        matches!(self, RunOutcome::Formed { .. })
    }
}

/// One line of a batch log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run: usize,
    pub seed: u64,
    pub drones: usize,
    pub outcome: RunOutcome,
}

/// `"<drones>, <ticks>"` or `"<drones>, failure"`.
impl fmt::Display for RunRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            RunOutcome::Formed { ticks } => write!(f, "{}, {}", self.drones, ticks),
            RunOutcome::Failed => write!(f, "{}, failure", self.drones),
        }
    }
}

/// Tick until the pattern forms or `tick_limit` ticks have run.
pub fn run_to_completion(world: &mut World, tick_limit: u64) -> Result<RunOutcome> {
    while !world.pattern_created() && world.ticks() < tick_limit {
        world.tick()?;
    }
    Ok(RunOutcome::of(world))
}

/// Fresh world, `drones` spawned, run to completion. The finished world is
/// returned for inspection.
pub fn run_once(
    pattern: Arc<Pattern>,
    config: &SwarmConfig,
    drones: usize,
    tick_limit: u64,
) -> Result<(RunOutcome, World)> {
    let mut world = World::new(config.clone(), pattern)?;
    world.spawn_drones(drones)?;
    let outcome = run_to_completion(&mut world, tick_limit)?;
    Ok((outcome, world))
}

/// Every record of a finished batch, in run order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchSummary {
    pub base_seed: u64,
    pub records: Vec<RunRecord>,
}

impl BatchSummary {
    pub fn formed(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_formed()).count()
    }

    pub fn failed(&self) -> usize {
        self.records.len() - self.formed()
    }

    /// Mean formation tick over the successful runs.
    pub fn mean_ticks(&self) -> Option<f64> {
        let ticks: Vec<u64> = self
            .records
            .iter()
            .filter_map(|r| match r.outcome {
                RunOutcome::Formed { ticks } => Some(ticks),
                RunOutcome::Failed => None,
            })
            .collect();
        if ticks.is_empty() {
            return None;
        }
        Some(ticks.iter().sum::<u64>() as f64 / ticks.len() as f64)
    }

    /// Write `<log_dir>/<pattern_name>/<YYYY-mm-dd-HHMM>.log`, one record per
    /// line. Returns the file written.
    pub fn write_log(&self, log_dir: &Path, pattern_name: &str) -> Result<PathBuf> {
        let dir = log_dir.join(pattern_name);
        fs::create_dir_all(&dir).map_err(|e| SwarmError::io(&dir, e))?;

        let stamp = chrono::Local::now().format("%Y-%m-%d-%H%M");
        let path = dir.join(format!("{}.log", stamp));
        self.write_log_to(&path)?;
        Ok(path)
    }

    pub fn write_log_to(&self, path: &Path) -> Result<()> {
        let mut file = fs::File::create(path).map_err(|e| SwarmError::io(path, e))?;
        for record in &self.records {
            writeln!(file, "{}", record).map_err(|e| SwarmError::io(path, e))?;
        }
        Ok(())
    }
}

/// Repeats independent runs of one pattern.
///
/// Each run gets its own seed derived from the batch seed, so the records do
/// not depend on how rayon schedules the runs.
pub struct BatchRunner {
    config: BatchConfig,
    pattern: Arc<Pattern>,
}

impl BatchRunner {
    pub fn new(config: BatchConfig, pattern: impl Into<Arc<Pattern>>) -> Result<Self> {
        config.validate()?;
        Ok(BatchRunner {
            config,
            pattern: pattern.into(),
        })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn run(&self) -> Result<BatchSummary> {
        let base_seed = self.config.seed.unwrap_or_else(rand::random);

        info!(
            "📊 [Batch] Running {} runs on a {}x{} grid (seed {}, tick limit {})",
            self.config.runs,
            self.config.swarm.world_width,
            self.config.swarm.world_height,
            base_seed,
            self.config.tick_limit
        );

        let records = (0..self.config.runs)
            .into_par_iter()
            .map(|run| self.run_single(run, base_seed))
            .collect::<Result<Vec<_>>>()?;

        let summary = BatchSummary { base_seed, records };
        info!(
            "📈 [Batch] Complete. formed {}/{} (mean ticks {})",
            summary.formed(),
            summary.records.len(),
            summary
                .mean_ticks()
                .map(|m| format!("{:.1}", m))
                .unwrap_or_else(|| "-".to_string())
        );
        Ok(summary)
    }

    /// Reproduce one run of a batch, returning its record and final world.
    pub fn replay(&self, run: usize, base_seed: u64) -> Result<(RunRecord, World)> {
        let seed = derive_run_seed(base_seed, run);
        let mut rng = create_rng(seed);
        let drones = self.config.drones.draw(&mut rng);
        let swarm = self.config.swarm.clone().with_seed(rng.gen());

        let (outcome, world) = run_once(self.pattern.clone(), &swarm, drones, self.config.tick_limit)?;
        let record = RunRecord {
            run,
            seed,
            drones,
            outcome,
        };
        debug!("[Batch] run {}: {}", run, record);
        Ok((record, world))
    }

    fn run_single(&self, run: usize, base_seed: u64) -> Result<RunRecord> {
        self.replay(run, base_seed).map(|(record, _)| record)
    }
}
