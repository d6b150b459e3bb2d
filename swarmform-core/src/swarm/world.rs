//! World orchestration.
//!
//! The world owns the occupancy grid and every drone. A tick runs in strict
//! phases so that no drone observes another drone's move from the same tick:
//!
//! 1. **Decide** -- every drone steps against the grid as it stood at the end
//!    of the previous tick. The grid is not touched.
//! 2. **Resolve** -- drones proposing a shared cell all roll back, repeated
//!    until no cell is claimed twice.
//! 3. **Commit** -- the grid is rebuilt from final positions.
//! 4. **Detect** -- the pattern flag latches once any drone has latched.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rand::Rng;
use rand_chacha::ChaCha12Rng;
use tracing::{debug, info, warn};

use super::drone::{Drone, DroneId};
use super::grid::OccupancyGrid;
use super::pattern::Pattern;
use super::SwarmConfig;
use crate::error::{Result, SwarmError};
use crate::rng::create_rng;

/// What a renderer needs to know about one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellState {
    Empty,
    /// A drone that has not joined the pattern.
    Drone,
    /// A drone latched into a pattern instance.
    Latched,
}

impl CellState {
    pub fn symbol(self) -> char {
        match self {
            CellState::Empty => '.',
            CellState::Drone => 'o',
            CellState::Latched => '@',
        }
    }
}

/// Summary of a single tick's execution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick counter after this tick.
    pub tick: u64,
    /// Drones whose committed position differs from their start position.
    pub moved: usize,
    /// Drones rolled back by conflict resolution.
    pub reverted: usize,
    /// Resolution rounds needed to reach a conflict-free layout.
    pub resolution_rounds: usize,
    /// Drones latched into the pattern.
    pub latched: usize,
}

#[derive(Clone, Debug)]
pub struct World {
    config: SwarmConfig,
    grid: OccupancyGrid,
    agents: Vec<Drone>,
    pattern: Arc<Pattern>,
    rng: ChaCha12Rng,
    ticks: u64,
    pattern_created: bool,
}

impl World {
    pub fn new(config: SwarmConfig, pattern: impl Into<Arc<Pattern>>) -> Result<Self> {
        config.validate()?;

        debug!(
            "[World] {}x{} grid, seed {}",
            config.world_width, config.world_height, config.seed
        );

        Ok(World {
            grid: OccupancyGrid::new(config.world_width, config.world_height),
            agents: Vec::new(),
            pattern: pattern.into(),
            rng: create_rng(config.seed),
            ticks: 0,
            pattern_created: false,
            config,
        })
    }

    // =========================================================================
    // Spawning
    // =========================================================================

    /// Place a new drone on a uniformly random open cell.
    pub fn spawn_drone(&mut self) -> Result<DroneId> {
        let open = self.grid.open_positions();
        if open.is_empty() {
            return Err(SwarmError::GridFull {
                width: self.width(),
                height: self.height(),
            });
        }
        let (x, y) = open[self.rng.gen_range(0..open.len())];
        self.insert_drone(x, y)
    }

    pub fn spawn_drones(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            self.spawn_drone()?;
        }
        Ok(())
    }

    /// Place a new drone on a chosen cell. Coordinates wrap.
    pub fn spawn_drone_at(&mut self, x: i32, y: i32) -> Result<DroneId> {
        let (x, y) = self.grid.wrap(x, y);
        if self.grid.occupied(x, y) {
            return Err(SwarmError::CellOccupied { x, y });
        }
        self.insert_drone(x, y)
    }

    fn insert_drone(&mut self, x: i32, y: i32) -> Result<DroneId> {
        let id = self.agents.len();
        let wait_limit = self
            .rng
            .gen_range(self.config.wait_limit_min..=self.config.wait_limit_max);
        self.grid.place(x, y, id);
        self.agents.push(Drone::new(id, x, y, wait_limit));
        Ok(id)
    }

    // =========================================================================
    // Ticking
    // =========================================================================

    /// Advance the world by one synchronous step.
    pub fn tick(&mut self) -> Result<TickReport> {
        let snapshot = &self.grid;
        let pattern = self.pattern.as_ref();
        for drone in self.agents.iter_mut() {
            drone.step(snapshot, pattern, &self.config, &mut self.rng);
        }

        self.commit()
    }

    /// Resolve, rebuild and detect. Drones already hold their proposals.
    fn commit(&mut self) -> Result<TickReport> {
        let (resolution_rounds, reverted) = self.resolve_conflicts()?;

        self.grid.rebuild(&self.agents);

        let latched = self.agents.iter().filter(|d| d.in_pattern()).count();
        let moved = self.agents.iter().filter(|d| d.has_moved()).count();

        self.ticks += 1;
        if latched > 0 && !self.pattern_created {
            self.pattern_created = true;
            info!(
                "✨ [World] Pattern formed at tick {} ({} drones latched)",
                self.ticks, latched
            );
        }

        Ok(TickReport {
            tick: self.ticks,
            moved,
            reverted,
            resolution_rounds,
            latched,
        })
    }

    /// Roll back every drone sharing a cell until all cells are claimed at
    /// most once. Returns `(rounds, drones reverted)`.
    ///
    /// Start-of-tick positions are pairwise distinct, so every round sends at
    /// least one moved drone home for good. The cap can only trip when that
    /// invariant is already broken.
    fn resolve_conflicts(&mut self) -> Result<(usize, usize)> {
        let cap = self.agents.len() + 1;
        let mut rounds = 0;
        let mut reverted = vec![false; self.agents.len()];

        loop {
            let conflicts = self.conflicting_drones();
            if conflicts.is_empty() {
                break;
            }
            if rounds >= cap {
                warn!(
                    "🚫 [World] {} drones still share cells after {} rounds",
                    conflicts.len(),
                    rounds
                );
                return Err(SwarmError::UnresolvedConflicts { rounds });
            }
            rounds += 1;

            for id in conflicts {
                let drone = &mut self.agents[id];
                if drone.has_moved() {
                    drone.revert();
                    reverted[id] = true;
                }
            }
        }

        let reverted = reverted.into_iter().filter(|r| *r).count();
        if reverted > 0 {
            debug!(
                "[World] tick {}: {} drones reverted in {} rounds",
                self.ticks + 1,
                reverted,
                rounds
            );
        }
        Ok((rounds, reverted))
    }

    /// Ids of every drone standing on a cell with at least one other drone.
    fn conflicting_drones(&self) -> Vec<DroneId> {
        let mut by_cell: HashMap<(i32, i32), Vec<DroneId>> = HashMap::new();
        for drone in &self.agents {
            by_cell.entry(drone.position()).or_default().push(drone.id());
        }
        by_cell
            .into_values()
            .filter(|group| group.len() > 1)
            .flatten()
            .collect()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Whether any drone has ever completed the pattern.
    pub fn pattern_created(&self) -> bool {
        self.pattern_created
    }

    pub fn pattern(&self) -> &Arc<Pattern> {
        &self.pattern
    }

    /// Swap the active template. Latched drones stay latched.
    pub fn set_pattern(&mut self, pattern: impl Into<Arc<Pattern>>) {
        self.pattern = pattern.into();
    }

    pub fn drones(&self) -> &[Drone] {
        &self.agents
    }

    pub fn drone(&self, id: DroneId) -> Option<&Drone> {
        self.agents.get(id)
    }

    /// Read-only occupancy as of the last completed tick.
    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn occupied(&self, x: i32, y: i32) -> bool {
        self.grid.occupied(x, y)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Drone> {
        self.grid.get(x, y).map(|id| &self.agents[id])
    }

    pub fn open_positions(&self) -> Vec<(i32, i32)> {
        self.grid.open_positions()
    }

    pub fn cell(&self, x: i32, y: i32) -> CellState {
        match self.get(x, y) {
            None => CellState::Empty,
            Some(drone) if drone.in_pattern() => CellState::Latched,
            Some(_) => CellState::Drone,
        }
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellState> + '_ {
        let width = self.width();
        (0..width * self.height()).map(move |i| self.cell((i % width) as i32, (i / width) as i32))
    }
}

/// ASCII rendering, one line per row.
impl fmt::Display for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.width();
        let mut line = String::with_capacity(width);
        for (i, cell) in self.cells().enumerate() {
            line.push(cell.symbol());
            if (i + 1) % width == 0 {
                writeln!(f, "{}", line)?;
                line.clear();
            }
        }
        Ok(())
    }
}
