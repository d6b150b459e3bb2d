//! Drone agents.
//!
//! A drone sees only which cells around it are occupied. Each tick it tries
//! every filled pattern offset as an anchor for its own position and then
//! either latches into the pattern, holds position while its neighbourhood
//! matches, or takes one random step.

use rand::Rng;

use super::grid::OccupancyGrid;
use super::pattern::Pattern;
use super::SwarmConfig;

/// Spawn index of a drone within its world.
pub type DroneId = usize;

/// Unit moves available to a random walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    Stay,
}

impl Direction {
    pub const ALL: [Direction; 5] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
        Direction::Stay,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Stay => (0, 0),
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Where a drone sits in its wander / wait / latch cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DroneState {
    Wandering,
    WaitingLocalMatch,
    LatchedInPattern,
}

/// Outcome of testing every anchor against one occupancy snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchResult {
    /// Some anchor has every filled offset occupied.
    pub global: bool,
    /// Some anchor has every adjacent filled offset occupied.
    pub local: bool,
}

#[derive(Clone, Debug)]
pub struct Drone {
    id: DroneId,
    x: i32,
    y: i32,
    old_x: i32,
    old_y: i32,
    steps_matched: u32,
    wait_limit: u32,
    in_pattern: bool,
}

impl Drone {
    pub fn new(id: DroneId, x: i32, y: i32, wait_limit: u32) -> Self {
        Drone {
            id,
            x,
            y,
            old_x: x,
            old_y: y,
            steps_matched: 0,
            wait_limit,
            in_pattern: false,
        }
    }

    pub fn id(&self) -> DroneId {
        self.id
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Position at the start of the current tick.
    pub fn previous_position(&self) -> (i32, i32) {
        (self.old_x, self.old_y)
    }

    pub fn steps_matched(&self) -> u32 {
        self.steps_matched
    }

    pub fn wait_limit(&self) -> u32 {
        self.wait_limit
    }

    pub fn in_pattern(&self) -> bool {
        self.in_pattern
    }

    pub fn has_moved(&self) -> bool {
        self.position() != self.previous_position()
    }

    pub fn state(&self) -> DroneState {
        if self.in_pattern {
            DroneState::LatchedInPattern
        } else if self.steps_matched > 0 {
            DroneState::WaitingLocalMatch
        } else {
            DroneState::Wandering
        }
    }

    /// Test every filled offset of `pattern` as an anchor for this drone's
    /// current position.
    pub fn evaluate(&self, snapshot: &OccupancyGrid, pattern: &Pattern) -> MatchResult {
        let mut result = MatchResult::default();

        for &(px, py) in pattern.positions() {
            let mut global = true;
            let mut local = true;

            for &(nx, ny) in pattern.positions() {
                if snapshot.occupied(self.x + nx - px, self.y + ny - py) {
                    continue;
                }
                global = false;
                if (px - nx).abs() <= 1 && (py - ny).abs() <= 1 {
                    local = false;
                    break;
                }
            }

            result.global |= global;
            result.local |= local;
            if result.global {
                break;
            }
        }

        result
    }

    /// Decide this tick's move against the start-of-tick `snapshot`.
    ///
    /// Only this drone's own fields change; the proposed position may still
    /// be rolled back by the world's conflict resolution.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        snapshot: &OccupancyGrid,
        pattern: &Pattern,
        config: &SwarmConfig,
        rng: &mut R,
    ) {
        self.old_x = self.x;
        self.old_y = self.y;

        if self.in_pattern {
            return;
        }

        let matched = self.evaluate(snapshot, pattern);
        if matched.global {
            self.in_pattern = true;
            return;
        }

        if matched.local && self.steps_matched < self.wait_limit {
            self.steps_matched += 1;
            return;
        }

        self.steps_matched = 0;
        self.wait_limit = rng.gen_range(config.wait_limit_min..=config.wait_limit_max);

        let (dx, dy) = Direction::random(rng).delta();
        let (x, y) = snapshot.wrap(self.x + dx, self.y + dy);
        self.x = x;
        self.y = y;
    }

    /// Roll back to the start-of-tick position.
    pub(crate) fn revert(&mut self) {
        self.x = self.old_x;
        self.y = self.old_y;
    }

    #[cfg(test)]
    pub(crate) fn propose(&mut self, x: i32, y: i32) {
        self.old_x = self.x;
        self.old_y = self.y;
        self.x = x;
        self.y = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;

    fn snapshot_of(width: usize, height: usize, drones: &[Drone]) -> OccupancyGrid {
        let mut grid = OccupancyGrid::new(width, height);
        grid.rebuild(drones);
        grid
    }

    fn torus_distance(a: (i32, i32), b: (i32, i32), w: i32, h: i32) -> i32 {
        let dx = (a.0 - b.0).rem_euclid(w).min((b.0 - a.0).rem_euclid(w));
        let dy = (a.1 - b.1).rem_euclid(h).min((b.1 - a.1).rem_euclid(h));
        dx + dy
    }

    #[test]
    fn lone_drone_matches_single_cell_pattern() {
        let ptn = Pattern::new(1, 1, vec![true]).unwrap();
        let mut drone = Drone::new(0, 3, 4, 80);
        let grid = snapshot_of(10, 10, std::slice::from_ref(&drone));
        let mut rng = create_rng(1);

        drone.step(&grid, &ptn, &SwarmConfig::default(), &mut rng);

        assert!(drone.in_pattern());
        assert_eq!(drone.position(), (3, 4));
        assert_eq!(drone.state(), DroneState::LatchedInPattern);
    }

    #[test]
    fn neighbour_completes_global_match_from_any_anchor() {
        let ptn: Pattern = "##".parse().unwrap();
        let drones = vec![Drone::new(0, 5, 5, 80), Drone::new(1, 6, 5, 80)];
        let grid = snapshot_of(10, 10, &drones);

        for drone in &drones {
            let matched = drone.evaluate(&grid, &ptn);
            assert!(matched.global && matched.local);
        }
    }

    #[test]
    fn match_wraps_across_grid_edge() {
        let ptn: Pattern = "##".parse().unwrap();
        let drones = vec![Drone::new(0, 4, 2, 80), Drone::new(1, 0, 2, 80)];
        let grid = snapshot_of(5, 5, &drones);

        assert!(drones[0].evaluate(&grid, &ptn).global);
    }

    #[test]
    fn missing_adjacent_offset_breaks_local_match() {
        let ptn: Pattern = "##".parse().unwrap();
        let drone = Drone::new(0, 5, 5, 80);
        let grid = snapshot_of(10, 10, std::slice::from_ref(&drone));

        assert_eq!(drone.evaluate(&grid, &ptn), MatchResult::default());
    }

    #[test]
    fn missing_distant_offset_keeps_local_match() {
        let ptn: Pattern = "# #".parse().unwrap();
        let drone = Drone::new(0, 5, 5, 80);
        let grid = snapshot_of(10, 10, std::slice::from_ref(&drone));

        let matched = drone.evaluate(&grid, &ptn);
        assert!(matched.local);
        assert!(!matched.global);
    }

    #[test]
    fn local_match_holds_until_wait_limit() {
        let ptn: Pattern = "# #".parse().unwrap();
        let cfg = SwarmConfig::default();
        let mut drone = Drone::new(0, 5, 5, 3);
        let grid = snapshot_of(10, 10, std::slice::from_ref(&drone));
        let mut rng = create_rng(7);

        for expected in 1..=3 {
            drone.step(&grid, &ptn, &cfg, &mut rng);
            assert_eq!(drone.position(), (5, 5));
            assert_eq!(drone.steps_matched(), expected);
            assert_eq!(drone.state(), DroneState::WaitingLocalMatch);
        }

        drone.step(&grid, &ptn, &cfg, &mut rng);
        assert_eq!(drone.steps_matched(), 0);
        assert!((cfg.wait_limit_min..=cfg.wait_limit_max).contains(&drone.wait_limit()));
        assert_eq!(drone.previous_position(), (5, 5));
        assert!(torus_distance(drone.position(), (5, 5), 10, 10) <= 1);
    }

    #[test]
    fn unmatched_drone_walks_one_cell_and_wraps() {
        let ptn: Pattern = "##".parse().unwrap();
        let cfg = SwarmConfig::new(3, 3);
        let mut rng = create_rng(42);
        let mut drone = Drone::new(0, 0, 0, 80);

        for _ in 0..200 {
            let grid = snapshot_of(3, 3, std::slice::from_ref(&drone));
            let before = drone.position();
            drone.step(&grid, &ptn, &cfg, &mut rng);

            let (x, y) = drone.position();
            assert!((0..3).contains(&x) && (0..3).contains(&y));
            assert_eq!(drone.previous_position(), before);
            assert!(torus_distance(before, (x, y), 3, 3) <= 1);
            assert_eq!(drone.state(), DroneState::Wandering);
        }
    }

    #[test]
    fn latched_drone_ignores_later_snapshots() {
        let ptn = Pattern::new(1, 1, vec![true]).unwrap();
        let cfg = SwarmConfig::default();
        let mut rng = create_rng(3);
        let mut drone = Drone::new(0, 2, 2, 80);
        let grid = snapshot_of(10, 10, std::slice::from_ref(&drone));
        drone.step(&grid, &ptn, &cfg, &mut rng);
        assert!(drone.in_pattern());

        // An empty snapshot and an unmatched pattern change nothing.
        let empty = OccupancyGrid::new(10, 10);
        let block = Pattern::new(2, 2, vec![true; 4]).unwrap();
        for _ in 0..50 {
            drone.step(&empty, &block, &cfg, &mut rng);
            assert!(drone.in_pattern());
            assert_eq!(drone.position(), (2, 2));
        }
    }

    #[test]
    fn revert_restores_start_of_tick_position() {
        let mut drone = Drone::new(0, 1, 1, 80);
        drone.propose(2, 1);
        assert!(drone.has_moved());
        drone.revert();
        assert_eq!(drone.position(), (1, 1));
        assert!(!drone.has_moved());
    }

    #[test]
    fn random_direction_covers_all_moves() {
        let mut rng = create_rng(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(Direction::random(&mut rng).delta());
        }
        assert_eq!(seen.len(), Direction::ALL.len());
    }
}
