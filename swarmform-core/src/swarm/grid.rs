// grid.rs — Toroidal occupancy grid.
//
// One slot per cell, holding the id of the drone standing there.
// Every lookup reduces coordinates modulo width/height, so the grid has no edges.
// Rebuild: one O(N) pass over the drones after conflicts are resolved.

use super::drone::{Drone, DroneId};

/// Cell index → drone id table.  Rebuilt by the world once per tick; drones
/// only ever see it through a shared reference.
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    slots: Vec<Option<DroneId>>,
    width: usize,
    height: usize,
}

impl OccupancyGrid {
    pub fn new(width: usize, height: usize) -> Self {
        OccupancyGrid {
            slots: vec![None; width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reduce any coordinate pair onto the grid.
    #[inline(always)]
    pub fn wrap(&self, x: i32, y: i32) -> (i32, i32) {
        (
            x.rem_euclid(self.width as i32),
            y.rem_euclid(self.height as i32),
        )
    }

    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> usize {
        let (x, y) = self.wrap(x, y);
        y as usize * self.width + x as usize
    }

    /// Drone standing on `(x, y)`, after wrapping.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<DroneId> {
        self.slots[self.index(x, y)]
    }

    #[inline]
    pub fn occupied(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some()
    }

    /// Claim a cell for `id`. Returns the previous occupant, if any.
    pub fn place(&mut self, x: i32, y: i32, id: DroneId) -> Option<DroneId> {
        let idx = self.index(x, y);
        self.slots[idx].replace(id)
    }

    /// Empty cells in row-major order.
    pub fn open_positions(&self) -> Vec<(i32, i32)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(i, _)| ((i % self.width) as i32, (i / self.width) as i32))
            .collect()
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Discard all slots and refill them from final drone positions.
    ///
    /// Callers must have resolved conflicts first; a second drone on the
    /// same cell is a broken invariant.
    pub fn rebuild(&mut self, drones: &[Drone]) {
        self.slots.iter_mut().for_each(|slot| *slot = None);

        for drone in drones {
            let (x, y) = drone.position();
            let previous = self.place(x, y, drone.id());
            debug_assert!(
                previous.is_none(),
                "cell ({}, {}) claimed by drones {:?} and {}",
                x,
                y,
                previous,
                drone.id()
            );
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_wrap_in_both_directions() {
        let mut grid = OccupancyGrid::new(5, 3);
        grid.place(4, 0, 7);

        assert_eq!(grid.occupied(-1, 0), grid.occupied(4, 0));
        assert_eq!(grid.occupied(5, 0), grid.occupied(0, 0));
        assert_eq!(grid.get(-1, 3), Some(7));
        assert_eq!(grid.get(9, -6), Some(7));
        assert!(!grid.occupied(0, 0));
    }

    #[test]
    fn open_positions_skip_claimed_cells() {
        let mut grid = OccupancyGrid::new(2, 2);
        grid.place(1, 0, 0);
        grid.place(0, 1, 1);

        assert_eq!(grid.open_positions(), vec![(0, 0), (1, 1)]);
        assert_eq!(grid.occupied_count(), 2);
    }

    #[test]
    fn rebuild_replaces_previous_contents() {
        let mut grid = OccupancyGrid::new(4, 4);
        grid.place(3, 3, 9);

        let drones = vec![Drone::new(0, 1, 1, 80), Drone::new(1, 2, 0, 80)];
        grid.rebuild(&drones);

        assert_eq!(grid.get(1, 1), Some(0));
        assert_eq!(grid.get(2, 0), Some(1));
        assert!(!grid.occupied(3, 3));
        assert_eq!(grid.occupied_count(), 2);
    }
}
