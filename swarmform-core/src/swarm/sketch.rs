//! Editable pattern draft, the model behind interactive pattern authoring.
//!
//! A sketch starts as an empty 3×3 grid. Cells are toggled one at a time and
//! the grid can grow or shrink by a row or column; every resize starts over
//! with a blank grid. [`PatternSketch::build`] freezes the draft into a
//! [`Pattern`].

use super::pattern::Pattern;
use crate::error::{Result, SwarmError};

const INITIAL_SIZE: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternSketch {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl PatternSketch {
    pub fn new() -> Self {
        Self::with_size(INITIAL_SIZE, INITIAL_SIZE)
    }

    /// Blank sketch of the given size, clamped to at least 1×1.
    pub fn with_size(width: usize, height: usize) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        PatternSketch {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x]
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    /// Flip one cell. Returns false when `(x, y)` lies outside the sketch.
    pub fn toggle(&mut self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = y * self.width + x;
        self.cells[idx] = !self.cells[idx];
        true
    }

    pub fn grow_width(&mut self) {
        self.resize(self.width + 1, self.height);
    }

    pub fn shrink_width(&mut self) {
        if self.width > 1 {
            self.resize(self.width - 1, self.height);
        }
    }

    pub fn grow_height(&mut self) {
        self.resize(self.width, self.height + 1);
    }

    pub fn shrink_height(&mut self) {
        if self.height > 1 {
            self.resize(self.width, self.height - 1);
        }
    }

    fn resize(&mut self, width: usize, height: usize) {
        *self = Self::with_size(width, height);
    }

    /// Freeze the draft. A sketch with nothing filled has nothing to form.
    pub fn build(&self) -> Result<Pattern> {
        if self.filled_count() == 0 {
            return Err(SwarmError::EmptyPattern);
        }
        Pattern::new(self.width, self.height, self.cells.clone())
    }
}

impl Default for PatternSketch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_blank_three_by_three() {
        let sketch = PatternSketch::new();
        assert_eq!((sketch.width(), sketch.height()), (3, 3));
        assert_eq!(sketch.filled_count(), 0);
    }

    #[test]
    fn toggle_flips_and_ignores_outside() {
        let mut sketch = PatternSketch::new();
        assert!(sketch.toggle(2, 1));
        assert!(sketch.is_filled(2, 1));
        assert!(sketch.toggle(2, 1));
        assert!(!sketch.is_filled(2, 1));
        assert!(!sketch.toggle(3, 0));
        assert_eq!(sketch.filled_count(), 0);
    }

    #[test]
    fn shrinking_stops_at_one_cell() {
        let mut sketch = PatternSketch::new();
        for _ in 0..5 {
            sketch.shrink_width();
            sketch.shrink_height();
        }
        assert_eq!((sketch.width(), sketch.height()), (1, 1));
    }

    #[test]
    fn resize_clears_cells() {
        let mut sketch = PatternSketch::new();
        sketch.toggle(0, 0);
        sketch.grow_width();
        assert_eq!(sketch.width(), 4);
        assert_eq!(sketch.filled_count(), 0);
    }

    #[test]
    fn build_matches_toggled_cells() {
        let mut sketch = PatternSketch::new();
        sketch.grow_height();
        sketch.toggle(0, 0);
        sketch.toggle(2, 3);

        let ptn = sketch.build().unwrap();
        assert_eq!((ptn.width(), ptn.height()), (3, 4));
        assert_eq!(ptn.positions(), &[(0, 0), (2, 3)]);
    }

    #[test]
    fn empty_sketch_is_refused() {
        assert!(matches!(
            PatternSketch::new().build(),
            Err(SwarmError::EmptyPattern)
        ));
    }
}
