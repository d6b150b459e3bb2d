//! Pattern templates.
//!
//! A pattern is an immutable grid of filled/unfilled cells. It can be built
//! from an explicit `(width, height, cells)` triple or parsed from `.ptn`
//! text, where every `#` is a filled cell and anything else is empty.
//! Patterns do not wrap: out-of-range queries are simply unfilled.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, SwarmError};

/// Character marking a filled cell in pattern text.
pub const FILLED_CHAR: char = '#';

/// Immutable spatial template the swarm tries to instantiate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    width: usize,
    height: usize,
    cells: Vec<bool>,
    /// Filled offsets in row-major order, cached at construction.
    positions: Vec<(i32, i32)>,
}

impl Pattern {
    /// Build a pattern from explicit dimensions and a row-major cell array.
    pub fn new(width: usize, height: usize, cells: Vec<bool>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SwarmError::InvalidArguments(format!(
                "pattern dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if width.checked_mul(height) != Some(cells.len()) {
            return Err(SwarmError::DimensionMismatch {
                width,
                height,
                len: cells.len(),
            });
        }
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(SwarmError::InvalidArguments(format!(
                "pattern {}x{} exceeds the coordinate range",
                width, height
            )));
        }

        let positions = cells
            .iter()
            .enumerate()
            .filter(|(_, filled)| **filled)
            .map(|(i, _)| ((i % width) as i32, (i / width) as i32))
            .collect();

        Ok(Pattern {
            width,
            height,
            cells,
            positions,
        })
    }

    /// Parse `.ptn` text.
    ///
    /// Trailing whitespace is stripped from every line and lines left empty
    /// are dropped without becoming rows. Rows shorter than the longest one
    /// are padded with unfilled cells.
    pub fn from_text(source: &str) -> Result<Self> {
        Self::from_lines(source.lines().map(str::to_owned))
    }

    /// Parse `.ptn` text from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let lines = reader
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| SwarmError::io("<reader>", e))?;
        Self::from_lines(lines)
    }

    /// Load a `.ptn` file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SwarmError::io(path, e))?;
        let lines = BufReader::new(file)
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| SwarmError::io(path, e))?;
        Self::from_lines(lines)
    }

    fn from_lines<I>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let rows: Vec<Vec<char>> = lines
            .into_iter()
            .map(|line| line.trim_end().chars().collect::<Vec<_>>())
            .filter(|row| !row.is_empty())
            .collect();

        let width = rows.iter().map(Vec::len).max().ok_or(SwarmError::EmptyPattern)?;
        let height = rows.len();

        let mut cells = vec![false; width * height];
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.iter().enumerate() {
                cells[y * width + x] = *c == FILLED_CHAR;
            }
        }

        Self::new(width, height, cells)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major cell array.
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Whether `(x, y)` is a filled cell. Anything outside the pattern is not.
    pub fn filled(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return false;
        }
        self.cells[y * self.width + x]
    }

    /// Filled offsets in row-major scan order.
    pub fn positions(&self) -> &[(i32, i32)] {
        &self.positions
    }

    pub fn filled_count(&self) -> usize {
        self.positions.len()
    }
}

impl FromStr for Pattern {
    type Err = SwarmError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_text(s)
    }
}

/// Renders the pattern as `.ptn` text.
impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            let line: String = row
                .iter()
                .map(|filled| if *filled { FILLED_CHAR } else { ' ' })
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
