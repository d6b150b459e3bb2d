//! Error types for the swarm engine and its batch harness.

use std::path::PathBuf;

/// Errors surfaced by pattern construction, world setup and ticking.
///
/// Nothing in the engine retries; every variant is reported to the caller
/// as soon as it happens.
#[derive(Debug, thiserror::Error)]
pub enum SwarmError {
    /// Declared pattern dimensions disagree with the supplied cell array.
    #[error("dimensions and array do not agree: width {width}, height {height}, array size {len}")]
    DimensionMismatch {
        width: usize,
        height: usize,
        len: usize,
    },

    /// Constructor input that no pattern can be built from.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// A pattern source without a single row, or a sketch without a filled cell.
    #[error("pattern has no filled cells to form")]
    EmptyPattern,

    /// A pattern or log file could not be read or written.
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Spawn was requested on a world with no open cell left.
    #[error("no open cell left on a {width}x{height} grid")]
    GridFull { width: usize, height: usize },

    /// Placement was requested on a cell another drone already holds.
    #[error("cell ({x}, {y}) is already occupied")]
    CellOccupied { x: i32, y: i32 },

    /// Conflict resolution did not reach a fixpoint within its round cap.
    #[error("conflicts still unresolved after {rounds} rounds")]
    UnresolvedConflicts { rounds: usize },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A configuration file is not valid JSON for the expected shape.
    #[error("malformed configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl SwarmError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SwarmError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SwarmError>;
