use std::fmt;

use crate::params::{MAZE_LENGTH_RANGE, MAZE_THRESHOLD_RANGE};

/// Errors raised by the simulation core.
///
/// Only initialization can fail. Per-step work never returns an error; capacity
/// limits are reported as [`SimEvent`](crate::system::SimEvent)s instead.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Maze dimension outside the accepted range
    InvalidMazeLength(u32),
    /// Wall probability threshold outside the accepted range
    InvalidThreshold(f32),
    /// Physical parameters that cannot produce a stable simulation
    InvalidParams(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidMazeLength(n) => write!(
                f,
                "maze dimension {} is out of range ({}-{})",
                n,
                MAZE_LENGTH_RANGE.start(),
                MAZE_LENGTH_RANGE.end()
            ),
            SimError::InvalidThreshold(t) => write!(
                f,
                "wall threshold {} is out of range ({}-{})",
                t,
                MAZE_THRESHOLD_RANGE.start(),
                MAZE_THRESHOLD_RANGE.end()
            ),
            SimError::InvalidParams(msg) => write!(f, "invalid simulation parameters: {}", msg),
        }
    }
}

impl std::error::Error for SimError {}
