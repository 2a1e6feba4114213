//! Unit moves on the grid and their batched form.
//!
//! Board convention: +x is "right", +y is "down" (row numbers grow downward).

use std::fmt;

use crate::error::{MargaError, Result};
use crate::grid::Position;

/// A single 4-connected step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    /// +x
    Right,
    /// -x
    Left,
    /// +y
    Down,
    /// -y
    Up,
}

impl Move {
    /// Move for a unit delta, or `InvalidStep` for anything else.
    pub fn from_delta(dx: i32, dy: i32) -> Result<Move> {
        match (dx, dy) {
            (1, 0) => Ok(Move::Right),
            (-1, 0) => Ok(Move::Left),
            (0, 1) => Ok(Move::Down),
            (0, -1) => Ok(Move::Up),
            _ => Err(MargaError::InvalidStep { dx, dy }),
        }
    }

    /// Move between two adjacent positions.
    pub fn between(from: Position, to: Position) -> Result<Move> {
        Self::from_delta(to.x - from.x, to.y - from.y)
    }

    /// Unit offset `(dx, dy)`
    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Move::Right => (1, 0),
            Move::Left => (-1, 0),
            Move::Down => (0, 1),
            Move::Up => (0, -1),
        }
    }

    /// Position after taking this move.
    #[inline]
    pub fn apply(self, pos: Position) -> Position {
        let (dx, dy) = self.delta();
        pos.offset(dx, dy)
    }

    pub fn name(self) -> &'static str {
        match self {
            Move::Right => "right",
            Move::Left => "left",
            Move::Down => "down",
            Move::Up => "up",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A run of identical moves, executed as one motion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveSegment {
    pub direction: Move,
    pub count: usize,
}

impl fmt::Display for MoveSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.direction, self.count)
    }
}

/// Convert a path into the moves that walk it.
pub fn path_to_moves(path: &[Position]) -> Result<Vec<Move>> {
    path.windows(2).map(|w| Move::between(w[0], w[1])).collect()
}

/// Collapse consecutive identical moves into segments.
pub fn compress_moves(moves: &[Move]) -> Vec<MoveSegment> {
    let mut segments: Vec<MoveSegment> = Vec::new();
    for &m in moves {
        match segments.last_mut() {
            Some(seg) if seg.direction == m => seg.count += 1,
            _ => segments.push(MoveSegment {
                direction: m,
                count: 1,
            }),
        }
    }
    segments
}
