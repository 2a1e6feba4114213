//! Boolean passability map over integer cell coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MargaError, Result};

/// Unit offsets in neighbor order: +x, -x, +y, -y.
///
/// Search tie-breaking depends on this order, so it must not change.
pub const CARDINAL_OFFSETS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Grid cell coordinates (x = column, y = row)
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Column index
    pub x: i32,
    /// Row index
    pub y: i32,
}

impl Position {
    /// Create a new position
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another position
    #[inline]
    pub fn manhattan_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Position shifted by an offset
    #[inline]
    pub fn offset(&self, dx: i32, dy: i32) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }

    /// The 4 cardinal neighbors in +x, -x, +y, -y order, unfiltered.
    #[inline]
    pub fn neighbors_4(&self) -> [Position; 4] {
        CARDINAL_OFFSETS.map(|(dx, dy)| self.offset(dx, dy))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Rectangular passability map.
///
/// Dimensions are fixed at construction. Cells start free and are only
/// changed through [`set_obstacle`](Self::set_obstacle),
/// [`clear_obstacle`](Self::clear_obstacle) and [`reset`](Self::reset).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    width: usize,
    height: usize,
    /// Row-major blocked flags: `true` = obstacle
    blocked: Vec<bool>,
}

impl GridMap {
    /// Create a map with every cell free.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            blocked: vec![false; width * height],
        }
    }

    /// Number of columns
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Check if a position lies inside the map extents.
    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Fail with `OutOfBounds` unless `pos` is inside the map.
    pub fn check_bounds(&self, pos: Position) -> Result<()> {
        if self.contains(pos) {
            Ok(())
        } else {
            Err(MargaError::OutOfBounds {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            })
        }
    }

    #[inline]
    fn index(&self, pos: Position) -> Result<usize> {
        self.check_bounds(pos)?;
        Ok(pos.y as usize * self.width + pos.x as usize)
    }

    /// Check if a cell is free.
    pub fn is_passable(&self, pos: Position) -> Result<bool> {
        let idx = self.index(pos)?;
        Ok(!self.blocked[idx])
    }

    /// Mark a cell as an obstacle. Idempotent.
    pub fn set_obstacle(&mut self, pos: Position) -> Result<()> {
        let idx = self.index(pos)?;
        self.blocked[idx] = true;
        Ok(())
    }

    /// Mark a cell as free. Idempotent.
    pub fn clear_obstacle(&mut self, pos: Position) -> Result<()> {
        let idx = self.index(pos)?;
        self.blocked[idx] = false;
        Ok(())
    }

    /// Set every cell to the same state (`blocked = false` frees the whole map).
    pub fn reset(&mut self, blocked: bool) {
        self.blocked.fill(blocked);
    }

    /// In-bounds, passable cells one unit step away, in +x, -x, +y, -y order.
    pub fn neighbors4(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        pos.neighbors_4()
            .into_iter()
            .filter(move |&n| matches!(self.is_passable(n), Ok(true)))
    }

    /// All cell positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let width = self.width as i32;
        (0..self.height as i32).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }

    /// Free cells in row-major order.
    pub fn free_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions()
            .filter(move |&p| matches!(self.is_passable(p), Ok(true)))
    }

    /// Number of blocked cells
    pub fn obstacle_count(&self) -> usize {
        self.blocked.iter().filter(|&&b| b).count()
    }
}

impl fmt::Display for GridMap {
    /// One line per row: `.` free, `#` blocked.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.blocked.chunks(self.width.max(1)) {
            let line: String = row.iter().map(|&b| if b { '#' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
