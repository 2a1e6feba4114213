//! Applies externally perceived obstacles to the map.
//!
//! A perception source (camera, manual editor) reports the full set of
//! cells it currently sees as blocked. The overlay turns consecutive frames
//! into set/clear operations, touching only the cells it placed itself so
//! static walls survive.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::grid::{GridMap, Position};

/// Cells changed by one frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OverlayDiff {
    /// Newly blocked cells
    pub added: BTreeSet<Position>,
    /// Cells freed because they are no longer detected
    pub removed: BTreeSet<Position>,
}

impl OverlayDiff {
    /// True if the frame changed nothing.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Tracks perception-owned obstacles across frames.
#[derive(Clone, Debug, Default)]
pub struct ObstacleOverlay {
    active: BTreeSet<Position>,
}

impl ObstacleOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells currently blocked by this overlay
    pub fn active(&self) -> &BTreeSet<Position> {
        &self.active
    }

    /// Apply one perception frame.
    ///
    /// Detections on `start`, `goal`, the agent cell and the agent's
    /// in-bounds neighbors are ignored. Detections outside the map are
    /// dropped.
    pub fn apply(
        &mut self,
        map: &mut GridMap,
        detected: &BTreeSet<Position>,
        start: Position,
        goal: Position,
        agent: Option<Position>,
    ) -> Result<OverlayDiff> {
        let mut ignore = BTreeSet::from([start, goal]);
        if let Some(agent) = agent {
            ignore.insert(agent);
            ignore.extend(agent.neighbors_4().into_iter().filter(|&n| map.contains(n)));
        }

        // Cells that were already blocked by someone else stay theirs
        let mut current = BTreeSet::new();
        for &cell in detected {
            if !map.contains(cell) || ignore.contains(&cell) {
                continue;
            }
            if self.active.contains(&cell) || map.is_passable(cell)? {
                current.insert(cell);
            }
        }

        for &cell in self.active.difference(&current) {
            if !map.is_passable(cell)? {
                map.clear_obstacle(cell)?;
            }
        }
        for &cell in current.difference(&self.active) {
            map.set_obstacle(cell)?;
        }

        let diff = OverlayDiff {
            added: current.difference(&self.active).copied().collect(),
            removed: self.active.difference(&current).copied().collect(),
        };
        if !diff.is_empty() {
            tracing::debug!(
                "Perception frame: +{} -{} obstacles",
                diff.added.len(),
                diff.removed.len()
            );
        }

        self.active = current;
        Ok(diff)
    }

    /// Clear every overlay-owned obstacle from the map.
    pub fn clear(&mut self, map: &mut GridMap) -> Result<()> {
        for &cell in &self.active {
            map.clear_obstacle(cell)?;
        }
        self.active.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(list: &[(i32, i32)]) -> BTreeSet<Position> {
        list.iter().map(|&(x, y)| Position::new(x, y)).collect()
    }

    #[test]
    fn test_frames_add_and_remove() {
        let mut map = GridMap::new(4, 7);
        let mut overlay = ObstacleOverlay::new();
        let (start, goal) = (Position::new(0, 0), Position::new(3, 6));

        let diff = overlay
            .apply(&mut map, &cells(&[(1, 3), (2, 3)]), start, goal, None)
            .unwrap();
        assert_eq!(diff.added, cells(&[(1, 3), (2, 3)]));
        assert!(diff.removed.is_empty());
        assert_eq!(map.obstacle_count(), 2);

        let diff = overlay
            .apply(&mut map, &cells(&[(2, 3), (2, 4)]), start, goal, None)
            .unwrap();
        assert_eq!(diff.added, cells(&[(2, 4)]));
        assert_eq!(diff.removed, cells(&[(1, 3)]));
        assert!(map.is_passable(Position::new(1, 3)).unwrap());
        assert!(!map.is_passable(Position::new(2, 4)).unwrap());
    }

    #[test]
    fn test_protected_cells_ignored() {
        let mut map = GridMap::new(4, 7);
        let mut overlay = ObstacleOverlay::new();
        let (start, goal) = (Position::new(0, 0), Position::new(3, 6));
        let agent = Position::new(1, 1);

        let detected = cells(&[(0, 0), (3, 6), (1, 1), (1, 2), (2, 1), (3, 3), (9, 9)]);
        let diff = overlay
            .apply(&mut map, &detected, start, goal, Some(agent))
            .unwrap();
        assert_eq!(diff.added, cells(&[(3, 3)]));
        assert_eq!(map.obstacle_count(), 1);
    }

    #[test]
    fn test_static_walls_survive() {
        let mut map = GridMap::new(4, 4);
        map.set_obstacle(Position::new(2, 2)).unwrap();
        let mut overlay = ObstacleOverlay::new();
        let (start, goal) = (Position::new(0, 0), Position::new(3, 3));

        let diff = overlay
            .apply(&mut map, &cells(&[(1, 2), (2, 2)]), start, goal, None)
            .unwrap();
        assert_eq!(diff.added, cells(&[(1, 2)]));
        overlay
            .apply(&mut map, &BTreeSet::new(), start, goal, None)
            .unwrap();
        assert!(map.is_passable(Position::new(1, 2)).unwrap());
        assert!(!map.is_passable(Position::new(2, 2)).unwrap());
    }

    #[test]
    fn test_clear() {
        let mut map = GridMap::new(4, 4);
        let mut overlay = ObstacleOverlay::new();
        overlay
            .apply(
                &mut map,
                &cells(&[(1, 1), (2, 2)]),
                Position::new(0, 0),
                Position::new(3, 3),
                None,
            )
            .unwrap();
        overlay.clear(&mut map).unwrap();
        assert_eq!(map.obstacle_count(), 0);
        assert!(overlay.active().is_empty());
    }
}
