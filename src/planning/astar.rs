//! Deadline-bounded anytime A* over the grid map.
//!
//! Classic best-first search on a 4-connected grid, with two extras:
//! - an optional wall-clock budget checked before every frontier pop
//! - anytime tracking of the popped node with the lowest heuristic value,
//!   so an interrupted search still returns a path heading toward the goal

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::grid::{GridMap, Position};

use super::heuristic::{Heuristic, Manhattan};

/// Configuration for the A* search engine.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Cost of one 4-connected step (must be non-negative)
    pub step_cost: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { step_cost: 1.0 }
    }
}

/// Result of one search call.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchOutcome {
    /// Start-to-goal path, or the best partial path if the deadline was hit.
    /// `None` when the frontier emptied without reaching the goal.
    pub path: Option<Vec<Position>>,
    /// Whether the time budget ran out before the search finished
    pub exhausted: bool,
    /// Number of frontier pops performed
    pub expansions: usize,
    /// Accumulated cost of `path` (infinite when there is no path)
    pub cost: f64,
}

impl SearchOutcome {
    /// Check if the returned path ends at `goal`.
    pub fn reaches(&self, goal: Position) -> bool {
        self.path
            .as_ref()
            .is_some_and(|p| p.last() == Some(&goal))
    }
}

/// Frontier entry.
#[derive(Clone, Debug)]
struct SearchNode {
    pos: Position,
    g: f64,
    f: f64,
}

impl SearchNode {
    /// Priority key: ascending f, then ascending g, then ascending position.
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.f
            .total_cmp(&other.f)
            .then_with(|| self.g.total_cmp(&other.g))
            .then_with(|| self.pos.cmp(&other.pos))
    }
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.key_cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchNode {}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (lowest key = highest priority)
        other.key_cmp(self)
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Anytime A* search engine.
pub struct AnytimeAStar {
    config: SearchConfig,
}

impl AnytimeAStar {
    /// Create a new engine with configuration.
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Create a new engine with unit step cost.
    pub fn with_defaults() -> Self {
        Self::new(SearchConfig::default())
    }

    /// Search from `start` to `goal`.
    ///
    /// `deadline` of `None` runs to completion. Both endpoints must be in
    /// bounds; blocked endpoints are the caller's responsibility.
    pub fn search<H: Heuristic + ?Sized>(
        &self,
        map: &GridMap,
        start: Position,
        goal: Position,
        heuristic: &H,
        deadline: Option<Duration>,
    ) -> Result<SearchOutcome> {
        map.check_bounds(start)?;
        map.check_bounds(goal)?;

        let started = Instant::now();
        let h = |p: Position| heuristic.estimate(p, goal);

        let mut open_set = BinaryHeap::new();
        let mut g_score: HashMap<Position, f64> = HashMap::new();
        let mut parent: HashMap<Position, Option<Position>> = HashMap::new();

        g_score.insert(start, 0.0);
        parent.insert(start, None);
        open_set.push(SearchNode {
            pos: start,
            g: 0.0,
            f: h(start),
        });

        let mut best_node = start;
        let mut best_h = h(start);
        let mut expansions = 0;

        while !open_set.is_empty() {
            if let Some(limit) = deadline
                && started.elapsed() >= limit
            {
                let path = reconstruct_path(&parent, best_node);
                let cost = g_score.get(&best_node).copied().unwrap_or(f64::INFINITY);
                tracing::debug!(
                    "Search deadline of {:?} hit after {} expansions, best node {} (h={:.1})",
                    limit,
                    expansions,
                    best_node,
                    best_h
                );
                return Ok(SearchOutcome {
                    path: Some(path),
                    exhausted: true,
                    expansions,
                    cost,
                });
            }

            let Some(current) = open_set.pop() else {
                break;
            };
            expansions += 1;

            let current_h = h(current.pos);
            if current_h < best_h {
                best_node = current.pos;
                best_h = current_h;
            }

            if current.pos == goal {
                let path = reconstruct_path(&parent, goal);
                let cost = g_score[&goal];
                tracing::debug!(
                    "Search reached goal {} in {} expansions, {} cells",
                    goal,
                    expansions,
                    path.len()
                );
                return Ok(SearchOutcome {
                    path: Some(path),
                    exhausted: false,
                    expansions,
                    cost,
                });
            }

            let current_g = g_score[&current.pos];
            for next in map.neighbors4(current.pos) {
                let tentative_g = current_g + self.config.step_cost;
                if tentative_g < g_score.get(&next).copied().unwrap_or(f64::INFINITY) {
                    parent.insert(next, Some(current.pos));
                    g_score.insert(next, tentative_g);
                    open_set.push(SearchNode {
                        pos: next,
                        g: tentative_g,
                        f: tentative_g + h(next),
                    });
                }
            }
        }

        tracing::debug!(
            "No path from {} to {} ({} expansions)",
            start,
            goal,
            expansions
        );
        Ok(SearchOutcome {
            path: None,
            exhausted: false,
            expansions,
            cost: f64::INFINITY,
        })
    }
}

/// Walk parent links back to the start. Unknown nodes yield an empty path.
fn reconstruct_path(parent: &HashMap<Position, Option<Position>>, node: Position) -> Vec<Position> {
    if !parent.contains_key(&node) {
        return Vec::new();
    }

    let mut path = Vec::new();
    let mut current = Some(node);
    while let Some(p) = current {
        path.push(p);
        current = parent.get(&p).copied().flatten();
    }

    path.reverse();
    path
}

/// Unbounded reachability check with the Manhattan heuristic.
pub fn path_exists(map: &GridMap, start: Position, goal: Position) -> Result<bool> {
    let outcome = AnytimeAStar::with_defaults().search(map, start, goal, &Manhattan, None)?;
    Ok(outcome.path.is_some_and(|p| !p.is_empty()))
}
