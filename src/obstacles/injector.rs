//! Reachability-preserving dynamic wall placement.
//!
//! Walls are biased to be annoying but fair: cells just ahead of the agent
//! on its current plan are tried first, then every other free cell in a
//! shuffled order. A placement is only kept if the goal is still reachable
//! from the agent afterwards.

use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::Result;
use crate::grid::{GridMap, Position};
use crate::planning::path_exists;

/// Configuration for wall placement.
#[derive(Clone, Debug)]
pub struct InjectorConfig {
    /// Number of plan cells ahead of the agent tried first
    pub lookahead: usize,
    /// Never wall off the agent's 4 cardinal neighbors
    pub protect_neighbors: bool,
    /// Maximum candidates tested per placement call
    pub max_tries: usize,
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            lookahead: 6,
            protect_neighbors: true,
            max_tries: 120,
        }
    }
}

/// Places one obstacle at a time without disconnecting agent and goal.
pub struct ObstacleInjector {
    config: InjectorConfig,
    rng: StdRng,
}

impl ObstacleInjector {
    /// Create an injector seeded from the OS.
    pub fn new(config: InjectorConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create an injector with a reproducible candidate order.
    pub fn with_seed(config: InjectorConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Current configuration
    pub fn config(&self) -> &InjectorConfig {
        &self.config
    }

    /// Cells that are never candidates: agent, goal and optionally the agent's neighbors.
    pub fn protected_cells(&self, agent: Position, goal: Position) -> HashSet<Position> {
        let mut protected = HashSet::from([agent, goal]);
        if self.config.protect_neighbors {
            protected.extend(agent.neighbors_4());
        }
        protected
    }

    /// Ordered, deduplicated candidate cells.
    ///
    /// Plan cells within the look-ahead window come first (in plan order),
    /// followed by all other free cells shuffled uniformly.
    pub fn candidates(
        &mut self,
        map: &GridMap,
        agent: Position,
        goal: Position,
        current_path: Option<&[Position]>,
    ) -> Vec<Position> {
        let protected = self.protected_cells(agent, goal);
        let eligible = |p: &Position| !protected.contains(p) && matches!(map.is_passable(*p), Ok(true));

        let mut ordered = Vec::new();

        if let Some(path) = current_path {
            let ahead = match path.iter().position(|&p| p == agent) {
                Some(i) => {
                    let from = (i + 1).min(path.len());
                    let to = (from + self.config.lookahead).min(path.len());
                    &path[from..to]
                }
                None => &path[..self.config.lookahead.min(path.len())],
            };
            ordered.extend(ahead.iter().copied().filter(|p| eligible(p)));
        }

        let mut rest: Vec<Position> = map.positions().filter(|p| eligible(p)).collect();
        rest.shuffle(&mut self.rng);
        ordered.extend(rest);

        let mut seen = HashSet::with_capacity(ordered.len());
        ordered.retain(|p| seen.insert(*p));
        ordered
    }

    /// Try to commit one new obstacle.
    ///
    /// Returns the walled cell, or `None` if no candidate within `max_tries`
    /// keeps `goal` reachable from `agent`. The map is left unchanged on `None`.
    pub fn place_obstacle(
        &mut self,
        map: &mut GridMap,
        agent: Position,
        goal: Position,
        current_path: Option<&[Position]>,
    ) -> Result<Option<Position>> {
        map.check_bounds(agent)?;
        map.check_bounds(goal)?;

        let candidates = self.candidates(map, agent, goal, current_path);
        let budget = self.config.max_tries;

        for (attempt, cell) in candidates.into_iter().take(budget).enumerate() {
            map.set_obstacle(cell)?;

            if path_exists(map, agent, goal)? {
                tracing::info!(
                    "Placed wall at {} (attempt {}/{})",
                    cell,
                    attempt + 1,
                    budget
                );
                return Ok(Some(cell));
            }

            tracing::trace!("Wall at {} would disconnect goal, reverting", cell);
            map.clear_obstacle(cell)?;
        }

        tracing::debug!("No wall placement keeps {} reachable from {}", goal, agent);
        Ok(None)
    }
}
