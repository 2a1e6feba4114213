//! Pluggable cost-to-go estimators.
//!
//! The search engine takes any [`Heuristic`] at call time. Only the
//! built-in estimators are admissible on a 4-connected unit-cost grid;
//! substituted estimators (closures, learned models) are assumed to be
//! goal-directed but may overestimate, in which case the returned path is
//! not guaranteed optimal and anytime progress tracking follows the
//! estimator rather than true distance.

use serde::Deserialize;

use crate::grid::Position;

/// Estimate of remaining cost from a position to the goal.
///
/// Implementations must return non-negative values.
pub trait Heuristic {
    /// Estimated cost from `from` to `goal`
    fn estimate(&self, from: Position, goal: Position) -> f64;
}

impl<F> Heuristic for F
where
    F: Fn(Position, Position) -> f64,
{
    fn estimate(&self, from: Position, goal: Position) -> f64 {
        self(from, goal)
    }
}

/// Exact Manhattan distance. Admissible and consistent for unit 4-connected moves.
#[derive(Clone, Copy, Debug, Default)]
pub struct Manhattan;

impl Heuristic for Manhattan {
    #[inline]
    fn estimate(&self, from: Position, goal: Position) -> f64 {
        from.manhattan_distance(&goal) as f64
    }
}

/// Straight-line distance. Admissible but weaker than Manhattan on 4-connected grids.
#[derive(Clone, Copy, Debug, Default)]
pub struct Euclidean;

impl Heuristic for Euclidean {
    #[inline]
    fn estimate(&self, from: Position, goal: Position) -> f64 {
        let dx = (goal.x - from.x) as f64;
        let dy = (goal.y - from.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Always zero: turns the search into uniform-cost search.
#[derive(Clone, Copy, Debug, Default)]
pub struct Zero;

impl Heuristic for Zero {
    #[inline]
    fn estimate(&self, _from: Position, _goal: Position) -> f64 {
        0.0
    }
}

/// Built-in heuristic selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeuristicKind {
    #[default]
    Manhattan,
    Euclidean,
    Zero,
}

impl HeuristicKind {
    /// Boxed estimator for this kind
    pub fn build(self) -> Box<dyn Heuristic + Send> {
        match self {
            HeuristicKind::Manhattan => Box::new(Manhattan),
            HeuristicKind::Euclidean => Box::new(Euclidean),
            HeuristicKind::Zero => Box::new(Zero),
        }
    }
}
