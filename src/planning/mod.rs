//! Path planning module.
//!
//! This module provides:
//! - Pluggable heuristics (Manhattan, Euclidean, zero, or any closure)
//! - Deadline-bounded anytime A* over the grid map
//! - An unbounded reachability check used by obstacle placement

mod astar;
mod heuristic;

pub use astar::{AnytimeAStar, SearchConfig, SearchOutcome, path_exists};
pub use heuristic::{Euclidean, Heuristic, HeuristicKind, Manhattan, Zero};
