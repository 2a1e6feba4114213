//! Dynamic obstacle sources.
//!
//! This module provides:
//! - `ObstacleInjector`, which adds walls without disconnecting agent and goal
//! - `ObstacleOverlay`, which mirrors perceived obstacles onto the map frame by frame

mod injector;
mod overlay;

pub use injector::{InjectorConfig, ObstacleInjector};
pub use overlay::{ObstacleOverlay, OverlayDiff};
