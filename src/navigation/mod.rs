//! Navigation module.
//!
//! This module provides:
//! - Unit moves and segment compression
//! - The replan decision policy
//! - The replanning controller state machine
//! - A session runner with an in-memory simulated agent

mod controller;
mod moves;
mod replan;
mod session;

pub use controller::{ControllerConfig, DynamicWallConfig, NavState, NavigationController};
pub use moves::{Move, MoveSegment, compress_moves, path_to_moves};
pub use replan::{ReplanPolicy, ReplanReason};
pub use session::{MoveSink, NavigationSession, PositionSource, SessionReport, SimulatedMover};
