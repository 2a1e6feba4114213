//! MargaNav - Deadline-bounded grid navigation
//!
//! Steers an agent across a 4-connected occupancy grid toward a goal while
//! the map changes under it.
//!
//! ## Components
//!
//! - [`grid`]: occupancy map, positions and board labels ("A1")
//! - [`planning`]: anytime A* with a wall-clock deadline and pluggable heuristics
//! - [`obstacles`]: connectivity-preserving wall injection and perception overlays
//! - [`navigation`]: replan policy, controller state machine and session runner
//!
//! ## Example
//!
//! ```
//! use marga_nav::{ControllerConfig, GridMap, NavigationController, NavigationSession, Position, SimulatedMover};
//!
//! let mut map = GridMap::new(4, 12);
//! let goal = Position::new(3, 11);
//! let mut controller = NavigationController::new(ControllerConfig::default(), goal);
//! let mut agent = SimulatedMover::new(Position::new(0, 0));
//!
//! let report = NavigationSession::new(100)
//!     .run(&mut controller, &mut map, &mut agent)
//!     .unwrap();
//! assert!(report.arrived());
//! ```

pub mod config;
pub mod error;
pub mod grid;
pub mod navigation;
pub mod obstacles;
pub mod planning;

pub use config::MargaConfig;
pub use error::{MargaError, Result};
pub use grid::{GridMap, LabelCodec, Position};
pub use navigation::{
    ControllerConfig, DynamicWallConfig, Move, MoveSegment, MoveSink, NavState,
    NavigationController, NavigationSession, PositionSource, ReplanPolicy, ReplanReason,
    SessionReport, SimulatedMover, compress_moves, path_to_moves,
};
pub use obstacles::{InjectorConfig, ObstacleInjector, ObstacleOverlay, OverlayDiff};
pub use planning::{
    AnytimeAStar, Euclidean, Heuristic, HeuristicKind, Manhattan, SearchConfig, SearchOutcome,
    Zero, path_exists,
};
