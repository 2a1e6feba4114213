//! Grid world model.
//!
//! This module provides:
//! - `GridMap`, the mutable free/blocked cell map
//! - `Position` cell coordinates
//! - `LabelCodec` for board-style cell names ("A1", "D12")

mod labels;
mod map;

pub use labels::{LabelCodec, MAX_LABEL_COLUMNS};
pub use map::{CARDINAL_OFFSETS, GridMap, Position};
