//! Configuration loading for MargaNav

use crate::error::{MargaError, Result};
use crate::grid::{GridMap, LabelCodec, Position};
use crate::navigation::{ControllerConfig, DynamicWallConfig};
use crate::obstacles::InjectorConfig;
use crate::planning::HeuristicKind;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MargaConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub mission: MissionConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub dynamic_walls: DynamicWallsConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Board dimensions and static walls
#[derive(Clone, Debug, Deserialize)]
pub struct GridConfig {
    /// Number of columns (default: 4)
    #[serde(default = "default_width")]
    pub width: usize,

    /// Number of rows (default: 12)
    #[serde(default = "default_height")]
    pub height: usize,

    /// Blocked cells as labels, e.g. ["B3", "C3"]
    #[serde(default)]
    pub walls: Vec<String>,
}

/// Start and goal cells
#[derive(Clone, Debug, Deserialize)]
pub struct MissionConfig {
    /// Start label (default: A1)
    #[serde(default = "default_start")]
    pub start: String,

    /// Goal label (default: D12)
    #[serde(default = "default_goal")]
    pub goal: String,
}

/// Search settings
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PlannerConfig {
    /// Search time budget in milliseconds (absent = unbounded)
    #[serde(default)]
    pub deadline_ms: Option<f64>,

    /// Heuristic: manhattan, euclidean or zero (default: manhattan)
    #[serde(default)]
    pub heuristic: HeuristicKind,
}

/// Randomized wall injection
#[derive(Clone, Debug, Deserialize)]
pub struct DynamicWallsConfig {
    /// Inject walls while navigating (default: false)
    #[serde(default)]
    pub enabled: bool,

    /// Minimum seconds between attempts (default: 0.0, every tick)
    #[serde(default)]
    pub period_secs: f64,

    /// Attempt budget per session, 0 for unlimited (default: 0)
    #[serde(default)]
    pub max_attempts: usize,

    /// Plan cells ahead of the agent tried first (default: 6)
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,

    /// Keep the agent's 4 neighbors free (default: true)
    #[serde(default = "default_protect_neighbors")]
    pub protect_neighbors: bool,

    /// Candidates tested per attempt (default: 120)
    #[serde(default = "default_max_tries")]
    pub max_tries: usize,

    /// Fixed shuffle seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Session limits
#[derive(Clone, Debug, Deserialize)]
pub struct SessionConfig {
    /// Tick budget before the session gives up (default: 1000)
    #[serde(default = "default_max_ticks")]
    pub max_ticks: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            walls: Vec::new(),
        }
    }
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            start: default_start(),
            goal: default_goal(),
        }
    }
}

impl Default for DynamicWallsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            period_secs: 0.0,
            max_attempts: 0,
            lookahead: default_lookahead(),
            protect_neighbors: default_protect_neighbors(),
            max_tries: default_max_tries(),
            seed: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
        }
    }
}

// Default value functions
fn default_width() -> usize {
    4
}
fn default_height() -> usize {
    12
}
fn default_start() -> String {
    "A1".to_string()
}
fn default_goal() -> String {
    "D12".to_string()
}
fn default_lookahead() -> usize {
    6
}
fn default_protect_neighbors() -> bool {
    true
}
fn default_max_tries() -> usize {
    120
}
fn default_max_ticks() -> usize {
    1000
}

impl MargaConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MargaError::Config(format!("Failed to read config file: {}", e)))?;
        let config: MargaConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Search deadline, `None` when unbounded
    pub fn deadline(&self) -> Result<Option<Duration>> {
        self.planner
            .deadline_ms
            .map(|ms| {
                Duration::try_from_secs_f64(ms / 1000.0).map_err(|_| {
                    MargaError::Config(format!("Invalid planner.deadline_ms: {}", ms))
                })
            })
            .transpose()
    }

    pub fn injector_config(&self) -> InjectorConfig {
        InjectorConfig {
            lookahead: self.dynamic_walls.lookahead,
            protect_neighbors: self.dynamic_walls.protect_neighbors,
            max_tries: self.dynamic_walls.max_tries,
        }
    }

    /// Runtime controller settings
    pub fn controller_config(&self) -> Result<ControllerConfig> {
        let dynamic_walls = if self.dynamic_walls.enabled {
            let period = Duration::try_from_secs_f64(self.dynamic_walls.period_secs).map_err(|_| {
                MargaError::Config(format!(
                    "Invalid dynamic_walls.period_secs: {}",
                    self.dynamic_walls.period_secs
                ))
            })?;
            Some(DynamicWallConfig {
                period,
                max_attempts: self.dynamic_walls.max_attempts,
                injector: self.injector_config(),
                seed: self.dynamic_walls.seed,
            })
        } else {
            None
        };

        Ok(ControllerConfig {
            deadline: self.deadline()?,
            dynamic_walls,
        })
    }

    /// Build the board with its static walls.
    pub fn build_map(&self) -> Result<(GridMap, LabelCodec)> {
        let mut map = GridMap::new(self.grid.width, self.grid.height);
        let codec = LabelCodec::for_map(&map)?;
        for label in &self.grid.walls {
            map.set_obstacle(codec.decode(label)?)?;
        }
        Ok((map, codec))
    }

    /// Decoded `(start, goal)`; both must be free on `map`.
    pub fn mission(&self, map: &GridMap, codec: &LabelCodec) -> Result<(Position, Position)> {
        let start = codec.decode(&self.mission.start)?;
        let goal = codec.decode(&self.mission.goal)?;
        for (name, pos) in [("start", start), ("goal", goal)] {
            if !map.is_passable(pos)? {
                return Err(MargaError::Config(format!(
                    "Mission {} {} is a wall",
                    name,
                    codec.encode(pos)?
                )));
            }
        }
        Ok((start, goal))
    }
}
