//! MargaNav - Grid navigation runner
//!
//! Loads a board and mission, then steers a simulated agent from start to
//! goal with a deadline-bounded planner, optionally dropping random walls
//! in its way.
//!
//! Usage: `marga-nav [config.toml] [--start LABEL] [--goal LABEL]`

use marga_nav::{
    MargaConfig, MargaError, NavState, NavigationController, NavigationSession, Result,
    SimulatedMover,
};

use std::path::Path;
use tracing::{info, warn};

fn main() -> Result<()> {
    // Initialize logging
    let directive = "marga_nav=info"
        .parse()
        .map_err(|e| MargaError::Config(format!("Invalid log directive: {}", e)))?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let flag_value = |flag: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };

    let mut config = if args.len() > 1 && !args[1].starts_with("--") {
        let config_path = Path::new(&args[1]);
        info!("Loading configuration from {:?}", config_path);
        MargaConfig::load(config_path)?
    } else if Path::new("marga.toml").exists() {
        info!("Loading configuration from marga.toml");
        MargaConfig::load(Path::new("marga.toml"))?
    } else {
        info!("Using default configuration");
        MargaConfig::default()
    };

    if let Some(start) = flag_value("--start") {
        config.mission.start = start;
    }
    if let Some(goal) = flag_value("--goal") {
        config.mission.goal = goal;
    }

    info!("MargaNav v{}", env!("CARGO_PKG_VERSION"));

    let (mut map, codec) = config.build_map()?;
    let (start, goal) = config.mission(&map, &codec)?;
    info!(
        "Board {}x{} with {} walls, {} -> {}",
        map.width(),
        map.height(),
        map.obstacle_count(),
        config.mission.start,
        config.mission.goal
    );
    if config.dynamic_walls.enabled {
        info!(
            "Dynamic walls every {:.2}s (attempt budget {})",
            config.dynamic_walls.period_secs, config.dynamic_walls.max_attempts
        );
    }

    let mut controller = NavigationController::new(config.controller_config()?, goal)
        .with_heuristic(config.planner.heuristic.build());
    let mut agent = SimulatedMover::new(start);

    let report = NavigationSession::new(config.session.max_ticks).run(
        &mut controller,
        &mut map,
        &mut agent,
    )?;

    for (i, mv) in report.moves.iter().enumerate() {
        info!("Move {}: {}", i + 1, mv);
    }
    for cell in &report.walls_placed {
        info!("Wall placed at {}", codec.encode(*cell)?);
    }
    info!(
        "Finished in {:?}: {} moves, {} replans, {} ticks",
        report.final_state,
        report.moves.len(),
        report.replans,
        report.ticks
    );

    let plan: Vec<String> = report.segments().iter().map(|s| s.to_string()).collect();
    println!("{}", plan.join(", "));
    println!("{}", map);

    match report.final_state {
        NavState::Arrived => Ok(()),
        NavState::Blocked => Err(MargaError::Navigation(format!(
            "No path from {} to {}",
            config.mission.start, config.mission.goal
        ))),
        state => {
            warn!("Tick budget of {} exhausted", config.session.max_ticks);
            Err(MargaError::Navigation(format!(
                "Session aborted in state {:?}",
                state
            )))
        }
    }
}
