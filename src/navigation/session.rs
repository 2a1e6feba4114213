//! Drives a controller against an executor until the session ends.

use crate::error::Result;
use crate::grid::{GridMap, Position};

use super::controller::{NavState, NavigationController};
use super::moves::{Move, MoveSegment, compress_moves};

/// Supplies the agent's current cell, if known.
pub trait PositionSource {
    fn current_position(&self) -> Option<Position>;
}

/// Executes one move and updates the position source accordingly.
pub trait MoveSink {
    fn execute(&mut self, map: &GridMap, mv: Move) -> Result<()>;
}

/// In-memory agent that moves exactly as commanded.
///
/// Moves into blocked cells are refused and leave the agent in place.
#[derive(Clone, Debug)]
pub struct SimulatedMover {
    position: Option<Position>,
}

impl SimulatedMover {
    pub fn new(start: Position) -> Self {
        Self {
            position: Some(start),
        }
    }

    /// Agent whose position has not been observed yet.
    pub fn unlocalized() -> Self {
        Self { position: None }
    }

    /// Set or forget the position (e.g. a localization fix).
    pub fn set_position(&mut self, position: Option<Position>) {
        self.position = position;
    }
}

impl PositionSource for SimulatedMover {
    fn current_position(&self) -> Option<Position> {
        self.position
    }
}

impl MoveSink for SimulatedMover {
    fn execute(&mut self, map: &GridMap, mv: Move) -> Result<()> {
        let Some(current) = self.position else {
            tracing::warn!("Ignoring move {} with unknown position", mv);
            return Ok(());
        };
        let target = mv.apply(current);
        if map.is_passable(target)? {
            self.position = Some(target);
        } else {
            tracing::warn!("Move {} from {} blocked at {}", mv, current, target);
        }
        Ok(())
    }
}

/// Summary of a finished session.
#[derive(Clone, Debug)]
pub struct SessionReport {
    /// Controller state when the session stopped
    pub final_state: NavState,
    /// Agent position when the session stopped
    pub final_position: Option<Position>,
    /// Moves handed to the executor, in order
    pub moves: Vec<Move>,
    /// Walls placed by the injector
    pub walls_placed: Vec<Position>,
    /// Searches run
    pub replans: usize,
    /// Ticks consumed
    pub ticks: usize,
}

impl SessionReport {
    /// Check if the agent reached the goal.
    pub fn arrived(&self) -> bool {
        self.final_state == NavState::Arrived
    }

    /// Executed moves batched into segments
    pub fn segments(&self) -> Vec<MoveSegment> {
        compress_moves(&self.moves)
    }
}

/// Tick loop with a bound on the number of ticks.
#[derive(Clone, Debug)]
pub struct NavigationSession {
    max_ticks: usize,
}

impl NavigationSession {
    pub fn new(max_ticks: usize) -> Self {
        Self { max_ticks }
    }

    /// Tick until the controller reaches a terminal state or the tick budget runs out.
    pub fn run<A>(
        &self,
        controller: &mut NavigationController,
        map: &mut GridMap,
        agent: &mut A,
    ) -> Result<SessionReport>
    where
        A: PositionSource + MoveSink,
    {
        let mut moves = Vec::new();
        let mut ticks = 0;

        while ticks < self.max_ticks {
            ticks += 1;
            let position = agent.current_position();

            match controller.next_move(map, position)? {
                Some(mv) => {
                    agent.execute(map, mv)?;
                    moves.push(mv);
                }
                None if controller.state().is_terminal() => break,
                None => {}
            }
        }

        if !controller.state().is_terminal() {
            tracing::warn!(
                "Session stopped after {} ticks in state {:?}",
                ticks,
                controller.state()
            );
        }

        let report = SessionReport {
            final_state: controller.state(),
            final_position: agent.current_position(),
            moves,
            walls_placed: controller.placed_walls().to_vec(),
            replans: controller.replans(),
            ticks,
        };
        tracing::info!(
            "Session finished: {:?} after {} moves, {} replans, {} walls",
            report.final_state,
            report.moves.len(),
            report.replans,
            report.walls_placed.len()
        );
        Ok(report)
    }
}
