//! Replanning navigation state machine.
//!
//! Each call to [`NavigationController::next_move`] is one tick: read the
//! agent position, optionally perturb the map with a new wall, replan if the
//! current plan is stale, and hand back the next unit move.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::grid::{GridMap, Position};
use crate::obstacles::{InjectorConfig, ObstacleInjector};
use crate::planning::{AnytimeAStar, Heuristic, Manhattan};

use super::moves::Move;
use super::replan::{ReplanPolicy, ReplanReason};

/// Dynamic wall injection settings.
#[derive(Clone, Debug)]
pub struct DynamicWallConfig {
    /// Minimum time between injection attempts
    pub period: Duration,
    /// Injection attempts allowed per session (0 = unlimited)
    pub max_attempts: usize,
    /// Candidate selection and placement settings
    pub injector: InjectorConfig,
    /// Seed for the candidate shuffle (`None` = OS entropy)
    pub seed: Option<u64>,
}

impl Default for DynamicWallConfig {
    fn default() -> Self {
        Self {
            period: Duration::ZERO,
            max_attempts: 0,
            injector: InjectorConfig::default(),
            seed: None,
        }
    }
}

/// Configuration for the navigation controller.
#[derive(Clone, Debug, Default)]
pub struct ControllerConfig {
    /// Search time budget (`None` = unbounded)
    pub deadline: Option<Duration>,
    /// Wall injection, disabled when `None`
    pub dynamic_walls: Option<DynamicWallConfig>,
}

/// State of a navigation session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavState {
    /// No agent position known yet
    AwaitingPosition,
    /// A search is needed before the next move
    Planning,
    /// Following a valid plan
    Advancing,
    /// No path to the goal exists (terminal)
    Blocked,
    /// Agent is on the goal (terminal)
    Arrived,
}

impl NavState {
    /// Check if no further moves will be produced.
    pub fn is_terminal(self) -> bool {
        matches!(self, NavState::Blocked | NavState::Arrived)
    }
}

/// Pull-based replanning controller.
pub struct NavigationController {
    config: ControllerConfig,
    goal: Position,
    state: NavState,
    engine: AnytimeAStar,
    heuristic: Box<dyn Heuristic + Send>,
    policy: ReplanPolicy,
    injector: Option<ObstacleInjector>,
    /// Remaining plan; head is the cell the agent should occupy now
    plan: VecDeque<Position>,
    /// Set when the map changed under the current plan
    replan_required: bool,

    // --- Injection rate limiting ---
    last_injection: Option<Instant>,
    injection_attempts: usize,
    placed_walls: Vec<Position>,

    // --- Statistics ---
    replans: usize,
    last_search_exhausted: bool,
}

impl NavigationController {
    /// Create a controller heading for `goal`, using the Manhattan heuristic.
    pub fn new(config: ControllerConfig, goal: Position) -> Self {
        let injector = config.dynamic_walls.as_ref().map(|dw| match dw.seed {
            Some(seed) => ObstacleInjector::with_seed(dw.injector.clone(), seed),
            None => ObstacleInjector::new(dw.injector.clone()),
        });

        Self {
            config,
            goal,
            state: NavState::AwaitingPosition,
            engine: AnytimeAStar::with_defaults(),
            heuristic: Box::new(Manhattan),
            policy: ReplanPolicy,
            injector,
            plan: VecDeque::new(),
            replan_required: false,
            last_injection: None,
            injection_attempts: 0,
            placed_walls: Vec::new(),
            replans: 0,
            last_search_exhausted: false,
        }
    }

    /// Substitute the search heuristic.
    pub fn with_heuristic(mut self, heuristic: Box<dyn Heuristic + Send>) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Current state
    pub fn state(&self) -> NavState {
        self.state
    }

    /// Goal cell
    pub fn goal(&self) -> Position {
        self.goal
    }

    /// Remaining plan, head first
    pub fn plan(&self) -> &VecDeque<Position> {
        &self.plan
    }

    /// Number of searches run
    pub fn replans(&self) -> usize {
        self.replans
    }

    /// Walls committed by the injector, in placement order
    pub fn placed_walls(&self) -> &[Position] {
        &self.placed_walls
    }

    /// Injection attempts made so far
    pub fn injection_attempts(&self) -> usize {
        self.injection_attempts
    }

    /// Whether the most recent search ran out of time
    pub fn last_search_exhausted(&self) -> bool {
        self.last_search_exhausted
    }

    /// Signal that the map was edited externally.
    pub fn request_replan(&mut self) {
        self.replan_required = true;
    }

    /// Restart navigation toward a new goal.
    pub fn set_goal(&mut self, goal: Position) {
        tracing::info!("New goal {}", goal);
        self.goal = goal;
        self.plan.clear();
        self.replan_required = false;
        self.transition(NavState::AwaitingPosition);
    }

    /// Run one tick.
    ///
    /// Returns the next unit move, or `None` if no move can be issued this
    /// tick (unknown position, terminal state, or a search that made no
    /// progress within its deadline).
    pub fn next_move(
        &mut self,
        map: &mut GridMap,
        position: Option<Position>,
    ) -> Result<Option<Move>> {
        if self.state.is_terminal() {
            return Ok(None);
        }

        let Some(position) = position else {
            self.transition(NavState::AwaitingPosition);
            return Ok(None);
        };
        map.check_bounds(position)?;

        if position == self.goal {
            self.plan.clear();
            self.transition(NavState::Arrived);
            return Ok(None);
        }

        if self.state == NavState::AwaitingPosition {
            self.transition(NavState::Planning);
        }

        self.maybe_inject(map, position)?;

        if let Some(reason) = self
            .policy
            .evaluate(map, position, &self.plan, self.replan_required)
        {
            self.transition(NavState::Planning);
            if !self.replan(map, position, reason)? {
                return Ok(None);
            }
        }

        if self.plan.len() < 2 {
            // Deadline hit before any progress; search again next tick
            tracing::debug!("Partial plan has no next cell, waiting");
            self.transition(NavState::Planning);
            return Ok(None);
        }

        let next = Move::between(self.plan[0], self.plan[1])?;
        self.plan.pop_front();
        self.transition(NavState::Advancing);

        tracing::debug!("Move {} from {}", next, position);
        Ok(Some(next))
    }

    /// Search from `position` and replace the plan. Returns false if blocked.
    fn replan(&mut self, map: &GridMap, position: Position, reason: ReplanReason) -> Result<bool> {
        tracing::debug!("Replanning from {} ({:?})", position, reason);

        let outcome = self.engine.search(
            map,
            position,
            self.goal,
            self.heuristic.as_ref(),
            self.config.deadline,
        )?;
        self.replans += 1;
        self.last_search_exhausted = outcome.exhausted;

        match outcome.path {
            None => {
                tracing::warn!("No path from {} to goal {}", position, self.goal);
                self.plan.clear();
                self.transition(NavState::Blocked);
                Ok(false)
            }
            Some(path) => {
                if outcome.exhausted {
                    tracing::warn!(
                        "Search deadline hit, following partial plan of {} cells",
                        path.len()
                    );
                } else {
                    tracing::info!(
                        "Planned {} cells to goal ({} expansions)",
                        path.len(),
                        outcome.expansions
                    );
                }
                self.plan = path.into();
                self.replan_required = false;
                Ok(true)
            }
        }
    }

    /// Place a wall if injection is enabled, due, and within its attempt budget.
    fn maybe_inject(&mut self, map: &mut GridMap, position: Position) -> Result<()> {
        let (Some(injector), Some(dw)) = (self.injector.as_mut(), self.config.dynamic_walls.as_ref())
        else {
            return Ok(());
        };

        if dw.max_attempts != 0 && self.injection_attempts >= dw.max_attempts {
            return Ok(());
        }

        let now = Instant::now();
        let due = match self.last_injection {
            Some(last) => now.duration_since(last) >= dw.period,
            // The first tick with a known position starts the period clock
            None if dw.period.is_zero() => true,
            None => {
                self.last_injection = Some(now);
                false
            }
        };
        if !due {
            return Ok(());
        }

        self.last_injection = Some(now);
        self.injection_attempts += 1;

        let plan = self.plan.make_contiguous();
        let current_path = (!plan.is_empty()).then_some(&*plan);
        if let Some(cell) = injector.place_obstacle(map, position, self.goal, current_path)? {
            self.placed_walls.push(cell);
            self.replan_required = true;
        }
        Ok(())
    }

    fn transition(&mut self, next: NavState) {
        if self.state != next {
            tracing::info!("Navigation state: {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::path_exists;

    /// Tick until terminal, applying every move. Returns the moves taken.
    fn drive(
        ctrl: &mut NavigationController,
        map: &mut GridMap,
        start: Position,
        max_ticks: usize,
    ) -> Vec<Move> {
        let mut pos = start;
        let mut moves = Vec::new();
        for _ in 0..max_ticks {
            let walls_before = ctrl.placed_walls().len();
            let decision = ctrl.next_move(map, Some(pos)).unwrap();
            if ctrl.placed_walls().len() > walls_before {
                assert!(
                    path_exists(map, pos, ctrl.goal()).unwrap(),
                    "wall at {:?} cut {pos} off from the goal",
                    ctrl.placed_walls().last()
                );
            }
            match decision {
                Some(m) => {
                    pos = m.apply(pos);
                    assert!(map.is_passable(pos).unwrap(), "moved into a wall at {pos}");
                    moves.push(m);
                }
                None if ctrl.state().is_terminal() => break,
                None => {}
            }
        }
        moves
    }

    #[test]
    fn test_unknown_position_waits() {
        let mut map = GridMap::new(4, 12);
        let mut ctrl = NavigationController::new(ControllerConfig::default(), Position::new(3, 11));
        assert_eq!(ctrl.next_move(&mut map, None).unwrap(), None);
        assert_eq!(ctrl.state(), NavState::AwaitingPosition);
        assert_eq!(ctrl.replans(), 0);
    }

    #[test]
    fn test_arrival_short_circuits_replan() {
        let mut map = GridMap::new(4, 12);
        let goal = Position::new(3, 11);
        let mut ctrl = NavigationController::new(ControllerConfig::default(), goal);
        ctrl.request_replan();

        assert_eq!(ctrl.next_move(&mut map, Some(goal)).unwrap(), None);
        assert_eq!(ctrl.state(), NavState::Arrived);
        assert_eq!(ctrl.replans(), 0);
    }

    #[test]
    fn test_reaches_goal_with_single_plan() {
        let mut map = GridMap::new(4, 12);
        let mut ctrl = NavigationController::new(ControllerConfig::default(), Position::new(3, 11));

        let moves = drive(&mut ctrl, &mut map, Position::new(0, 0), 100);
        assert_eq!(moves.len(), 14);
        assert_eq!(ctrl.state(), NavState::Arrived);
        assert_eq!(ctrl.replans(), 1);
        assert!(ctrl.plan().is_empty());
    }

    #[test]
    fn test_blocked_is_terminal() {
        let mut map = GridMap::new(5, 5);
        let goal = Position::new(2, 2);
        for p in goal.neighbors_4() {
            map.set_obstacle(p).unwrap();
        }
        let mut ctrl = NavigationController::new(ControllerConfig::default(), goal);

        assert_eq!(ctrl.next_move(&mut map, Some(Position::new(0, 0))).unwrap(), None);
        assert_eq!(ctrl.state(), NavState::Blocked);

        map.reset(false);
        assert_eq!(ctrl.next_move(&mut map, Some(Position::new(0, 0))).unwrap(), None);
        assert_eq!(ctrl.replans(), 1);
    }

    #[test]
    fn test_off_plan_triggers_replan() {
        let mut map = GridMap::new(4, 12);
        let mut ctrl = NavigationController::new(ControllerConfig::default(), Position::new(3, 11));

        let first = ctrl.next_move(&mut map, Some(Position::new(0, 0))).unwrap();
        assert_eq!(first, Some(Move::Down));
        assert_eq!(ctrl.state(), NavState::Advancing);

        // Agent drifted sideways instead of moving down
        let next = ctrl.next_move(&mut map, Some(Position::new(1, 0))).unwrap();
        assert!(next.is_some());
        assert_eq!(ctrl.replans(), 2);
        assert_eq!(ctrl.plan().front(), Some(&next.unwrap().apply(Position::new(1, 0))));
    }

    #[test]
    fn test_external_wall_on_plan_replans() {
        let mut map = GridMap::new(4, 12);
        let mut ctrl = NavigationController::new(ControllerConfig::default(), Position::new(3, 11));
        ctrl.next_move(&mut map, Some(Position::new(0, 0))).unwrap();

        map.set_obstacle(Position::new(0, 5)).unwrap();
        ctrl.next_move(&mut map, Some(Position::new(0, 1))).unwrap();
        assert_eq!(ctrl.replans(), 2);
        assert!(!ctrl.plan().contains(&Position::new(0, 5)));
    }

    #[test]
    fn test_zero_deadline_waits_without_moving() {
        let mut map = GridMap::new(4, 12);
        let config = ControllerConfig {
            deadline: Some(Duration::ZERO),
            dynamic_walls: None,
        };
        let mut ctrl = NavigationController::new(config, Position::new(3, 11));

        assert_eq!(ctrl.next_move(&mut map, Some(Position::new(0, 0))).unwrap(), None);
        assert_eq!(ctrl.state(), NavState::Planning);
        assert!(ctrl.last_search_exhausted());
        assert!(!ctrl.state().is_terminal());
    }

    #[test]
    fn test_dynamic_walls_never_strand_agent() {
        let mut map = GridMap::new(4, 12);
        let (start, goal) = (Position::new(0, 0), Position::new(3, 11));
        let config = ControllerConfig {
            deadline: None,
            dynamic_walls: Some(DynamicWallConfig {
                seed: Some(42),
                ..Default::default()
            }),
        };
        let mut ctrl = NavigationController::new(config, goal);

        drive(&mut ctrl, &mut map, start, 5000);
        assert_eq!(ctrl.state(), NavState::Arrived);
        assert!(!ctrl.placed_walls().is_empty());
        assert!(ctrl.replans() > 1);
        for &wall in ctrl.placed_walls() {
            assert!(!map.is_passable(wall).unwrap());
            assert_ne!(wall, goal);
        }
    }

    #[test]
    fn test_injection_attempt_budget() {
        let mut map = GridMap::new(4, 12);
        let config = ControllerConfig {
            deadline: None,
            dynamic_walls: Some(DynamicWallConfig {
                max_attempts: 2,
                seed: Some(3),
                ..Default::default()
            }),
        };
        let mut ctrl = NavigationController::new(config, Position::new(3, 11));

        drive(&mut ctrl, &mut map, Position::new(0, 0), 500);
        assert_eq!(ctrl.injection_attempts(), 2);
        assert!(ctrl.placed_walls().len() <= 2);
        assert_eq!(map.obstacle_count(), ctrl.placed_walls().len());
    }

    #[test]
    fn test_injection_period_defers_first_wall() {
        let mut map = GridMap::new(4, 12);
        let config = ControllerConfig {
            deadline: None,
            dynamic_walls: Some(DynamicWallConfig {
                period: Duration::from_secs(3600),
                seed: Some(3),
                ..Default::default()
            }),
        };
        let mut ctrl = NavigationController::new(config, Position::new(3, 11));

        drive(&mut ctrl, &mut map, Position::new(0, 0), 100);
        assert_eq!(ctrl.state(), NavState::Arrived);
        assert_eq!(ctrl.injection_attempts(), 0);
        assert_eq!(map.obstacle_count(), 0);
    }

    #[test]
    fn test_set_goal_restarts() {
        let mut map = GridMap::new(4, 4);
        let mut ctrl = NavigationController::new(ControllerConfig::default(), Position::new(0, 0));
        ctrl.next_move(&mut map, Some(Position::new(0, 0))).unwrap();
        assert_eq!(ctrl.state(), NavState::Arrived);

        ctrl.set_goal(Position::new(0, 2));
        assert_eq!(ctrl.state(), NavState::AwaitingPosition);
        assert_eq!(
            ctrl.next_move(&mut map, Some(Position::new(0, 0))).unwrap(),
            Some(Move::Down)
        );
    }

    #[test]
    fn test_custom_heuristic() {
        let mut map = GridMap::new(4, 12);
        let greedy = |p: Position, g: Position| 3.0 * p.manhattan_distance(&g) as f64;
        let mut ctrl = NavigationController::new(ControllerConfig::default(), Position::new(3, 11))
            .with_heuristic(Box::new(greedy));

        drive(&mut ctrl, &mut map, Position::new(0, 0), 100);
        assert_eq!(ctrl.state(), NavState::Arrived);
    }

    #[test]
    fn test_out_of_bounds_position() {
        let mut map = GridMap::new(4, 12);
        let mut ctrl = NavigationController::new(ControllerConfig::default(), Position::new(3, 11));
        assert!(ctrl.next_move(&mut map, Some(Position::new(4, 0))).is_err());
    }
}
