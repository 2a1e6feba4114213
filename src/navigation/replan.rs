//! Decides when the current plan is stale.

use std::collections::VecDeque;

use crate::grid::{GridMap, Position};

/// Why a new search is needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplanReason {
    /// No plan with a next cell is held
    NoPlan,
    /// The map changed in a way that was signalled explicitly
    MapChanged,
    /// The agent is not where the plan expects it to be
    OffPlan,
    /// A remaining plan cell has become blocked
    PlanBlocked,
}

/// Pure replan decision.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReplanPolicy;

impl ReplanPolicy {
    /// Returns the reason to replan, or `None` to keep following `plan`.
    ///
    /// `plan` holds the remaining path with its head at the cell the agent
    /// should currently occupy. Callers handle arrival before asking, so a
    /// plan without a next cell always needs a new search.
    pub fn evaluate(
        &self,
        map: &GridMap,
        position: Position,
        plan: &VecDeque<Position>,
        replan_required: bool,
    ) -> Option<ReplanReason> {
        if plan.len() < 2 {
            return Some(ReplanReason::NoPlan);
        }
        if replan_required {
            return Some(ReplanReason::MapChanged);
        }
        if plan.front() != Some(&position) {
            return Some(ReplanReason::OffPlan);
        }
        if plan
            .iter()
            .skip(1)
            .any(|&p| !matches!(map.is_passable(p), Ok(true)))
        {
            return Some(ReplanReason::PlanBlocked);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> VecDeque<Position> {
        (0..4).map(|y| Position::new(0, y)).collect()
    }

    #[test]
    fn test_keep_valid_plan() {
        let map = GridMap::new(3, 4);
        let decision = ReplanPolicy.evaluate(&map, Position::new(0, 0), &plan(), false);
        assert_eq!(decision, None);
    }

    #[test]
    fn test_reasons() {
        let mut map = GridMap::new(3, 4);
        let policy = ReplanPolicy;
        let here = Position::new(0, 0);

        assert_eq!(
            policy.evaluate(&map, here, &VecDeque::new(), false),
            Some(ReplanReason::NoPlan)
        );
        assert_eq!(
            policy.evaluate(&map, here, &VecDeque::from([here]), false),
            Some(ReplanReason::NoPlan)
        );
        assert_eq!(
            policy.evaluate(&map, here, &plan(), true),
            Some(ReplanReason::MapChanged)
        );
        assert_eq!(
            policy.evaluate(&map, Position::new(1, 0), &plan(), false),
            Some(ReplanReason::OffPlan)
        );

        map.set_obstacle(Position::new(0, 2)).unwrap();
        assert_eq!(
            policy.evaluate(&map, here, &plan(), false),
            Some(ReplanReason::PlanBlocked)
        );
    }
}
