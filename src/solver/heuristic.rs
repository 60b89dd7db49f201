use crate::data::Pos;
use crate::level::Level;
use crate::state::State;

// Term weights. Each term is truncated to an integer on its own before the
// sum - changing this to sum-then-truncate shifts tie-breaking in the
// ranking frontiers, so it stays as is.
const DISTANCE_FACTOR: f64 = 1.0;
const AGENT_FACTOR: f64 = 0.5;
const GOAL_FACTOR: f64 = 10.0;

/// Estimates how far a state is from the goal, lower is better.
///
/// Sums, over every box not sitting on a matching goal, the Manhattan
/// distance to the nearest free matching goal; adds half the agent's
/// distance to the nearest unplaced box and a flat penalty per unsatisfied
/// goal. Intentionally inadmissible - it ranks states, it doesn't bound
/// them.
pub fn score(state: &State, level: &Level) -> i32 {
    let mut goal_distance_sum = 0;
    let mut nearest_box_distance = 0;

    for r in 1..level.rows() - 1 {
        for c in 1..level.cols() - 1 {
            let pos = Pos { r, c };
            let label = match state.box_at(pos) {
                Some(label) => label.to_ascii_lowercase(),
                None => continue,
            };

            // a goal is free for this box unless a correctly matching box
            // already occupies it
            let mut in_goal = false;
            let mut nearest_free_goal = None;
            for &goal_pos in level.goals_with_label(label) {
                let free = match state.box_at(goal_pos) {
                    None => true,
                    Some(occupant) => {
                        if goal_pos == pos {
                            in_goal = true;
                        }
                        occupant.to_ascii_lowercase() != label
                    }
                };
                if free {
                    let dist = pos.dist(goal_pos);
                    if nearest_free_goal.map_or(true, |best| dist < best) {
                        nearest_free_goal = Some(dist);
                    }
                }
            }

            if !in_goal {
                goal_distance_sum += nearest_free_goal.unwrap_or(0);

                let agent_distance = pos.dist(state.agent);
                if nearest_box_distance == 0 || agent_distance < nearest_box_distance {
                    nearest_box_distance = agent_distance;
                }
            }
        }
    }

    let mut goal_score = level.goals().len() as i32;
    for goal in level.goals() {
        if let Some(occupant) = state.box_at(goal.pos) {
            if occupant.to_ascii_lowercase() == goal.label {
                goal_score -= 1;
            }
        }
    }

    (f64::from(goal_distance_sum) * DISTANCE_FACTOR) as i32
        + (f64::from(nearest_box_distance) * AGENT_FACTOR) as i32
        + (f64::from(goal_score) * GOAL_FACTOR) as i32
}

/// Ranking key for the best-first frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostFn {
    /// `h` alone.
    Greedy,
    /// `g + h`.
    AStar,
    /// `g + W * h`.
    WeightedAStar(i32),
}

impl CostFn {
    pub fn key(self, g: i32, h: i32) -> i32 {
        match self {
            CostFn::Greedy => h,
            CostFn::AStar => g + h,
            CostFn::WeightedAStar(weight) => g + weight * h,
        }
    }
}
