use crate::actions::{Action, EVERY};
use crate::data::Pos;
use crate::level::Level;
use crate::vec2d::Vec2d;

/// A puzzle snapshot: agent position plus the dense box grid.
///
/// This is pure puzzle-state identity. Search bookkeeping (parent link,
/// producing action, path cost, heuristic) lives on the arena node so that
/// equality and hashing stay cell-wise over the fields below and nothing
/// else.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State {
    pub agent: Pos,
    pub boxes: Vec2d<Option<char>>,
}

impl State {
    pub fn new(agent: Pos, boxes: Vec2d<Option<char>>) -> State {
        State { agent, boxes }
    }

    pub fn box_at(&self, pos: Pos) -> Option<char> {
        self.boxes.get(pos).copied().flatten()
    }

    fn cell_is_free(&self, level: &Level, pos: Pos) -> bool {
        !level.is_wall(pos) && self.box_at(pos).is_none()
    }

    /// Applies one action if it is applicable, producing a fresh state.
    ///
    /// The box grid is deep-copied; an existing state is never mutated.
    pub fn apply(&self, level: &Level, action: Action) -> Option<State> {
        match action {
            Action::Move(dir) => {
                let new_agent = self.agent + dir;
                if !self.cell_is_free(level, new_agent) {
                    return None;
                }
                Some(State::new(new_agent, self.boxes.clone()))
            }
            Action::Push(dir1, dir2) => {
                let box_pos = self.agent + dir1;
                let label = self.box_at(box_pos)?;
                let new_box_pos = box_pos + dir2;
                if !self.cell_is_free(level, new_box_pos) {
                    return None;
                }
                let mut boxes = self.boxes.clone();
                boxes[box_pos] = None;
                boxes[new_box_pos] = Some(label);
                Some(State::new(box_pos, boxes))
            }
            Action::Pull(dir1, dir2) => {
                let new_agent = self.agent + dir1;
                if !self.cell_is_free(level, new_agent) {
                    return None;
                }
                let box_pos = self.agent + dir2;
                let label = self.box_at(box_pos)?;
                let mut boxes = self.boxes.clone();
                boxes[box_pos] = None;
                boxes[self.agent] = Some(label);
                Some(State::new(new_agent, boxes))
            }
        }
    }

    /// All states reachable by one action, in fixed table order.
    ///
    /// The search shuffles the returned sequence before use; see
    /// [`Arena::expand`](crate::solver::arena::Arena::expand).
    pub fn successors(&self, level: &Level) -> Vec<(Action, State)> {
        EVERY
            .iter()
            .filter_map(|&action| self.apply(level, action).map(|state| (action, state)))
            .collect()
    }

    /// True when every interior goal cell holds a box of the matching label.
    ///
    /// The outer border is wall in the supported level format, so it can
    /// never hold a goal worth checking.
    pub fn is_goal(&self, level: &Level) -> bool {
        for r in 1..level.rows() - 1 {
            for c in 1..level.cols() - 1 {
                let pos = Pos { r, c };
                if let Some(goal) = level.goal_at(pos) {
                    match self.box_at(pos) {
                        Some(label) if label.to_ascii_lowercase() == goal => {}
                        _ => return false,
                    }
                }
            }
        }
        true
    }
}
