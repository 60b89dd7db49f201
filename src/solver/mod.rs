pub mod arena;
pub mod heuristic;
pub mod strategy;

use std::fmt::{self, Debug, Display, Formatter};

use log::{debug, warn};
use separator::Separatable;

use crate::actions::Plan;
use crate::config::Method;
use crate::level::{Level, Puzzle};
use crate::state::State;
use crate::Solve;

pub use self::arena::{Arena, StateId, DEFAULT_SEED};
pub use self::heuristic::CostFn;
pub use self::strategy::Strategy;

/// How many expansions pass between status snapshots and memory checks.
const STATUS_INTERVAL: u64 = 1000;

/// Retained-state budget. Exceeding it ends the search with
/// [`Outcome::OutOfMemory`] instead of letting the allocator abort us.
const DEFAULT_MEMORY_LIMIT: usize = 2 * 1024 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A goal state was reached and a plan extracted.
    Succeeded,
    /// The frontier emptied without reaching a goal - a valid terminal
    /// result, not an error.
    Exhausted,
    /// The memory budget ran out mid-search; reported like Exhausted but
    /// with a distinct diagnostic.
    OutOfMemory,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stats {
    created: u64,
    expanded: u64,
    duplicates: u64,
}

impl Stats {
    fn add_created(&mut self) {
        self.created += 1;
    }

    fn add_expanded(&mut self) {
        self.expanded += 1;
    }

    fn add_duplicate(&mut self) {
        self.duplicates += 1;
    }

    pub fn total_created(&self) -> u64 {
        self.created
    }

    pub fn total_expanded(&self) -> u64 {
        self.expanded
    }

    pub fn total_duplicates(&self) -> u64 {
        self.duplicates
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "States created total: {}", self.created.separated_string())?;
        writeln!(
            f,
            "Unique states expanded total: {}",
            self.expanded.separated_string()
        )?;
        writeln!(
            f,
            "Duplicates skipped total: {}",
            self.duplicates.separated_string()
        )
    }
}

pub struct SolverOk {
    pub plan: Option<Plan>,
    pub stats: Stats,
    pub outcome: Outcome,
    pub(crate) method: Method,
}

impl Debug for SolverOk {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.plan {
            None => writeln!(f, "No solution")?,
            Some(ref plan) => writeln!(f, "{}: {}", self.method, plan.len())?,
        }
        write!(f, "{}", self.stats)
    }
}

impl Solve for Puzzle {
    fn solve(&self, method: Method, print_status: bool) -> SolverOk {
        solve(self, method, print_status)
    }
}

pub fn solve(puzzle: &Puzzle, method: Method, print_status: bool) -> SolverOk {
    solve_seeded(puzzle, method, DEFAULT_SEED, print_status)
}

pub fn solve_seeded(puzzle: &Puzzle, method: Method, seed: u64, print_status: bool) -> SolverOk {
    debug!("Search starting with strategy {}", method);
    let mut searcher = Searcher::new(&puzzle.level, Strategy::from_method(method)).with_seed(seed);
    let (outcome, plan) = searcher.search(puzzle.state.clone(), print_status);
    SolverOk {
        plan,
        stats: searcher.stats().clone(),
        outcome,
        method,
    }
}

/// The graph-search driver: repeatedly expands the strategy's next state,
/// filters seen successors, scores the survivors and queues them.
#[derive(Debug)]
pub struct Searcher<'a> {
    level: &'a Level,
    arena: Arena,
    strategy: Strategy,
    stats: Stats,
    memory_limit: usize,
}

impl<'a> Searcher<'a> {
    pub fn new(level: &'a Level, strategy: Strategy) -> Self {
        Searcher {
            level,
            arena: Arena::new(),
            strategy,
            stats: Stats::default(),
            memory_limit: DEFAULT_MEMORY_LIMIT,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.arena = Arena::with_seed(seed);
        self
    }

    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit = bytes;
        self
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn search(&mut self, initial: State, print_status: bool) -> (Outcome, Option<Plan>) {
        let initial_id = match self.arena.insert_initial(initial) {
            Ok(id) => id,
            Err(_) => return self.out_of_memory(),
        };
        self.stats.add_created();
        self.score_if_needed(initial_id);
        self.strategy.add_to_frontier(initial_id, &self.arena[initial_id]);

        let mut iterations = 0;
        loop {
            if iterations == STATUS_INTERVAL {
                iterations = 0;
                let report = self.strategy.status_report(&self.arena);
                debug!("{}", report);
                if print_status {
                    println!("{}", report);
                }
            }
            if self.arena.approx_bytes() > self.memory_limit {
                return self.out_of_memory();
            }

            let id = match self.strategy.pop_next(&self.arena) {
                Some(id) => id,
                None => {
                    debug!("Frontier exhausted without reaching a goal");
                    return (Outcome::Exhausted, None);
                }
            };

            if self.arena[id].state.is_goal(self.level) {
                debug!("Goal reached, extracting plan");
                return (Outcome::Succeeded, Some(self.arena.extract_plan(id)));
            }

            self.strategy.mark_explored(&self.arena[id].state);
            self.stats.add_expanded();

            for (action, successor) in self.arena.expand(id, self.level) {
                if self.strategy.is_explored(&successor) || self.strategy.is_in_frontier(&successor)
                {
                    self.stats.add_duplicate();
                    continue;
                }
                let child = match self.arena.insert(id, action, successor) {
                    Ok(child) => child,
                    Err(_) => return self.out_of_memory(),
                };
                self.stats.add_created();
                self.score_if_needed(child);
                self.strategy.add_to_frontier(child, &self.arena[child]);
            }
            iterations += 1;
        }
    }

    /// Heuristic values are computed exactly once, right before a state
    /// first enters a ranking frontier. BFS and DFS never score.
    fn score_if_needed(&mut self, id: StateId) {
        if self.strategy.needs_ranking() {
            let h = heuristic::score(&self.arena[id].state, self.level);
            self.arena.set_h(id, h);
        }
    }

    fn out_of_memory(&self) -> (Outcome, Option<Plan>) {
        warn!(
            "Memory budget exceeded after {} created states, giving up",
            self.arena.len().separated_string()
        );
        (Outcome::OutOfMemory, None)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashSet, VecDeque};

    use crate::actions::Action;
    use crate::data::Pos;

    use super::*;

    fn parse(text: &str) -> Puzzle {
        text.parse().unwrap()
    }

    /// Shortest solution length by plain breadth-first enumeration,
    /// independent of the solver's frontier bookkeeping.
    fn brute_force_shortest(puzzle: &Puzzle) -> Option<usize> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(puzzle.state.clone());
        queue.push_back((puzzle.state.clone(), 0));
        while let Some((state, depth)) = queue.pop_front() {
            if state.is_goal(&puzzle.level) {
                return Some(depth);
            }
            for (_, successor) in state.successors(&puzzle.level) {
                if seen.insert(successor.clone()) {
                    queue.push_back((successor, depth + 1));
                }
            }
        }
        None
    }

    #[test]
    fn move_then_push() {
        // 3x3 interior: the agent has to step next to the box first, then
        // push it one cell east onto the goal
        let puzzle = parse(
            "\
+++++
+0  +
+ Aa+
+   +
+++++",
        );
        let solution = solve(&puzzle, Method::Bfs, false);
        assert_eq!(solution.outcome, Outcome::Succeeded);

        let plan = solution.plan.unwrap();
        assert_eq!(plan.len(), 2);
        // the shuffle picks between equivalent shortest plans, but the
        // shape is always a repositioning move followed by the push
        let actions: Vec<_> = plan.iter().map(|step| step.action).collect();
        assert!(matches!(actions[0], Action::Move(_)));
        assert!(matches!(actions[1], Action::Push(..)));

        let final_state = &plan.iter().last().unwrap().state;
        assert_eq!(final_state.box_at(Pos::new(2, 3)), Some('A'));
        assert!(final_state.is_goal(&puzzle.level));
    }

    #[test]
    fn bfs_is_move_optimal() {
        let puzzle = parse(
            "\
++++++
+  0 +
+A  a+
++++++",
        );
        let expected = brute_force_shortest(&puzzle).unwrap();
        let solution = solve(&puzzle, Method::Bfs, false);
        assert_eq!(solution.plan.unwrap().len(), expected);
    }

    #[test]
    fn already_solved_level_yields_empty_plan() {
        let puzzle = parse(
            "\
+++++
+0 a+
+++++",
        );
        let mut boxes = puzzle.state.boxes.clone();
        boxes[Pos::new(1, 3)] = Some('A');
        let solved = State::new(puzzle.state.agent, boxes);

        let mut searcher = Searcher::new(&puzzle.level, Strategy::bfs());
        let (outcome, plan) = searcher.search(solved, false);
        assert_eq!(outcome, Outcome::Succeeded);
        assert!(plan.unwrap().is_empty());
    }

    #[test]
    fn unsolvable_level_exhausts() {
        // the only box has the wrong label for the only goal, so the whole
        // (finite) state space gets enumerated
        let puzzle = parse(
            "\
++++++
+0B a+
++++++",
        );
        let solution = solve(&puzzle, Method::Bfs, false);
        assert_eq!(solution.outcome, Outcome::Exhausted);
        assert!(solution.plan.is_none());
        assert!(solution.stats.total_expanded() > 0);
    }

    #[test]
    fn memory_budget_ends_the_search_cleanly() {
        let puzzle = parse(
            "\
++++++
+0   +
+  A +
+   a+
++++++",
        );
        let mut searcher =
            Searcher::new(&puzzle.level, Strategy::bfs()).with_memory_limit(1);
        let (outcome, plan) = searcher.search(puzzle.state.clone(), false);
        assert_eq!(outcome, Outcome::OutOfMemory);
        assert!(plan.is_none());
    }

    #[test]
    fn all_methods_solve_the_corridor() {
        let puzzle = parse(
            "\
++++++++
+0 A  a+
++++++++",
        );
        let methods = [
            Method::Bfs,
            Method::Dfs,
            Method::AStar,
            Method::WeightedAStar(5),
            Method::Greedy,
        ];
        for &method in &methods {
            let solution = solve(&puzzle, method, false);
            assert_eq!(solution.outcome, Outcome::Succeeded, "{}", method);
            let plan = solution.plan.unwrap();
            assert!(!plan.is_empty(), "{}", method);
            // replay the plan to check it really reaches the goal
            let mut state = puzzle.state.clone();
            for step in &plan {
                state = state.apply(&puzzle.level, step.action).unwrap();
                assert_eq!(state, step.state);
            }
            assert!(state.is_goal(&puzzle.level), "{}", method);
        }
    }

    #[test]
    fn duplicate_states_are_counted_not_requeued() {
        let puzzle = parse(
            "\
+++++
+0 a+
+A  +
+++++",
        );
        let solution = solve(&puzzle, Method::Bfs, false);
        assert!(solution.stats.total_duplicates() > 0);
        // every expanded state was created exactly once
        assert!(solution.stats.total_created() >= solution.stats.total_expanded());
    }
}
