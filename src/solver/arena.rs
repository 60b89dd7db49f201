use std::collections::TryReserveError;
use std::fmt::{self, Debug, Formatter};
use std::mem;
use std::ops::Index;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::actions::{Action, Plan, PlanStep};
use crate::level::Level;
use crate::state::State;

/// Seed for the successor shuffle unless one is injected.
pub const DEFAULT_SEED: u64 = 1;

/// Index of a search node in its [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(u32);

/// One retained search node: the state plus the bookkeeping that must not
/// take part in state identity.
#[derive(Debug)]
pub struct Node {
    pub state: State,
    pub parent: Option<StateId>,
    pub action: Option<Action>,
    g: i32,
    h: Option<i32>,
}

impl Node {
    /// Number of actions from the initial state.
    pub fn g(&self) -> i32 {
        self.g
    }

    /// Heuristic estimate, unset until the node is first considered for a
    /// ranking frontier.
    pub fn h(&self) -> Option<i32> {
        self.h
    }

    pub fn is_initial(&self) -> bool {
        self.parent.is_none()
    }
}

/// Owns every state created during a search.
///
/// Nodes refer to their parent by index, so plan extraction works from any
/// node and the retained memory is a single growable allocation plus the
/// per-node box grids.
pub struct Arena {
    nodes: Vec<Node>,
    rng: SmallRng,
    node_bytes: usize,
}

impl Arena {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Arena {
            nodes: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
            node_bytes: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Approximate retained memory, used to keep the search inside its
    /// budget. Counts the nodes and their box grids, not the frontier and
    /// explored-set bookkeeping built on top.
    pub fn approx_bytes(&self) -> usize {
        self.nodes.len() * self.node_bytes
    }

    pub fn insert_initial(&mut self, state: State) -> Result<StateId, TryReserveError> {
        self.insert_node(Node {
            state,
            parent: None,
            action: None,
            g: 0,
            h: None,
        })
    }

    pub fn insert(
        &mut self,
        parent: StateId,
        action: Action,
        state: State,
    ) -> Result<StateId, TryReserveError> {
        let g = self[parent].g + 1;
        self.insert_node(Node {
            state,
            parent: Some(parent),
            action: Some(action),
            g,
            h: None,
        })
    }

    fn insert_node(&mut self, node: Node) -> Result<StateId, TryReserveError> {
        if self.node_bytes == 0 {
            let grid_cells = node.state.boxes.rows() * node.state.boxes.cols();
            self.node_bytes =
                mem::size_of::<Node>() + grid_cells as usize * mem::size_of::<Option<char>>();
        }
        self.nodes.try_reserve(1)?;
        self.nodes.push(node);
        Ok(StateId(self.nodes.len() as u32 - 1))
    }

    /// Scores a node. Each node is scored at most once.
    pub fn set_h(&mut self, id: StateId, h: i32) {
        debug_assert!(self.nodes[id.0 as usize].h.is_none());
        self.nodes[id.0 as usize].h = Some(h);
    }

    /// All successors of a node, shuffled with the run-local RNG so that no
    /// direction is systematically preferred when the frontier breaks ties.
    pub fn expand(&mut self, id: StateId, level: &Level) -> Vec<(Action, State)> {
        let mut successors = self[id].state.successors(level);
        successors.shuffle(&mut self.rng);
        successors
    }

    /// The action sequence leading to `id`, by walking parent links back to
    /// the initial node. Empty when called on the initial node itself.
    pub fn extract_plan(&self, id: StateId) -> Plan {
        let mut steps = Vec::new();
        let mut node = &self[id];
        while let Some(parent) = node.parent {
            let action = node
                .action
                .expect("non-initial nodes record the action that produced them");
            steps.push(PlanStep {
                action,
                state: node.state.clone(),
            });
            node = &self[parent];
        }
        steps.reverse();
        Plan::new(steps)
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<StateId> for Arena {
    type Output = Node;

    fn index(&self, id: StateId) -> &Node {
        &self.nodes[id.0 as usize]
    }
}

impl Debug for Arena {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Arena of {} nodes", self.nodes.len())
    }
}
