use std::fmt::{self, Display, Formatter};

/// Weight used by Weighted A* unless overridden on the command line.
pub const DEFAULT_WEIGHT: i32 = 5;

/// Which search strategy drives the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Bfs,
    Dfs,
    AStar,
    WeightedAStar(i32),
    Greedy,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Method::Bfs => write!(f, "bfs"),
            Method::Dfs => write!(f, "dfs"),
            Method::AStar => write!(f, "astar"),
            Method::WeightedAStar(weight) => write!(f, "wastar({})", weight),
            Method::Greedy => write!(f, "greedy"),
        }
    }
}
