// Opt in to warnings about new 2018 idioms
#![warn(rust_2018_idioms)]
// Additional warnings that are allow by default (`rustc -W help`)
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unused)]

pub mod actions;
pub mod config;
pub mod data;
pub mod level;
pub mod parser;
pub mod protocol;
pub mod solver;
pub mod state;
pub mod vec2d;

mod fs;

use std::error::Error;

use crate::config::Method;
use crate::level::Puzzle;
use crate::solver::SolverOk;

pub trait LoadPuzzle {
    fn load_puzzle(&self) -> Result<Puzzle, Box<dyn Error>>;
}

pub trait Solve {
    fn solve(&self, method: Method, print_status: bool) -> SolverOk;
}
