use std::error::Error;
use std::fs;
use std::path::Path;

use crate::level::Puzzle;
use crate::LoadPuzzle;

impl<T: AsRef<Path>> LoadPuzzle for T {
    fn load_puzzle(&self) -> Result<Puzzle, Box<dyn Error>> {
        let text = fs::read_to_string(self)?;
        let puzzle = text.parse()?;
        Ok(puzzle)
    }
}
