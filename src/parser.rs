use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::data::{Pos, MAX_SIZE};
use crate::level::{Goal, Level, Puzzle};
use crate::state::State;
use crate::vec2d::Vec2d;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserErr {
    /// A color specification line preceding the grid - colored levels need
    /// multiple agents and are not supported.
    ColorsNotSupported,
    MultipleAgents,
    NoAgent,
    InvalidCharacter(char, usize, usize),
    TooLarge,
}

impl Display for ParserErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            ParserErr::ColorsNotSupported => write!(f, "Colored levels are not supported"),
            ParserErr::MultipleAgents => write!(f, "Not a single agent level"),
            ParserErr::NoAgent => write!(f, "No agent"),
            ParserErr::InvalidCharacter(chr, r, c) => {
                write!(f, "Invalid level character {:?} at [{}, {}]", chr, r, c)
            }
            ParserErr::TooLarge => write!(f, "Level larger than {} rows/columns", MAX_SIZE),
        }
    }
}

impl Error for ParserErr {}

impl FromStr for Puzzle {
    type Err = ParserErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parses a level block: one line per row, terminated by a blank line or the
/// end of input. `+` wall, `0`-`9` the agent, `A`-`Z` a box, `a`-`z` a goal,
/// space free.
pub fn parse(text: &str) -> Result<Puzzle, ParserErr> {
    // trim so levels are easy to specify with raw strings
    let text = text.trim_matches('\n');

    if text.lines().next().map_or(false, is_color_spec) {
        return Err(ParserErr::ColorsNotSupported);
    }

    let mut walls = Vec::new();
    let mut goal_grid = Vec::new();
    let mut boxes = Vec::new();
    let mut goal_list = Vec::new();
    let mut agent = None;

    for (r, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            break;
        }
        if r >= MAX_SIZE {
            return Err(ParserErr::TooLarge);
        }

        let mut wall_row = Vec::new();
        let mut goal_row = Vec::new();
        let mut box_row = Vec::new();
        for (c, chr) in line.chars().enumerate() {
            if c >= MAX_SIZE {
                return Err(ParserErr::TooLarge);
            }
            let pos = Pos::new(r, c);

            let mut wall = false;
            let mut goal = None;
            let mut box_label = None;
            match chr {
                '+' => wall = true,
                '0'..='9' => {
                    if agent.is_some() {
                        return Err(ParserErr::MultipleAgents);
                    }
                    agent = Some(pos);
                }
                'A'..='Z' => box_label = Some(chr),
                'a'..='z' => {
                    goal = Some(chr);
                    goal_list.push(Goal { label: chr, pos });
                }
                ' ' => {}
                _ => return Err(ParserErr::InvalidCharacter(chr, r, c)),
            }
            wall_row.push(wall);
            goal_row.push(goal);
            box_row.push(box_label);
        }
        walls.push(wall_row);
        goal_grid.push(goal_row);
        boxes.push(box_row);
    }

    let agent = agent.ok_or(ParserErr::NoAgent)?;

    let level = Level::new(
        Vec2d::new(&walls, false),
        Vec2d::new(&goal_grid, None),
        goal_list,
    );
    let state = State::new(agent, Vec2d::new(&boxes, None));
    Ok(Puzzle::new(level, state))
}

/// Matches a color specification line such as `blue: 0, A` - lowercase color
/// name, a colon, then comma-separated single agent/box identifiers.
fn is_color_spec(line: &str) -> bool {
    let name_len = line.chars().take_while(char::is_ascii_lowercase).count();
    if name_len == 0 {
        return false;
    }
    let rest = match line[name_len..].strip_prefix(':') {
        Some(rest) => rest,
        None => return false,
    };
    rest.split(',').all(|part| {
        let part = part.trim();
        let mut chars = part.chars();
        match (chars.next(), chars.next()) {
            (Some(chr), None) => chr.is_ascii_digit() || chr.is_ascii_uppercase(),
            _ => false,
        }
    })
}
