use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io::{self, BufRead, Write};

use log::debug;

use crate::actions::{Action, Plan};
use crate::level::{Level, Puzzle};
use crate::parser;

/// Failures on the judge connection.
#[derive(Debug)]
pub enum ProtocolErr {
    Io(io::Error),
    /// The judge rejected an action the search considered applicable.
    /// Carries the rendered state the action was attempted from.
    Rejected {
        action: Action,
        response: String,
        state: String,
    },
}

impl Display for ProtocolErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolErr::Io(err) => write!(f, "Judge connection failed: {}", err),
            ProtocolErr::Rejected {
                action,
                response,
                state,
            } => {
                writeln!(
                    f,
                    "Judge responded with {:?} to the inapplicable action {}",
                    response, action
                )?;
                write!(f, "{} was attempted in\n{}", action, state)
            }
        }
    }
}

impl Error for ProtocolErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ProtocolErr::Io(err) => Some(err),
            ProtocolErr::Rejected { .. } => None,
        }
    }
}

impl From<io::Error> for ProtocolErr {
    fn from(err: io::Error) -> Self {
        ProtocolErr::Io(err)
    }
}

/// Reads the level block the judge sends first: one line per row,
/// terminated by a blank line.
pub fn read_level<R: BufRead>(reader: &mut R) -> Result<Puzzle, Box<dyn Error>> {
    let mut text = String::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        if line.trim_end_matches(['\r', '\n'].as_ref()).is_empty() {
            break;
        }
        text.push_str(&line);
    }
    let puzzle = parser::parse(&text)?;
    debug!(
        "Received a {}x{} level with {} goals",
        puzzle.level.rows(),
        puzzle.level.cols(),
        puzzle.level.goals().len()
    );
    Ok(puzzle)
}

/// Sends the plan one action per line, waiting for the judge's verdict on
/// each before sending the next. A response containing `false` means the
/// judge disagreed about applicability; remaining steps are abandoned.
pub fn execute_plan<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    level: &Level,
    plan: &Plan,
) -> Result<(), ProtocolErr> {
    for step in plan {
        writeln!(writer, "{}", step.action)?;
        writer.flush()?;

        let mut response = String::new();
        reader.read_line(&mut response)?;
        if response.contains("false") {
            return Err(ProtocolErr::Rejected {
                action: step.action,
                response: response.trim_end().to_string(),
                state: level.render(&step.state).to_string(),
            });
        }
    }
    Ok(())
}
