//! Move and turn notation.
//!
//! ```text
//! field: c3          (file a-h, rank 4-1)
//! step:  c3-d3       (source, destination)
//! turn:  b2-b1,c3-d3 (up to two slides, then the push)
//! ```
//!
//! A push is written with the field of the first pushed piece as its
//! destination.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::Field;
use crate::error::ParseError;

/// Maximum number of slides before the push.
pub const MAX_SLIDES: usize = 2;

/// A single slide or push.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Step {
    pub from: Field,
    pub to: Field,
}

impl Step {
    #[inline]
    pub const fn new(from: Field, to: Field) -> Step {
        Step { from, to }
    }

    /// Whether this step leaves the board unchanged.
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

impl FromStr for Step {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Step, ParseError> {
        let (from, to) = s.split_once('-').ok_or_else(|| ParseError::Step(s.to_string()))?;
        let invalid = |_| ParseError::Step(s.to_string());
        Ok(Step {
            from: from.parse().map_err(invalid)?,
            to: to.parse().map_err(invalid)?,
        })
    }
}

/// A complete turn: 0-2 slides followed by exactly one push.
///
/// Only the shape is checked here; whether the steps are legal depends on the
/// position, see [`crate::Position::validate_turn`].
#[derive(Clone, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Turn {
    pub(crate) steps: Vec<Step>,
}

impl Turn {
    /// Build a turn from 1-3 steps, the last being the push.
    pub fn new(steps: Vec<Step>) -> Option<Turn> {
        if steps.is_empty() || steps.len() > MAX_SLIDES + 1 {
            return None;
        }
        Some(Turn { steps })
    }

    #[inline]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The slides before the push (possibly none).
    #[inline]
    pub fn slides(&self) -> &[Step] {
        &self.steps[..self.steps.len() - 1]
    }

    /// The final push.
    #[inline]
    pub fn push(&self) -> Step {
        self.steps[self.steps.len() - 1]
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

impl FromStr for Turn {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Turn, ParseError> {
        if s.is_empty() {
            return Err(ParseError::Turn(s.to_string()));
        }
        let steps = s
            .split(',')
            .map(str::parse)
            .collect::<Result<Vec<Step>, _>>()
            .map_err(|_| ParseError::Turn(s.to_string()))?;
        Turn::new(steps).ok_or_else(|| ParseError::Turn(s.to_string()))
    }
}

impl From<Turn> for String {
    fn from(turn: Turn) -> String {
        turn.to_string()
    }
}

impl TryFrom<String> for Turn {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Turn, ParseError> {
        s.parse()
    }
}
