//! Results of the external position analysis service.
//!
//! The service is queried with a normalized position string (see
//! [`crate::Position::to_normalized_string`]) and answers with JSON:
//!
//! ```text
//! {
//!   "status": "W1",
//!   "successors": [
//!     { "status": "W1", "moves": ["d4-c4,c2-d2", "c2-d2"] },
//!     { "status": "T",  "moves": ["d3-c3,d4-d3"] }
//!   ]
//! }
//! ```
//!
//! Successors are grouped by status, best first. A position without any
//! successors is `L0`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{ParseError, TurnError};
use crate::notation::Turn;
use crate::piece::Color;
use crate::position::Position;

/// Game-theoretic value for the player to move.
///
/// Ordered best first: quicker wins, slower wins, a tie, slower losses,
/// quicker losses.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Status {
    /// Win in the given number of turns.
    Win(u32),
    Tie,
    /// Loss in the given number of turns.
    Loss(u32),
}

impl Status {
    /// +1 for a win, 0 for a tie, -1 for a loss.
    pub fn sign(self) -> i32 {
        match self {
            Status::Win(_) => 1,
            Status::Tie => 0,
            Status::Loss(_) => -1,
        }
    }

    /// Number of turns until the game ends (0 for a tie).
    pub fn magnitude(self) -> u32 {
        match self {
            Status::Win(n) | Status::Loss(n) => n,
            Status::Tie => 0,
        }
    }

    fn sort_key(self) -> (u8, i64) {
        match self {
            Status::Win(n) => (0, n as i64),
            Status::Tie => (1, 0),
            Status::Loss(n) => (2, -(n as i64)),
        }
    }
}

impl Ord for Status {
    fn cmp(&self, other: &Status) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Status {
    fn partial_cmp(&self, other: &Status) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Win(n) => write!(f, "W{}", n),
            Status::Tie => f.write_str("T"),
            Status::Loss(n) => write!(f, "L{}", n),
        }
    }
}

impl FromStr for Status {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Status, ParseError> {
        let invalid = || ParseError::Status(s.to_string());
        if s == "T" {
            return Ok(Status::Tie);
        }
        let (kind, digits) = s.split_at_checked(1).ok_or_else(invalid)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let n: u32 = digits.parse().map_err(|_| invalid())?;
        match kind {
            "W" => Ok(Status::Win(n)),
            "L" => Ok(Status::Loss(n)),
            _ => Err(invalid()),
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> String {
        status.to_string()
    }
}

impl TryFrom<String> for Status {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Status, ParseError> {
        s.parse()
    }
}

/// Successor turns sharing one status.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SuccessorGroup {
    pub status: Status,
    pub moves: Vec<Turn>,
}

/// Analysis of a single position.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Analysis {
    pub status: Status,
    pub successors: Vec<SuccessorGroup>,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("malformed analysis: {0}")]
    Json(#[from] serde_json::Error),
    #[error("successor groups are not ordered best first: {0} before {1}")]
    Unordered(Status, Status),
    #[error("listed turn {turn} is not legal: {source}")]
    IllegalTurn {
        turn: Turn,
        #[source]
        source: TurnError,
    },
}

impl Analysis {
    /// Parse a service response. Every turn string must be well-formed and
    /// the groups must be ordered best first.
    pub fn from_json(json: &str) -> Result<Analysis, AnalysisError> {
        let analysis: Analysis = serde_json::from_str(json)?;
        for pair in analysis.successors.windows(2) {
            if pair[0].status >= pair[1].status {
                return Err(AnalysisError::Unordered(pair[0].status, pair[1].status));
            }
        }
        Ok(analysis)
    }

    /// Number of listed successor turns.
    pub fn turn_count(&self) -> usize {
        self.successors.iter().map(|g| g.moves.len()).sum()
    }

    /// Turns leading to the best outcome.
    pub fn best_turns(&self) -> &[Turn] {
        self.successors
            .first()
            .map(|g| g.moves.as_slice())
            .unwrap_or_default()
    }

    /// Check that every listed turn is legal for `player` in `position`.
    pub fn check_against(&self, position: &Position, player: Color) -> Result<(), AnalysisError> {
        for turn in self.successors.iter().flat_map(|g| g.moves.iter()) {
            position
                .validate_turn(player, turn)
                .map_err(|source| AnalysisError::IllegalTurn {
                    turn: turn.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}
