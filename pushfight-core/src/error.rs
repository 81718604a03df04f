//! Error types shared across the crate.
//!
//! Malformed positions are not errors: [`crate::Position::validate`] reports
//! them as [`crate::Validity::Invalid`]. Everything here is recoverable user
//! input or caller error.

use thiserror::Error;

use crate::notation::Step;

/// Failure to parse a field, move, turn, position or index string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid field: {0:?}")]
    Field(String),
    #[error("invalid move: {0:?}")]
    Step(String),
    #[error("invalid turn: {0:?}")]
    Turn(String),
    #[error("invalid position string (expected 26 of \".oOPxXY\"): {0:?}")]
    Position(String),
    #[error("invalid permutation index: {0:?}")]
    Index(String),
    #[error("invalid status: {0:?}")]
    Status(String),
    #[error("position is not in progress: {0}")]
    NotInProgress(String),
    #[error(transparent)]
    Perm(#[from] PermError),
}

/// Failure to build a permutation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PermError {
    #[error("no such permutation: index {0} is out of range")]
    IndexOutOfRange(u64),
    #[error("invalid permutation symbol {0}")]
    InvalidSymbol(u8),
    #[error("permutation does not have 16 empty fields, 2+3 own and 2+2+1 opponent pieces")]
    WrongMultiplicities,
    #[error("permutation fails the reachability check and has no minimized index")]
    Unreachable,
}

/// A turn that cannot be played from the given position.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TurnError {
    #[error("move {index} ({step}) is not a legal slide")]
    IllegalSlide { index: usize, step: Step },
    #[error("{0} is not a legal push")]
    IllegalPush(Step),
}
