//! Board topology.
//!
//! The board is a 4×8 grid of which 26 fields are playable. The top and bottom
//! rows are shortened and bordered by rails; the short ends are open.
//!
//! ```text
//!        a   b   c   d   e   f   g   h
//!   4            0   1   2   3   4
//!   3    5   6   7   8   9  10  11  12
//!   2   13  14  15  16  17  18  19  20
//!   1       21  22  23  24  25
//! ```
//!
//! Row 0 is the top row (notation rank `4`), column 0 is file `a`.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Number of grid rows.
pub const H: i32 = 4;
/// Number of grid columns.
pub const W: i32 = 8;
/// Number of playable fields.
pub const FIELD_COUNT: usize = 26;

const FIELD_INDEX: [[i8; W as usize]; H as usize] = [
    [-1, -1, 0, 1, 2, 3, 4, -1],
    [5, 6, 7, 8, 9, 10, 11, 12],
    [13, 14, 15, 16, 17, 18, 19, 20],
    [-1, 21, 22, 23, 24, 25, -1, -1],
];

#[rustfmt::skip]
const FIELD_ROW: [u8; FIELD_COUNT] = [
          0, 0, 0, 0, 0,
    1, 1, 1, 1, 1, 1, 1, 1,
    2, 2, 2, 2, 2, 2, 2, 2,
       3, 3, 3, 3, 3,
];

#[rustfmt::skip]
const FIELD_COL: [u8; FIELD_COUNT] = [
          2, 3, 4, 5, 6,
    0, 1, 2, 3, 4, 5, 6, 7,
    0, 1, 2, 3, 4, 5, 6, 7,
       1, 2, 3, 4, 5,
];

/// One of the four orthogonal directions.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Left = 1,
    Right = 2,
    Down = 3,
}

impl Direction {
    /// All directions in generation order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Right,
        Direction::Down,
    ];

    /// Row and column delta of a single step.
    #[inline]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
        }
    }

    /// Get the opposite direction.
    #[inline]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
        }
    }

    /// The direction leading from `from` to the adjacent field `to`, if they
    /// are orthogonal neighbors.
    pub fn between(from: Field, to: Field) -> Option<Direction> {
        let dr = to.row() as i32 - from.row() as i32;
        let dc = to.col() as i32 - from.col() as i32;
        Direction::ALL.into_iter().find(|d| d.delta() == (dr, dc))
    }
}

/// A playable field (0-25).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct Field(u8);

impl Field {
    /// Create a field from its index, or None if out of range.
    #[inline]
    pub const fn new(index: usize) -> Option<Field> {
        if index < FIELD_COUNT {
            Some(Field(index as u8))
        } else {
            None
        }
    }

    /// Get the field index (0-25).
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the grid row (0-3).
    #[inline]
    pub const fn row(self) -> u8 {
        FIELD_ROW[self.0 as usize]
    }

    /// Get the grid column (0-7).
    #[inline]
    pub const fn col(self) -> u8 {
        FIELD_COL[self.0 as usize]
    }

    /// The adjacent field in the given direction, or None if off the board.
    #[inline]
    pub fn neighbor(self, dir: Direction) -> Option<Field> {
        let (dr, dc) = dir.delta();
        field_at(self.row() as i32 + dr, self.col() as i32 + dc)
    }

    /// The field this one lands on when the board is turned by 180 degrees.
    #[inline]
    pub const fn rotated(self) -> Field {
        Field(FIELD_COUNT as u8 - 1 - self.0)
    }

    /// Iterate over all 26 fields.
    pub fn all() -> impl Iterator<Item = Field> {
        (0..FIELD_COUNT as u8).map(Field)
    }
}

/// Map grid coordinates to a field. Coordinates outside the grid, and the
/// cut-off corners of the top and bottom rows, are off the board.
#[inline]
pub fn field_at(row: i32, col: i32) -> Option<Field> {
    if !(0..H).contains(&row) || !(0..W).contains(&col) {
        return None;
    }
    let index = FIELD_INDEX[row as usize][col as usize];
    if index < 0 {
        None
    } else {
        Some(Field(index as u8))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.col()) as char;
        let rank = (b'4' - self.row()) as char;
        write!(f, "{}{}", file, rank)
    }
}

impl FromStr for Field {
    type Err = ParseError;

    /// Parse field notation such as `c3`.
    fn from_str(s: &str) -> Result<Field, ParseError> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ParseError::Field(s.to_string()));
        }
        let col = bytes[0] as i32 - b'a' as i32;
        let row = b'4' as i32 - bytes[1] as i32;
        field_at(row, col).ok_or_else(|| ParseError::Field(s.to_string()))
    }
}
