//! Push Fight rules and position indexing.
//!
//! # Board
//!
//! ```text
//!        a   b   c   d   e   f   g   h
//!   4            .   O   X   .   .
//!   3    .   .   .   o   x   X   .   .
//!   2    .   .   O   o   x   .   .   .
//!   1        .   .   O   X   .
//! ```
//!
//! Each side has two movers (`o`/`x`) and three pushers (`O`/`X`). A turn is
//! up to two slides followed by a mandatory push; the pusher then becomes the
//! anchor (`P`/`Y`) until the next push. A player loses when one of their
//! pieces is pushed off the board or when they cannot push.
//!
//! # Modules
//!
//! - [`board`]: field topology and notation
//! - [`piece`]: colors, piece kinds and their encodings
//! - [`moves`]: slide and push generation
//! - [`position`]: turn execution, validation and classification
//! - [`perms`]: dense and minimized indexing of in-progress positions
//! - [`notation`]: step and turn strings
//! - [`analysis`]: results of the external analysis service

pub mod analysis;
pub mod board;
pub mod error;
pub mod moves;
pub mod notation;
pub mod perms;
pub mod piece;
pub mod position;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use analysis::{Analysis, AnalysisError, Status, SuccessorGroup};
pub use board::{field_at, Direction, Field, FIELD_COUNT};
pub use error::{ParseError, PermError, TurnError};
pub use notation::{Step, Turn};
pub use perms::{Perm, FIRST_PERM, LAST_PERM, MIN_INDEX_SIZE, TOTAL_PERMS};
pub use piece::{Color, Piece, PieceKind, Pieces};
pub use position::{InvalidReason, Position, Successor, Validity, INITIAL_POSITION};
