//! Positions, turn execution and classification.
//!
//! # Position String
//!
//! ```text
//! .OX.....oxX....Oox.....OX.
//! ```
//!
//! 26 characters, one per field in row-major order (see [`crate::board`]):
//! `.` empty, `o`/`O`/`P` red mover/pusher/anchor, `x`/`X`/`Y` the same for
//! blue.

use std::collections::HashSet;
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use thiserror::Error;

use crate::board::{field_at, Direction, Field, FIELD_COUNT, H, W};
use crate::error::{ParseError, PermError, TurnError};
use crate::moves;
use crate::notation::{Step, Turn};
use crate::perms::{
    Perm, EMPTY, OPPONENT_ANCHOR, OPPONENT_MOVER, OPPONENT_PUSHER, OWN_MOVER, OWN_PUSHER,
};
use crate::piece::{Color, Piece, PieceKind, Pieces};

/// Standard starting layout.
pub const INITIAL_POSITION: &str = ".OX.....oxX....Oox.....OX.";

/// [`INITIAL_POSITION`] as pieces.
#[rustfmt::skip]
const INITIAL_PIECES: Pieces = {
    use Color::{Blue, Red};
    use Piece::{Empty as E, Mover as M, Pusher as P};
    [
                    E,      P(Red), P(Blue), E,       E,
        E, E,       E,      M(Red), M(Blue), P(Blue), E, E,
        E, E,       P(Red), M(Red), M(Blue), E,       E, E,
           E,       E,      P(Red), P(Blue), E,
    ]
};

/// Movers per color.
pub const MOVERS: usize = 2;
/// Pushers (anchored or not) per color.
pub const PUSHERS: usize = 3;

/// Why a layout cannot occur in a game.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    #[error("too many {0} movers")]
    TooManyMovers(Color),
    #[error("too many {0} pushers")]
    TooManyPushers(Color),
    #[error("too many anchors")]
    TooManyAnchors,
    #[error("missing anchored piece")]
    MissingAnchor,
    #[error("too few pieces")]
    TooFewPieces,
}

/// Classification of an arbitrary layout.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Validity {
    /// All pieces on the board, nobody has pushed yet.
    Started { next_player: Color },
    /// All pieces on the board and one anchor.
    InProgress { next_player: Color, index: u64 },
    /// One piece was pushed off.
    Finished { winner: Color },
    Invalid(InvalidReason),
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validity::Started { next_player } => write!(f, "started, {} to move", next_player),
            Validity::InProgress { next_player, index } => {
                write!(f, "in progress, {} to move (index {})", next_player, index)
            }
            Validity::Finished { winner } => write!(f, "finished, {} won", winner),
            Validity::Invalid(reason) => write!(f, "invalid: {}", reason),
        }
    }
}

/// A position reachable in one turn, see [`Position::successors`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Successor {
    pub turn: Turn,
    pub position: Position,
    /// Color of the piece pushed off the board, if any.
    pub eliminated: Option<Color>,
}

/// The contents of all 26 fields.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Position {
    pieces: Pieces,
}

impl Position {
    /// Board without any pieces.
    pub const fn empty() -> Position {
        Position {
            pieces: [Piece::Empty; FIELD_COUNT],
        }
    }

    /// The standard starting layout. Red moves first.
    pub const fn initial() -> Position {
        Position {
            pieces: INITIAL_PIECES,
        }
    }

    #[inline]
    pub const fn from_pieces(pieces: Pieces) -> Position {
        Position { pieces }
    }

    #[inline]
    pub fn pieces(&self) -> &Pieces {
        &self.pieces
    }

    #[inline]
    pub fn set(&mut self, field: Field, piece: Piece) {
        self.pieces[field.index()] = piece;
    }

    /// Field of the anchored pusher, if there is one.
    pub fn anchor(&self) -> Option<Field> {
        Field::all().find(|&f| self[f].is_anchor())
    }

    /// Number of pieces of the given color and kind on the board.
    pub fn count(&self, color: Color, kind: PieceKind) -> usize {
        self.pieces
            .iter()
            .filter(|p| p.parts() == Some((color, kind)))
            .count()
    }

    /// Number of pieces of the given color on the board.
    pub fn pieces_of(&self, color: Color) -> usize {
        self.pieces.iter().filter(|p| p.color() == Some(color)).count()
    }

    // ========== Turn Execution ==========

    /// Execute a single slide or push without checking legality.
    ///
    /// An empty destination means a slide. Otherwise the source pushes: every
    /// anchor is lifted, the pusher becomes the new anchor, and the chain in
    /// front of it shifts by one field. Returns the color of the piece pushed
    /// off the board, if any; the other color has won.
    pub fn execute(&mut self, step: Step) -> Option<Color> {
        if step.is_noop() {
            return None;
        }
        let (src, dst) = (step.from.index(), step.to.index());

        if self.pieces[dst].is_empty() {
            self.pieces[dst] = self.pieces[src];
            self.pieces[src] = Piece::Empty;
            return None;
        }

        for piece in self.pieces.iter_mut() {
            *piece = piece.demoted();
        }

        let dr = step.to.row() as i32 - step.from.row() as i32;
        let dc = step.to.col() as i32 - step.from.col() as i32;
        let (mut row, mut col) = (step.to.row() as i32, step.to.col() as i32);

        let mut carried = match self.pieces[src].color() {
            Some(color) => Piece::Anchor(color),
            None => Piece::Empty,
        };
        self.pieces[src] = Piece::Empty;

        let mut next = Some(step.to);
        while let Some(field) = next {
            carried = std::mem::replace(&mut self.pieces[field.index()], carried);
            if carried.is_empty() {
                return None;
            }
            row += dr;
            col += dc;
            next = field_at(row, col);
        }
        carried.color()
    }

    /// Execute every step of a turn without checking legality.
    pub fn apply(&mut self, turn: &Turn) -> Option<Color> {
        let mut eliminated = None;
        for &step in turn.steps() {
            eliminated = self.execute(step).or(eliminated);
        }
        eliminated
    }

    /// Check that `player` may play `turn` here and return the result.
    ///
    /// Each slide must move a mobile piece of `player` through empty fields
    /// (a slide onto its own field is a no-op), and the final step must be a
    /// legal push by one of their unanchored pushers.
    pub fn validate_turn(&self, player: Color, turn: &Turn) -> Result<Position, TurnError> {
        let mut next = *self;
        for (index, &step) in turn.slides().iter().enumerate() {
            if step.is_noop() && next[step.from].is_mobile_of(player) {
                continue;
            }
            if !moves::is_valid_slide(&next.pieces, player, step) {
                return Err(TurnError::IllegalSlide { index, step });
            }
            next.execute(step);
        }
        let push = turn.push();
        if !moves::is_legal_push(&next.pieces, player, push) {
            return Err(TurnError::IllegalPush(push));
        }
        next.execute(push);
        Ok(next)
    }

    // ========== Classification ==========

    /// Classify the layout.
    pub fn validate(&self) -> Validity {
        let mut movers = [0usize; 2];
        let mut pushers = [0usize; 2];
        let mut anchors = [0usize; 2];
        for piece in &self.pieces {
            match piece.parts() {
                Some((c, PieceKind::Mover)) => movers[c.index()] += 1,
                Some((c, PieceKind::Pusher)) => pushers[c.index()] += 1,
                Some((c, PieceKind::Anchor)) => anchors[c.index()] += 1,
                _ => {}
            }
        }

        for color in Color::ALL {
            let i = color.index();
            if movers[i] > MOVERS {
                return Validity::Invalid(InvalidReason::TooManyMovers(color));
            }
            if pushers[i] + anchors[i] > PUSHERS {
                return Validity::Invalid(InvalidReason::TooManyPushers(color));
            }
        }
        let total_anchors = anchors[0] + anchors[1];
        if total_anchors > 1 {
            return Validity::Invalid(InvalidReason::TooManyAnchors);
        }

        let per_color = |i: usize| movers[i] + pushers[i] + anchors[i];
        let (red, blue) = (per_color(0), per_color(1));
        match (red + blue, total_anchors) {
            (10, 0) => Validity::Started {
                next_player: Color::Red,
            },
            (10, _) => {
                let next_player = if anchors[Color::Red.index()] > 0 {
                    Color::Blue
                } else {
                    Color::Red
                };
                match self.to_perm(next_player) {
                    Ok(perm) => Validity::InProgress {
                        next_player,
                        index: perm.index(),
                    },
                    Err(_) => unreachable!("complete position with one anchor is a permutation"),
                }
            }
            (9, 0) => Validity::Invalid(InvalidReason::MissingAnchor),
            (9, _) => Validity::Finished {
                winner: if red > blue { Color::Red } else { Color::Blue },
            },
            _ => Validity::Invalid(InvalidReason::TooFewPieces),
        }
    }

    // ========== Permutations ==========

    /// Relabel the position relative to `next_player`.
    ///
    /// Fails unless every piece is on the board and the only anchor belongs
    /// to the opponent of `next_player`.
    pub fn to_perm(&self, next_player: Color) -> Result<Perm, PermError> {
        let mut symbols = [EMPTY; FIELD_COUNT];
        for (symbol, piece) in symbols.iter_mut().zip(self.pieces.iter()) {
            *symbol = match piece.parts() {
                None => EMPTY,
                Some((c, PieceKind::Mover)) if c == next_player => OWN_MOVER,
                Some((c, PieceKind::Pusher)) if c == next_player => OWN_PUSHER,
                Some((_, PieceKind::Mover)) => OPPONENT_MOVER,
                Some((_, PieceKind::Pusher)) => OPPONENT_PUSHER,
                Some((c, _)) if c != next_player => OPPONENT_ANCHOR,
                Some(_) => return Err(PermError::WrongMultiplicities),
            };
        }
        Perm::new(symbols)
    }

    /// The position `perm` describes with `next_player` to move.
    pub fn from_perm(perm: &Perm, next_player: Color) -> Position {
        let opponent = next_player.opponent();
        let mut pieces = [Piece::Empty; FIELD_COUNT];
        for (piece, &symbol) in pieces.iter_mut().zip(perm.symbols()) {
            *piece = match symbol {
                OWN_MOVER => Piece::Mover(next_player),
                OWN_PUSHER => Piece::Pusher(next_player),
                OPPONENT_MOVER => Piece::Mover(opponent),
                OPPONENT_PUSHER => Piece::Pusher(opponent),
                OPPONENT_ANCHOR => Piece::Anchor(opponent),
                _ => Piece::Empty,
            };
        }
        Position { pieces }
    }

    // ========== Symmetry ==========

    /// Swap the colors of all pieces.
    pub fn inverted(&self) -> Position {
        Position {
            pieces: self.pieces.map(Piece::inverted),
        }
    }

    /// Turn the board by 180 degrees.
    pub fn rotated(&self) -> Position {
        let mut pieces = self.pieces;
        pieces.reverse();
        Position { pieces }
    }

    /// Position string with colors swapped if needed so that the anchor, if
    /// any, is blue. Player identity is lost.
    pub fn to_normalized_string(&self) -> String {
        let red_anchor = self.pieces.contains(&Piece::Anchor(Color::Red));
        let blue_anchor = self.pieces.contains(&Piece::Anchor(Color::Blue));
        if red_anchor && !blue_anchor {
            self.inverted().to_string()
        } else {
            self.to_string()
        }
    }

    /// Multi-line board drawing. Off-board fields are blank; with `coords`
    /// the ranks are appended to each row and the files listed underneath.
    pub fn pretty(&self, coords: bool) -> String {
        let mut out = String::with_capacity(64);
        for row in 0..H {
            for col in 0..W {
                out.push(match field_at(row, col) {
                    Some(field) => self[field].to_char(),
                    None => ' ',
                });
            }
            if coords {
                out.push((b'4' - row as u8) as char);
            }
            out.push('\n');
        }
        if coords {
            out.extend((0..W as u8).map(|c| (b'a' + c) as char));
            out.push('\n');
        }
        out
    }

    // ========== Successors and Predecessors ==========

    /// Every distinct position `player` can reach in one turn.
    ///
    /// Turns are generated with zero, then one, then two slides before the
    /// push; a piece never slides twice in a row. When several turns lead to
    /// the same position only the first one generated is kept.
    pub fn successors(&self, player: Color) -> Vec<Successor> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for slides in 0..=crate::notation::MAX_SLIDES {
            let mut prefix = Vec::with_capacity(slides + 1);
            self.successors_with(player, slides, &mut prefix, &mut seen, &mut out);
        }
        out
    }

    fn successors_with(
        &self,
        player: Color,
        slides_left: usize,
        prefix: &mut Vec<Step>,
        seen: &mut HashSet<Position>,
        out: &mut Vec<Successor>,
    ) {
        if slides_left == 0 {
            for push in moves::pushes(&self.pieces, player) {
                let mut position = *self;
                let eliminated = position.execute(push);
                if !seen.insert(position) {
                    continue;
                }
                prefix.push(push);
                out.push(Successor {
                    turn: Turn {
                        steps: prefix.clone(),
                    },
                    position,
                    eliminated,
                });
                prefix.pop();
            }
            return;
        }

        let last_moved = prefix.last().map(|s| s.to);
        for from in Field::all() {
            if !self[from].is_mobile_of(player) || Some(from) == last_moved {
                continue;
            }
            for to in moves::move_destinations(&self.pieces, from) {
                let step = Step::new(from, to);
                let mut next = *self;
                next.execute(step);
                prefix.push(step);
                next.successors_with(player, slides_left - 1, prefix, seen, out);
                prefix.pop();
            }
        }
    }

    /// Positions from which the player who pushed last could have reached
    /// this one in a single turn, with that player to move.
    ///
    /// Undoes the push that placed the anchor, for every length the pushed
    /// chain could have had and every opposing pusher that could have been
    /// anchored before, then undoes up to two slides. Some results cannot
    /// occur in play themselves. Duplicates are dropped, the first kept.
    /// Empty unless the position has an anchor.
    pub fn predecessors(&self) -> Vec<Position> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let Some(anchor) = self.anchor() else {
            return out;
        };
        let Some(player) = self[anchor].color() else {
            return out;
        };
        let opponent = player.opponent();

        for dir in Direction::ALL {
            // The pusher came from `origin` and pushed toward `dir.opposite()`.
            let (Some(origin), Some(first)) =
                (anchor.neighbor(dir), anchor.neighbor(dir.opposite()))
            else {
                continue;
            };
            if !self[origin].is_empty() || self[first].is_empty() {
                continue;
            }

            let mut before = *self;
            before.set(origin, Piece::Pusher(player));
            let mut pushed = 0u32;
            let mut to = anchor;
            let mut from = Some(first);
            // Pull the chain back one piece at a time; each length is a push
            // that ended on the field just vacated.
            while let Some(field) = from.filter(|&f| !before[f].is_empty()) {
                pushed |= 1 << to.index();
                before.set(to, before[field]);
                before.set(field, Piece::Empty);
                to = field;
                from = field.neighbor(dir.opposite());

                for previous in Field::all() {
                    let pushed_now = pushed & (1 << previous.index()) != 0;
                    if before[previous] != Piece::Pusher(opponent) || pushed_now {
                        continue;
                    }
                    let mut anchored = before;
                    anchored.set(previous, Piece::Anchor(opponent));
                    for slides in 0..=crate::notation::MAX_SLIDES {
                        anchored.unslide(player, slides, None, &mut seen, &mut out);
                    }
                }
            }
        }
        out
    }

    fn unslide(
        &self,
        player: Color,
        slides_left: usize,
        last_moved: Option<Field>,
        seen: &mut HashSet<Position>,
        out: &mut Vec<Position>,
    ) {
        if slides_left == 0 {
            if seen.insert(*self) {
                out.push(*self);
            }
            return;
        }
        for from in Field::all() {
            if !self[from].is_mobile_of(player) || Some(from) == last_moved {
                continue;
            }
            for to in moves::move_destinations(&self.pieces, from) {
                let mut previous = *self;
                previous.execute(Step::new(from, to));
                previous.unslide(player, slides_left - 1, Some(to), seen, out);
            }
        }
    }
}

impl Default for Position {
    fn default() -> Position {
        Position::initial()
    }
}

impl Index<Field> for Position {
    type Output = Piece;

    #[inline]
    fn index(&self, field: Field) -> &Piece {
        &self.pieces[field.index()]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.pieces
            .iter()
            .try_for_each(|p| write!(f, "{}", p.to_char()))
    }
}

impl FromStr for Position {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Position, ParseError> {
        if s.chars().count() != FIELD_COUNT {
            return Err(ParseError::Position(s.to_string()));
        }
        let mut pieces = [Piece::Empty; FIELD_COUNT];
        for (piece, ch) in pieces.iter_mut().zip(s.chars()) {
            *piece = Piece::from_char(ch).ok_or_else(|| ParseError::Position(s.to_string()))?;
        }
        Ok(Position { pieces })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    fn field(s: &str) -> Field {
        s.parse().unwrap()
    }

    fn pos(s: &str) -> Position {
        s.parse().unwrap()
    }

    fn turn(s: &str) -> Turn {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_format() {
        let p = Position::initial();
        assert_eq!(p.to_string(), INITIAL_POSITION);
        assert_eq!(pos(INITIAL_POSITION), p);
        assert_eq!(p[field("d4")], Piece::Pusher(Color::Red));
        assert_eq!(p[field("e4")], Piece::Pusher(Color::Blue));
        assert!(".OX.....oxX....Oox.....OX".parse::<Position>().is_err());
        assert!(".OX.....oxX....Oox.....OXX.".parse::<Position>().is_err());
        assert!(".OX.....oxX....Oox.....OZ.".parse::<Position>().is_err());
    }

    #[test]
    fn test_initial_is_started() {
        let p = Position::initial();
        assert_eq!(p.validate(), Validity::Started { next_player: Color::Red });
        for color in Color::ALL {
            assert_eq!(p.count(color, PieceKind::Mover), MOVERS);
            assert_eq!(p.count(color, PieceKind::Pusher), PUSHERS);
            assert_eq!(p.pieces_of(color), 5);
        }
        assert_eq!(p.anchor(), None);
    }

    #[test]
    fn test_in_progress() {
        let p = pos(".OX.....oxX.....Oox...OY..");
        assert_eq!(
            p.validate(),
            Validity::InProgress {
                next_player: Color::Red,
                index: 194_131_625_612
            }
        );
        assert_eq!(p.anchor(), Some(field("d1")));

        let perm = p.to_perm(Color::Red).unwrap();
        assert_eq!(Position::from_perm(&perm, Color::Red), p);
        assert_eq!(perm.to_position(), p);
        // Red does not own the anchor, so cannot be the opponent here.
        assert!(p.to_perm(Color::Blue).is_err());
    }

    #[test]
    fn test_finished() {
        let p = pos(".OY.....o.X....Oox.....OX.");
        assert_eq!(p.validate(), Validity::Finished { winner: Color::Red });
        assert_eq!(p.inverted().validate(), Validity::Finished { winner: Color::Blue });
        assert_eq!(p.validate().to_string(), "finished, red won");
    }

    #[test]
    fn test_invalid() {
        let cases = [
            ("ooo.....oxX....Oox.....OX.", InvalidReason::TooManyMovers(Color::Red)),
            (".OX.....OxX....Oox.....OX.", InvalidReason::TooManyPushers(Color::Red)),
            (".OX.....oxx....Oox.....OX.", InvalidReason::TooManyMovers(Color::Blue)),
            (".OX.....oXX....Oox.....OX.", InvalidReason::TooManyPushers(Color::Blue)),
            (".PY.....oxX....Oox.....O..", InvalidReason::TooManyAnchors),
            (".O......oxX....Oox.....OX.", InvalidReason::MissingAnchor),
            ("..........................", InvalidReason::TooFewPieces),
            (".O......oxX....Oox.....O..", InvalidReason::TooFewPieces),
        ];
        for (s, reason) in cases {
            assert_eq!(pos(s).validate(), Validity::Invalid(reason), "{}", s);
        }
    }

    #[test]
    fn test_red_anchor_means_blue_to_move() {
        let p = pos(".PX.....oxX....Oox.....OX.");
        assert_eq!(
            p.validate(),
            Validity::InProgress {
                next_player: Color::Blue,
                index: 244_329_200_603
            }
        );
        assert_eq!(p.to_normalized_string(), ".YO.....xoO....Xxo.....XO.");
        // Already normalized.
        let q = pos(".OX.....oxX.....Oox...OY..");
        assert_eq!(q.to_normalized_string(), q.to_string());
        assert_eq!(Position::initial().to_normalized_string(), INITIAL_POSITION);
    }

    #[test]
    fn test_validate_turn_from_initial() {
        let start = Position::initial();
        let next = start
            .validate_turn(Color::Red, &turn("d4-c4,c2-d2"))
            .unwrap();
        assert_eq!(next.to_string(), "O.X.....oxX.....Pox....OX.");
        assert_eq!(next[field("c2")], Piece::Empty);
        assert_eq!(next[field("d2")], Piece::Anchor(Color::Red));
        assert_eq!(next[field("e2")], Piece::Mover(Color::Red));
        assert_eq!(next[field("f2")], Piece::Mover(Color::Blue));
        assert_eq!(
            next.validate(),
            Validity::InProgress {
                next_player: Color::Blue,
                index: 369_423_818_363
            }
        );
        assert_eq!(next.to_normalized_string(), "X.O.....xoO.....Yxo....XO.");

        // Blue may not play red's turn.
        assert!(start.validate_turn(Color::Blue, &turn("d4-c4,c2-d2")).is_err());
    }

    #[test]
    fn test_validate_turn_errors() {
        let start = Position::initial();
        // The mover slides fine, but a mover cannot push.
        assert_eq!(
            start.validate_turn(Color::Red, &turn("d3-c3,c3-b3")),
            Err(TurnError::IllegalPush("c3-b3".parse().unwrap()))
        );
        // Blue's piece.
        assert_eq!(
            start.validate_turn(Color::Red, &turn("e3-e4,d4-e4")),
            Err(TurnError::IllegalSlide {
                index: 0,
                step: "e3-e4".parse().unwrap()
            })
        );
        // Second slide onto an occupied field.
        assert_eq!(
            start.validate_turn(Color::Red, &turn("d4-c4,d3-e3,c2-d2")),
            Err(TurnError::IllegalSlide {
                index: 1,
                step: "d3-e3".parse().unwrap()
            })
        );
    }

    #[test]
    fn test_noop_slide() {
        let start = Position::initial();
        let plain = start.validate_turn(Color::Red, &turn("c2-d2")).unwrap();
        let with_noop = start.validate_turn(Color::Red, &turn("d3-d3,c2-d2")).unwrap();
        assert_eq!(plain, with_noop);
        // The no-op must still be on an own piece.
        assert!(start.validate_turn(Color::Red, &turn("e3-e3,c2-d2")).is_err());
        assert!(start.validate_turn(Color::Red, &turn("a3-a3,c2-d2")).is_err());
    }

    #[test]
    fn test_push_demotes_previous_anchor() {
        let mut p = pos(".OX.....oxX.....Oox...OY..");
        assert_eq!(p.anchor(), Some(field("d1")));
        // d2 pushes the chain e2, f2 one field right.
        assert_eq!(p.execute("d2-e2".parse().unwrap()), None);
        assert_eq!(p.anchor(), Some(field("e2")));
        assert_eq!(p[field("d1")], Piece::Pusher(Color::Blue));
        assert_eq!(p[field("d2")], Piece::Empty);
        assert_eq!(p[field("e2")], Piece::Anchor(Color::Red));
        assert_eq!(p[field("f2")], Piece::Mover(Color::Red));
        assert_eq!(p[field("g2")], Piece::Mover(Color::Blue));
    }

    #[test]
    fn test_push_eliminates() {
        let mut p = Position::empty();
        p.set(field("f3"), Piece::Pusher(Color::Red));
        p.set(field("g3"), Piece::Mover(Color::Red));
        p.set(field("h3"), Piece::Pusher(Color::Blue));
        assert_eq!(p.execute("f3-g3".parse().unwrap()), Some(Color::Blue));
        assert_eq!(p[field("f3")], Piece::Empty);
        assert_eq!(p[field("g3")], Piece::Anchor(Color::Red));
        assert_eq!(p[field("h3")], Piece::Mover(Color::Red));
        assert_eq!(p.pieces_of(Color::Blue), 0);

        // Pushed off through the cut-off corner below a3.
        let mut p = Position::empty();
        p.set(field("a3"), Piece::Pusher(Color::Blue));
        p.set(field("a2"), Piece::Mover(Color::Blue));
        assert_eq!(p.execute("a3-a2".parse().unwrap()), Some(Color::Blue));
        assert_eq!(p[field("a2")], Piece::Anchor(Color::Blue));
    }

    #[test]
    fn test_apply_reports_elimination() {
        let mut p = Position::empty();
        p.set(field("b3"), Piece::Pusher(Color::Red));
        p.set(field("d3"), Piece::Pusher(Color::Red));
        p.set(field("e3"), Piece::Mover(Color::Blue));
        p.set(field("f3"), Piece::Mover(Color::Blue));
        p.set(field("g3"), Piece::Mover(Color::Red));
        p.set(field("h3"), Piece::Mover(Color::Red));
        let mut q = p;
        assert_eq!(q.apply(&turn("b3-c3,d3-e3")), Some(Color::Red));
        assert_eq!(p.validate_turn(Color::Red, &turn("b3-c3,d3-e3")), Ok(q));
    }

    #[test]
    fn test_symmetry() {
        let p = pos(".OX.....oxX.....Oox...OY..");
        assert_eq!(p.rotated().rotated(), p);
        assert_eq!(p.inverted().inverted(), p);
        assert_eq!(p.rotated().to_perm(Color::Red).unwrap(), p.to_perm(Color::Red).unwrap().rotated());
        for f in Field::all() {
            assert_eq!(p.rotated()[f.rotated()], p[f]);
        }
    }

    #[test]
    fn test_pretty() {
        let p = Position::initial();
        let expected = ["  .OX.. ", "...oxX..", "..Oox...", " ..OX.  "];
        assert_eq!(p.pretty(false), expected.map(|row| format!("{}\n", row)).concat());
        let with_coords = p.pretty(true);
        assert!(with_coords.ends_with("abcdefgh\n"));
        assert_eq!(with_coords.lines().count(), 5);
        assert!(with_coords.lines().next().unwrap().ends_with('4'));
    }

    #[test]
    fn test_successors_are_legal_and_distinct() {
        let start = Position::initial();
        let successors = start.successors(Color::Red);
        assert!(!successors.is_empty());
        let distinct: HashSet<Position> = successors.iter().map(|s| s.position).collect();
        assert_eq!(distinct.len(), successors.len());
        for s in &successors {
            assert_eq!(start.validate_turn(Color::Red, &s.turn), Ok(s.position));
            match s.eliminated {
                None => assert!(matches!(
                    s.position.validate(),
                    Validity::InProgress { next_player: Color::Blue, .. }
                )),
                Some(color) => assert_eq!(
                    s.position.validate(),
                    Validity::Finished { winner: color.opponent() }
                ),
            }
        }
        // Red can already push its own mover off through a cut-off corner.
        let suicide = successors
            .iter()
            .find(|s| s.turn == turn("d3-c4,d4-c4"))
            .unwrap();
        assert_eq!(suicide.eliminated, Some(Color::Red));
        assert_eq!(suicide.position, pos("P.X......xX....Oox.....OX."));
        // Zero-slide turns come first.
        assert!(successors[0].turn.slides().is_empty());
        // No piece slides twice in a row.
        for s in &successors {
            if let [a, b] = s.turn.slides() {
                assert_ne!(a.to, b.from);
            }
        }
    }

    #[test]
    fn test_initial_layout() {
        assert_eq!(Position::initial().to_string(), INITIAL_POSITION);
        assert_eq!(Position::initial(), pos(INITIAL_POSITION));
        assert_eq!(Position::default(), Position::initial());
        for color in Color::ALL {
            assert_eq!(Position::initial().count(color, PieceKind::Mover), MOVERS);
            assert_eq!(Position::initial().count(color, PieceKind::Pusher), PUSHERS);
        }
    }

    #[test]
    fn test_predecessors_of_known_push() {
        let before = pos(".OX.....oxY....Oox.....OX.");
        let after = before.validate_turn(Color::Red, &turn("c2-d2")).unwrap();
        assert_eq!(after, pos(".OX.....oxX.....Pox....OX."));

        let predecessors = after.predecessors();
        assert!(predecessors.contains(&before));
        // The push may have moved only the first piece of the chain.
        assert!(predecessors.contains(&pos(".OX.....oxY....Oo.x....OX.")));
        // Any other blue pusher may have been the anchor.
        assert!(predecessors.contains(&pos(".OY.....oxX....Oox.....OX.")));

        let distinct: HashSet<Position> = predecessors.iter().copied().collect();
        assert_eq!(distinct.len(), predecessors.len());
        for p in &predecessors {
            assert!(matches!(
                p.validate(),
                Validity::InProgress { next_player: Color::Red, .. }
            ));
            // Blue holds the only anchor.
            assert_eq!(p.count(Color::Blue, PieceKind::Anchor), 1);
        }
        assert!(Position::initial().predecessors().is_empty());
    }

    #[test]
    fn test_predecessors_undo_turns() {
        let mut rng = rand::rng();
        for _ in 0..4 {
            let mut position = Position::initial();
            let mut player = Color::Red;
            for ply in 0..12 {
                let successors = position.successors(player);
                let Some(next) = successors.choose(&mut rng) else {
                    break;
                };
                if next.eliminated.is_some() {
                    break;
                }
                // The first turn starts without an anchor and cannot be undone.
                if ply > 0 {
                    let predecessors = next.position.predecessors();
                    assert!(
                        predecessors.contains(&position),
                        "{} from {} not undone",
                        next.turn,
                        position
                    );
                    for before in predecessors.iter().take(5) {
                        assert!(before
                            .successors(player)
                            .iter()
                            .any(|s| s.position == next.position));
                    }
                }
                position = next.position;
                player = player.opponent();
            }
        }
    }

    #[test]
    fn test_random_games_keep_one_anchor() {
        let mut rng = rand::rng();
        for _ in 0..8 {
            let mut position = Position::initial();
            let mut player = Color::Red;
            for _ in 0..30 {
                let successors = position.successors(player);
                let Some(next) = successors.choose(&mut rng) else {
                    break;
                };
                let anchors = next.position.pieces().iter().filter(|p| p.is_anchor()).count();
                assert_eq!(anchors, 1);
                assert_eq!(next.position[next.turn.push().to], Piece::Anchor(player));
                position = next.position;
                match position.validate() {
                    Validity::InProgress { next_player, index } => {
                        assert_eq!(next_player, player.opponent());
                        assert_eq!(Perm::at_index(index).unwrap().index(), index);
                        assert!(next.eliminated.is_none());
                    }
                    Validity::Finished { winner } => {
                        assert_eq!(Some(winner.opponent()), next.eliminated);
                        break;
                    }
                    other => panic!("unexpected {:?} after {}", other, next.turn),
                }
                player = player.opponent();
            }
        }
    }
}
