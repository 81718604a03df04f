//! Players and pieces.
//!
//! # Compact Encoding (3 bits)
//!
//! ```text
//! Bits 0-1: kind (0=none, 1=mover, 2=pusher, 3=anchored pusher)
//! Bit 2:    color (0=red, 1=blue)
//! ```
//!
//! The compact code only exists at serialization boundaries (the WASM
//! bindings); everything else works with [`Piece`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::FIELD_COUNT;

/// Player color. Red moves first.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Color {
    Red = 0,
    Blue = 1,
}

impl Color {
    /// Both colors, red first.
    pub const ALL: [Color; 2] = [Color::Red, Color::Blue];

    /// Get the opponent color.
    #[inline]
    pub const fn opponent(self) -> Color {
        match self {
            Color::Red => Color::Blue,
            Color::Blue => Color::Red,
        }
    }

    /// Convert from player number (0 or 1).
    #[inline]
    pub const fn from_index(index: u8) -> Option<Color> {
        match index {
            0 => Some(Color::Red),
            1 => Some(Color::Blue),
            _ => None,
        }
    }

    /// Player number (0 or 1).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Color::Red => "red",
            Color::Blue => "blue",
        })
    }
}

/// Piece kind, without color.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PieceKind {
    None = 0,
    /// Round piece: slides, cannot push.
    Mover = 1,
    /// Square piece: slides and pushes.
    Pusher = 2,
    /// Pusher that made the most recent push. Cannot move or be pushed.
    Anchor = 3,
}

/// Contents of a single field.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub enum Piece {
    #[default]
    Empty,
    Mover(Color),
    Pusher(Color),
    Anchor(Color),
}

/// One piece per field, indexed by [`crate::Field::index`].
pub type Pieces = [Piece; FIELD_COUNT];

impl Piece {
    /// Build a piece from color and kind.
    ///
    /// Panics on `PieceKind::None`: an empty field has no color.
    pub fn new(color: Color, kind: PieceKind) -> Piece {
        match kind {
            PieceKind::Mover => Piece::Mover(color),
            PieceKind::Pusher => Piece::Pusher(color),
            PieceKind::Anchor => Piece::Anchor(color),
            PieceKind::None => panic!("cannot build a {} piece without a kind", color),
        }
    }

    /// Split a piece into color and kind. None for an empty field.
    #[inline]
    pub const fn parts(self) -> Option<(Color, PieceKind)> {
        match self {
            Piece::Empty => None,
            Piece::Mover(c) => Some((c, PieceKind::Mover)),
            Piece::Pusher(c) => Some((c, PieceKind::Pusher)),
            Piece::Anchor(c) => Some((c, PieceKind::Anchor)),
        }
    }

    #[inline]
    pub const fn kind(self) -> PieceKind {
        match self {
            Piece::Empty => PieceKind::None,
            Piece::Mover(_) => PieceKind::Mover,
            Piece::Pusher(_) => PieceKind::Pusher,
            Piece::Anchor(_) => PieceKind::Anchor,
        }
    }

    #[inline]
    pub const fn color(self) -> Option<Color> {
        match self.parts() {
            Some((c, _)) => Some(c),
            None => None,
        }
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        matches!(self, Piece::Empty)
    }

    #[inline]
    pub const fn is_anchor(self) -> bool {
        matches!(self, Piece::Anchor(_))
    }

    /// Whether this piece belongs to `player` and may slide (not anchored).
    #[inline]
    pub fn is_mobile_of(self, player: Color) -> bool {
        matches!(self, Piece::Mover(c) | Piece::Pusher(c) if c == player)
    }

    /// The same piece with its anchor removed.
    #[inline]
    pub const fn demoted(self) -> Piece {
        match self {
            Piece::Anchor(c) => Piece::Pusher(c),
            other => other,
        }
    }

    /// The same piece with the other color.
    #[inline]
    pub const fn inverted(self) -> Piece {
        match self {
            Piece::Empty => Piece::Empty,
            Piece::Mover(c) => Piece::Mover(c.opponent()),
            Piece::Pusher(c) => Piece::Pusher(c.opponent()),
            Piece::Anchor(c) => Piece::Anchor(c.opponent()),
        }
    }

    /// Character used in position strings.
    pub const fn to_char(self) -> char {
        match self {
            Piece::Empty => '.',
            Piece::Mover(Color::Red) => 'o',
            Piece::Pusher(Color::Red) => 'O',
            Piece::Anchor(Color::Red) => 'P',
            Piece::Mover(Color::Blue) => 'x',
            Piece::Pusher(Color::Blue) => 'X',
            Piece::Anchor(Color::Blue) => 'Y',
        }
    }

    /// Parse a position string character.
    pub const fn from_char(ch: char) -> Option<Piece> {
        match ch {
            '.' => Some(Piece::Empty),
            'o' => Some(Piece::Mover(Color::Red)),
            'O' => Some(Piece::Pusher(Color::Red)),
            'P' => Some(Piece::Anchor(Color::Red)),
            'x' => Some(Piece::Mover(Color::Blue)),
            'X' => Some(Piece::Pusher(Color::Blue)),
            'Y' => Some(Piece::Anchor(Color::Blue)),
            _ => None,
        }
    }

    /// Compact 3-bit code (see module docs).
    #[inline]
    pub const fn to_code(self) -> u8 {
        match self.parts() {
            None => 0,
            Some((color, kind)) => kind as u8 | (color as u8) << 2,
        }
    }

    /// Decode a compact code. Zero is empty regardless of the color bit.
    pub const fn from_code(code: u8) -> Option<Piece> {
        if code > 7 {
            return None;
        }
        let color = if code & 4 == 0 { Color::Red } else { Color::Blue };
        match code & 3 {
            0 => Some(Piece::Empty),
            1 => Some(Piece::Mover(color)),
            2 => Some(Piece::Pusher(color)),
            _ => Some(Piece::Anchor(color)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PIECES: [Piece; 7] = [
        Piece::Empty,
        Piece::Mover(Color::Red),
        Piece::Pusher(Color::Red),
        Piece::Anchor(Color::Red),
        Piece::Mover(Color::Blue),
        Piece::Pusher(Color::Blue),
        Piece::Anchor(Color::Blue),
    ];

    #[test]
    fn test_color_opponent() {
        assert_eq!(Color::Red.opponent(), Color::Blue);
        assert_eq!(Color::Blue.opponent(), Color::Red);
        assert_eq!(Color::from_index(0), Some(Color::Red));
        assert_eq!(Color::from_index(2), None);
    }

    #[test]
    fn test_new_and_parts() {
        for color in Color::ALL {
            for kind in [PieceKind::Mover, PieceKind::Pusher, PieceKind::Anchor] {
                let piece = Piece::new(color, kind);
                assert_eq!(piece.parts(), Some((color, kind)));
                assert_eq!(piece.color(), Some(color));
                assert_eq!(piece.kind(), kind);
            }
        }
        assert_eq!(Piece::Empty.parts(), None);
        assert_eq!(Piece::Empty.kind(), PieceKind::None);
    }

    #[test]
    #[should_panic]
    fn test_new_without_kind_panics() {
        Piece::new(Color::Red, PieceKind::None);
    }

    #[test]
    fn test_char_roundtrip() {
        let chars: String = ALL_PIECES.iter().map(|p| p.to_char()).collect();
        assert_eq!(chars, ".oOPxXY");
        for piece in ALL_PIECES {
            assert_eq!(Piece::from_char(piece.to_char()), Some(piece));
        }
        assert_eq!(Piece::from_char('y'), None);
        assert_eq!(Piece::from_char(' '), None);
    }

    #[test]
    fn test_compact_codes() {
        assert_eq!(Piece::Empty.to_code(), 0);
        assert_eq!(Piece::Mover(Color::Red).to_code(), 1);
        assert_eq!(Piece::Pusher(Color::Red).to_code(), 2);
        assert_eq!(Piece::Anchor(Color::Red).to_code(), 3);
        assert_eq!(Piece::Mover(Color::Blue).to_code(), 5);
        assert_eq!(Piece::Pusher(Color::Blue).to_code(), 6);
        assert_eq!(Piece::Anchor(Color::Blue).to_code(), 7);
        for piece in ALL_PIECES {
            assert_eq!(Piece::from_code(piece.to_code()), Some(piece));
        }
        assert_eq!(Piece::from_code(4), Some(Piece::Empty));
        assert_eq!(Piece::from_code(8), None);
    }

    #[test]
    fn test_mobility() {
        assert!(Piece::Mover(Color::Red).is_mobile_of(Color::Red));
        assert!(Piece::Pusher(Color::Red).is_mobile_of(Color::Red));
        assert!(!Piece::Anchor(Color::Red).is_mobile_of(Color::Red));
        assert!(!Piece::Mover(Color::Blue).is_mobile_of(Color::Red));
        assert!(!Piece::Empty.is_mobile_of(Color::Red));
    }

    #[test]
    fn test_demote_and_invert() {
        assert_eq!(Piece::Anchor(Color::Blue).demoted(), Piece::Pusher(Color::Blue));
        assert_eq!(Piece::Mover(Color::Blue).demoted(), Piece::Mover(Color::Blue));
        for piece in ALL_PIECES {
            assert_eq!(piece.inverted().inverted(), piece);
            assert_eq!(piece.inverted().kind(), piece.kind());
        }
    }
}
