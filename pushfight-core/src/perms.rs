//! Conversion between in-progress positions and dense integer indices.
//!
//! An in-progress position is written relative to the player to move as a
//! string of 26 symbols:
//!
//! ```text
//! 0: empty field         (16)
//! 1: own mover           (2)
//! 2: own pusher          (3)
//! 3: opponent mover      (2)
//! 4: opponent pusher     (2)
//! 5: opponent anchor     (1)
//! ```
//!
//! Every such string is a permutation of the same multiset, so there are
//! 26! / (16! 2! 3! 2! 2! 1!) = 401,567,166,000 of them. [`Perm::index`] ranks a
//! permutation in lexicographic order and [`Perm::at_index`] inverts it.
//!
//! # Tables
//!
//! Both directions only look up two precomputed tables, indexed by the
//! remaining symbol counts `(a, b, c, d, e, f)` packed as a mixed-radix offset
//! with radices `(17, 3, 4, 3, 3, 2)`:
//!
//! ```text
//! num_perms[f]        = number of distinct orderings of the multiset f
//! count_smaller[x][f] = number of those orderings starting with a symbol < x
//! ```
//!
//! The tables are built on first use and shared read-only for the rest of the
//! process.
//!
//! # Minimized Index
//!
//! Most permutations cannot occur in play and half of the rest are rotations
//! of the other half. [`Perm::min_index`] numbers only the permutations that
//! pass [`Perm::is_reachable`] with the anchor in fields 0-12, which leaves
//! 86,208,131,520 indices. The anchor field and the neighbors that show the
//! direction of the last push are fixed by offset tables; the other 21 or 23
//! fields are ranked as above.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::board::{field_at, Direction, Field, FIELD_COUNT};
use crate::error::{ParseError, PermError};
use crate::piece::Color;
use crate::position::{Position, Validity};

/// Permutation length.
pub const L: usize = FIELD_COUNT;

/// Number of distinct symbols.
pub const SYMBOLS: usize = 6;

/// Total number of permutations.
pub const TOTAL_PERMS: u64 = 401_567_166_000;

/// Symbol counts of every permutation.
pub const ALL_FREQ: [u8; SYMBOLS] = [16, 2, 3, 2, 2, 1];

pub const EMPTY: u8 = 0;
pub const OWN_MOVER: u8 = 1;
pub const OWN_PUSHER: u8 = 2;
pub const OPPONENT_MOVER: u8 = 3;
pub const OPPONENT_PUSHER: u8 = 4;
pub const OPPONENT_ANCHOR: u8 = 5;

const RADIX: [usize; SYMBOLS] = [17, 3, 4, 3, 3, 2];
/// Offset delta for decrementing each count by one.
const STRIDE: [usize; SYMBOLS] = [216, 72, 18, 6, 2, 1];
const TABLE_LEN: usize = 17 * 216;

/// Number of minimized indices, see [`Perm::min_index`].
pub const MIN_INDEX_SIZE: u64 = 86_208_131_520;

/// Fields 0-12. Every reachable permutation has its anchor here, possibly
/// after rotation.
const HALF: usize = L / 2;
/// Symbols that can sit next to the anchor.
const NEIGHBOR_SYMBOLS: usize = 5;

/// Permutation with index 0.
#[rustfmt::skip]
pub const FIRST_PERM: Perm = Perm([
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    1, 1, 2, 2, 2, 3, 3, 4, 4, 5,
]);

/// Permutation with index `TOTAL_PERMS - 1`.
#[rustfmt::skip]
pub const LAST_PERM: Perm = Perm([
    5, 4, 4, 3, 3, 2, 2, 2, 1, 1,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
]);

#[inline]
fn offset(freq: &[u8; SYMBOLS]) -> usize {
    freq.iter().zip(STRIDE).map(|(&n, s)| n as usize * s).sum()
}

/// Precomputed counting tables.
pub struct PermTables {
    num_perms: Vec<u64>,
    /// `SYMBOLS` consecutive blocks of `TABLE_LEN`, one per symbol.
    count_smaller: Vec<u64>,
    /// Minimized-index ranges of horizontal pushes, keyed by `[left, right]`.
    horizontal: Vec<Range<u64>>,
    /// Minimized-index ranges of vertical pushes, keyed by
    /// `[top, left, right, bottom]`. They follow every horizontal range.
    vertical: Vec<Range<u64>>,
    /// Minimized-index range of each anchor field in the top half.
    anchor: Vec<Range<u64>>,
}

#[inline]
fn neighbor_key(symbols: &[u8]) -> usize {
    symbols.iter().fold(0, |key, &x| key * NEIGHBOR_SYMBOLS + x as usize)
}

/// Axes along which an anchor on `field` could have pushed: 0 without a
/// horizontal axis, 1 with only a horizontal one, 2 with both.
fn push_axes(field: Field) -> usize {
    let axis = |d: Direction| field.neighbor(d).is_some() && field.neighbor(d.opposite()).is_some();
    match (axis(Direction::Left), axis(Direction::Up)) {
        (false, _) => 0,
        (true, false) => 1,
        (true, true) => 2,
    }
}

impl PermTables {
    fn build() -> PermTables {
        let mut num_perms = vec![0u64; TABLE_LEN];
        let mut count_smaller = vec![0u64; SYMBOLS * TABLE_LEN];

        // Decrementing any count lowers the offset, so a single ascending pass
        // sees every smaller multiset before it is needed.
        for off in 0..TABLE_LEN {
            let freq = Self::decode(off);
            let mut smaller = 0u64;
            for y in 0..SYMBOLS {
                count_smaller[y * TABLE_LEN + off] = smaller;
                if freq[y] > 0 {
                    smaller += num_perms[off - STRIDE[y]];
                }
            }
            num_perms[off] = if off == 0 { 1 } else { smaller };
        }

        // Orderings of the fields left over once `fixed` symbols are placed.
        let remaining = |fixed: &[u8]| -> u64 {
            let mut freq = ALL_FREQ;
            for &x in fixed {
                match freq[x as usize].checked_sub(1) {
                    Some(n) => freq[x as usize] = n,
                    None => return 0,
                }
            }
            num_perms[offset(&freq)]
        };

        let mut total = 0;
        let mut horizontal = Vec::with_capacity(NEIGHBOR_SYMBOLS.pow(2));
        for left in 0..NEIGHBOR_SYMBOLS as u8 {
            for right in 0..NEIGHBOR_SYMBOLS as u8 {
                let begin = total;
                if (left == EMPTY) != (right == EMPTY) {
                    total += remaining(&[left, OPPONENT_ANCHOR, right]);
                }
                horizontal.push(begin..total);
            }
        }
        let horizontal_size = total;

        // Only layouts the horizontal axis does not already explain.
        let mut vertical = Vec::with_capacity(NEIGHBOR_SYMBOLS.pow(4));
        for key in 0..NEIGHBOR_SYMBOLS.pow(4) {
            let [top, left, right, bottom] = Self::decode_neighbors(key);
            let begin = total;
            if (left == EMPTY) == (right == EMPTY) && (top == EMPTY) != (bottom == EMPTY) {
                total += remaining(&[top, left, OPPONENT_ANCHOR, right, bottom]);
            }
            vertical.push(begin..total);
        }
        let vertical_size = total;

        let mut anchor = Vec::with_capacity(HALF);
        let mut total = 0;
        for field in Field::all().take(HALF) {
            let begin = total;
            total += match push_axes(field) {
                0 => 0,
                1 => horizontal_size,
                _ => vertical_size,
            };
            anchor.push(begin..total);
        }
        debug_assert_eq!(total, MIN_INDEX_SIZE);

        PermTables {
            num_perms,
            count_smaller,
            horizontal,
            vertical,
            anchor,
        }
    }

    fn decode_neighbors(mut key: usize) -> [u8; 4] {
        let mut symbols = [EMPTY; 4];
        for x in symbols.iter_mut().rev() {
            *x = (key % NEIGHBOR_SYMBOLS) as u8;
            key /= NEIGHBOR_SYMBOLS;
        }
        symbols
    }

    fn decode(mut off: usize) -> [u8; SYMBOLS] {
        let mut freq = [0u8; SYMBOLS];
        for i in (0..SYMBOLS).rev() {
            freq[i] = (off % RADIX[i]) as u8;
            off /= RADIX[i];
        }
        freq
    }

    /// Number of distinct orderings of a multiset with the given counts.
    #[inline]
    pub fn num_perms(&self, freq: &[u8; SYMBOLS]) -> u64 {
        self.num_perms[offset(freq)]
    }

    /// Number of orderings of `freq` whose first symbol is less than `x`.
    #[inline]
    pub fn count_smaller(&self, x: u8, freq: &[u8; SYMBOLS]) -> u64 {
        self.count_smaller[x as usize * TABLE_LEN + offset(freq)]
    }
}

/// The process-wide tables, built on first call.
pub fn tables() -> &'static PermTables {
    static TABLES: OnceLock<PermTables> = OnceLock::new();
    TABLES.get_or_init(PermTables::build)
}

/// Rank `symbols` among the orderings of its own multiset.
///
/// Symbols are consumed from the last to the first; each adds the number of
/// orderings of the suffix that start with a smaller symbol.
fn rank(t: &PermTables, symbols: &[u8]) -> u64 {
    let mut freq = [0u8; SYMBOLS];
    let mut idx = 0;
    for &x in symbols.iter().rev() {
        freq[x as usize] += 1;
        idx += t.count_smaller(x, &freq);
    }
    idx
}

/// Fill `out` with the ordering of `freq` that has rank `index`.
fn unrank(t: &PermTables, index: u64, mut freq: [u8; SYMBOLS], out: &mut [u8]) {
    let mut rest = index;
    for slot in out.iter_mut() {
        let mut chosen = None;
        for x in 0..SYMBOLS {
            if freq[x] == 0 {
                continue;
            }
            freq[x] -= 1;
            let n = t.num_perms(&freq);
            if n > rest {
                chosen = Some(x as u8);
                break;
            }
            freq[x] += 1;
            rest -= n;
        }
        match chosen {
            Some(x) => *slot = x,
            None => panic!("permutation tables inconsistent: no symbol fits index {}", index),
        }
    }
    assert_eq!(rest, 0, "permutation tables inconsistent at index {}", index);
}

/// A valid permutation: 26 symbols with exactly [`ALL_FREQ`] counts.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct Perm([u8; L]);

impl Perm {
    /// Validate symbol counts and wrap.
    pub fn new(symbols: [u8; L]) -> Result<Perm, PermError> {
        let mut freq = [0u8; SYMBOLS];
        for &x in &symbols {
            if x as usize >= SYMBOLS {
                return Err(PermError::InvalidSymbol(x));
            }
            freq[x as usize] += 1;
        }
        if freq != ALL_FREQ {
            return Err(PermError::WrongMultiplicities);
        }
        Ok(Perm(symbols))
    }

    #[inline]
    pub fn symbols(&self) -> &[u8; L] {
        &self.0
    }

    /// Lexicographic rank in `[0, TOTAL_PERMS)`.
    pub fn index(&self) -> u64 {
        rank(tables(), &self.0)
    }

    /// The permutation with the given rank.
    pub fn at_index(index: u64) -> Result<Perm, PermError> {
        if index >= TOTAL_PERMS {
            return Err(PermError::IndexOutOfRange(index));
        }
        let mut symbols = [EMPTY; L];
        unrank(tables(), index, ALL_FREQ, &mut symbols);
        Ok(Perm(symbols))
    }

    /// The same permutation with the board turned by 180 degrees.
    pub fn rotated(&self) -> Perm {
        let mut symbols = self.0;
        symbols.reverse();
        Perm(symbols)
    }

    /// Advance to the lexicographically next permutation, whose index is one
    /// greater. Returns false (and leaves `self` unchanged) on [`LAST_PERM`].
    pub fn next_permutation(&mut self) -> bool {
        let p = &mut self.0;
        let Some(i) = (0..L - 1).rev().find(|&i| p[i] < p[i + 1]) else {
            return false;
        };
        let j = (i + 1..L).rev().find(|&j| p[j] > p[i]).unwrap_or(i + 1);
        p.swap(i, j);
        p[i + 1..].reverse();
        true
    }

    /// Field of the anchored pusher.
    pub fn anchor(&self) -> Field {
        Field::all()
            .find(|f| self.0[f.index()] == OPPONENT_ANCHOR)
            .unwrap_or_else(|| unreachable!("valid permutations hold one anchor"))
    }

    /// Cheap necessary condition for the position to arise in play: the
    /// anchored pusher must have pushed last turn, so along some axis it has a
    /// piece on one side and an empty field on the other.
    ///
    /// `false` means definitely unreachable; `true` means likely reachable.
    pub fn is_reachable(&self) -> bool {
        let anchor = self.anchor();
        let (row, col) = (anchor.row() as i32, anchor.col() as i32);
        [Direction::Up, Direction::Left].into_iter().any(|axis| {
            let (dr, dc) = axis.delta();
            match (field_at(row - dr, col - dc), field_at(row + dr, col + dc)) {
                (Some(a), Some(b)) => (self.0[a.index()] == EMPTY) != (self.0[b.index()] == EMPTY),
                _ => false,
            }
        })
    }

    /// Dense index over the permutations that pass [`Perm::is_reachable`],
    /// counting a permutation and its rotation once, in `[0, MIN_INDEX_SIZE)`.
    ///
    /// The flag tells whether the board had to be turned to bring the anchor
    /// into the top half; pass it back to [`Perm::at_min_index`].
    ///
    /// Each anchor field owns a block of indices. Within it, the fields next
    /// to the anchor that show the direction of the last push select a
    /// sub-block, and the remaining fields are ranked like [`Perm::index`].
    pub fn min_index(&self) -> Result<(u64, bool), PermError> {
        if !self.is_reachable() {
            return Err(PermError::Unreachable);
        }
        let rotated = self.anchor().index() >= HALF;
        let perm = if rotated { self.rotated() } else { *self };
        let t = tables();
        let anchor = perm.anchor();
        let symbol = |f: Field| perm.0[f.index()];

        let mut fixed = 1u32 << anchor.index();
        let mut index = t.anchor[anchor.index()].start;
        let (Some(left), Some(right)) = (
            anchor.neighbor(Direction::Left),
            anchor.neighbor(Direction::Right),
        ) else {
            return Err(PermError::Unreachable);
        };
        if (symbol(left) == EMPTY) != (symbol(right) == EMPTY) {
            index += t.horizontal[neighbor_key(&[symbol(left), symbol(right)])].start;
            fixed |= 1 << left.index() | 1 << right.index();
        } else {
            let (Some(top), Some(bottom)) = (
                anchor.neighbor(Direction::Up),
                anchor.neighbor(Direction::Down),
            ) else {
                return Err(PermError::Unreachable);
            };
            let key = neighbor_key(&[symbol(top), symbol(left), symbol(right), symbol(bottom)]);
            index += t.vertical[key].start;
            for f in [top, left, right, bottom] {
                fixed |= 1 << f.index();
            }
        }

        let mut rest = [EMPTY; L];
        let mut n = 0;
        for (i, &x) in perm.0.iter().enumerate() {
            if fixed & (1 << i) == 0 {
                rest[n] = x;
                n += 1;
            }
        }
        Ok((index + rank(t, &rest[..n]), rotated))
    }

    /// The permutation with the given minimized index, turned by 180 degrees
    /// if `rotated` is set. Inverse of [`Perm::min_index`].
    pub fn at_min_index(index: u64, rotated: bool) -> Result<Perm, PermError> {
        if index >= MIN_INDEX_SIZE {
            return Err(PermError::IndexOutOfRange(index));
        }
        let t = tables();
        let Some((anchor, block)) = Field::all().zip(&t.anchor).find(|(_, r)| r.contains(&index))
        else {
            panic!("minimized index tables inconsistent at index {}", index);
        };
        let mut rest = index - block.start;

        let mut placed: Vec<(Field, u8)> = vec![(anchor, OPPONENT_ANCHOR)];
        let neighbors = |dirs: &[Direction]| -> Vec<Field> {
            dirs.iter().filter_map(|&d| anchor.neighbor(d)).collect()
        };
        if let Some(key) = t.horizontal.iter().position(|r| r.contains(&rest)) {
            rest -= t.horizontal[key].start;
            let fields = neighbors(&[Direction::Left, Direction::Right]);
            let [_, _, left, right] = PermTables::decode_neighbors(key);
            placed.extend(fields.into_iter().zip([left, right]));
        } else if let Some(key) = t.vertical.iter().position(|r| r.contains(&rest)) {
            rest -= t.vertical[key].start;
            let fields = neighbors(&[Direction::Up, Direction::Left, Direction::Right, Direction::Down]);
            placed.extend(fields.into_iter().zip(PermTables::decode_neighbors(key)));
        } else {
            panic!("minimized index tables inconsistent at index {}", index);
        }

        let mut symbols = [EMPTY; L];
        let mut freq = ALL_FREQ;
        let mut fixed = 0u32;
        for &(f, x) in &placed {
            symbols[f.index()] = x;
            freq[x as usize] -= 1;
            fixed |= 1 << f.index();
        }
        let mut remaining = [EMPTY; L];
        let n = L - placed.len();
        unrank(t, rest, freq, &mut remaining[..n]);
        let free = (0..L).filter(|&i| fixed & (1 << i) == 0);
        for (i, x) in free.zip(remaining) {
            symbols[i] = x;
        }

        let perm = Perm(symbols);
        Ok(if rotated { perm.rotated() } else { perm })
    }

    /// Position with red to move (the anchor, if any, is blue).
    pub fn to_position(&self) -> Position {
        Position::from_perm(self, Color::Red)
    }
}

impl fmt::Display for Perm {
    /// Position string with red to move.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const CHARS: [char; SYMBOLS] = ['.', 'o', 'O', 'x', 'X', 'Y'];
        self.0.iter().try_for_each(|&x| write!(f, "{}", CHARS[x as usize]))
    }
}

impl FromStr for Perm {
    type Err = ParseError;

    /// Accepts either a decimal index or a 26-character position string of
    /// an in-progress position.
    fn from_str(s: &str) -> Result<Perm, ParseError> {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            let index: u64 = s.parse().map_err(|_| ParseError::Index(s.to_string()))?;
            return Ok(Perm::at_index(index)?);
        }
        if s.chars().count() != L {
            return Err(ParseError::Index(s.to_string()));
        }
        let position: Position = s.parse()?;
        match position.validate() {
            Validity::InProgress { next_player, .. } => Ok(position.to_perm(next_player)?),
            other => Err(ParseError::NotInProgress(other.to_string())),
        }
    }
}
