//! Slide and push generation.
//!
//! A slide moves a piece any distance through connected empty fields. A push
//! moves a pusher one field into an occupied neighbor, shifting the whole
//! chain of pieces behind it by one field:
//!
//! ```text
//! . O x X .    O pushes right:   . . P x X
//! ```
//!
//! Pushes stop at the rails along the top and bottom edges: a chain that
//! would cross row 0 or row 3 cannot be pushed. The short ends and the
//! cut-off corners are open, and a piece pushed onto them leaves the board.

use crate::board::{field_at, Direction, Field, H};
use crate::notation::Step;
use crate::piece::{Color, Piece, Pieces};

/// Fields reachable from `from` through empty fields, in breadth-first order.
///
/// The source field is never included. The piece on `from` is not inspected.
pub fn move_destinations(pieces: &Pieces, from: Field) -> Vec<Field> {
    let mut visited: u32 = 1 << from.index();
    let mut todo = vec![from];
    let mut i = 0;
    while i < todo.len() {
        let field = todo[i];
        i += 1;
        for dir in Direction::ALL {
            if let Some(next) = field.neighbor(dir) {
                if pieces[next.index()].is_empty() && visited & (1 << next.index()) == 0 {
                    visited |= 1 << next.index();
                    todo.push(next);
                }
            }
        }
    }
    todo.remove(0);
    todo
}

/// Whether the piece on `from` can push in direction `dir`.
///
/// Only the chain is checked, not whether the piece on `from` is a pusher.
pub fn is_valid_push(pieces: &Pieces, from: Field, dir: Direction) -> bool {
    let (dr, dc) = dir.delta();
    let (mut row, mut col) = (from.row() as i32 + dr, from.col() as i32 + dc);

    // Must push at least one piece.
    let mut field = match field_at(row, col) {
        Some(f) if !pieces[f.index()].is_empty() => f,
        _ => return false,
    };
    loop {
        if pieces[field.index()].is_anchor() {
            return false;
        }
        row += dr;
        col += dc;
        if !(0..H).contains(&row) {
            // Rail.
            return false;
        }
        match field_at(row, col) {
            Some(next) if !pieces[next.index()].is_empty() => field = next,
            // Either an empty field stops the chain, or the last piece falls off.
            _ => return true,
        }
    }
}

/// Directions in which the piece on `from` can push.
pub fn push_directions(pieces: &Pieces, from: Field) -> impl Iterator<Item = Direction> + '_ {
    Direction::ALL
        .into_iter()
        .filter(move |&dir| is_valid_push(pieces, from, dir))
}

/// Destinations (first pushed field) of every valid push from `from`.
pub fn push_destinations(pieces: &Pieces, from: Field) -> Vec<Field> {
    push_directions(pieces, from)
        .filter_map(|dir| from.neighbor(dir))
        .collect()
}

/// Every slide available to `player`, by source field, destinations sorted.
pub fn slides(pieces: &Pieces, player: Color) -> Vec<Step> {
    let mut steps = Vec::with_capacity(64);
    for from in Field::all() {
        if !pieces[from.index()].is_mobile_of(player) {
            continue;
        }
        let mut dests = move_destinations(pieces, from);
        dests.sort_unstable();
        steps.extend(dests.into_iter().map(|to| Step::new(from, to)));
    }
    steps
}

/// Every push available to `player`. Only unanchored pushers push.
pub fn pushes(pieces: &Pieces, player: Color) -> Vec<Step> {
    let mut steps = Vec::with_capacity(16);
    for from in Field::all() {
        if pieces[from.index()] != Piece::Pusher(player) {
            continue;
        }
        steps.extend(
            push_destinations(pieces, from)
                .into_iter()
                .map(|to| Step::new(from, to)),
        );
    }
    steps
}

/// Whether `step` is one of the slides available to `player`.
pub fn is_valid_slide(pieces: &Pieces, player: Color, step: Step) -> bool {
    pieces[step.from.index()].is_mobile_of(player)
        && move_destinations(pieces, step.from).contains(&step.to)
}

/// Whether `step` is one of the pushes available to `player`.
pub fn is_legal_push(pieces: &Pieces, player: Color, step: Step) -> bool {
    if pieces[step.from.index()] != Piece::Pusher(player) {
        return false;
    }
    match Direction::between(step.from, step.to) {
        Some(dir) => is_valid_push(pieces, step.from, dir),
        None => false,
    }
}
