use serde::Serialize;

use crate::mirror::{BoardMirror, EMPTY};
use crate::rules::Side;

const PAWN_VALUE: u32 = 1;
const KNIGHT_VALUE: u32 = 3;
const BISHOP_VALUE: u32 = 3;
const ROOK_VALUE: u32 = 5;
const QUEEN_VALUE: u32 = 9;
const KING_VALUE: u32 = 0; // Kings are never captured

/// Pieces each side starts with, in display order.
pub const STARTING_INVENTORY: [(char, usize); 6] = [
    ('q', 1),
    ('r', 2),
    ('b', 2),
    ('n', 2),
    ('p', 8),
    ('k', 1),
];

/// Standard material weight of a board character, either case; blank is 0.
pub fn piece_value(piece: char) -> u32 {
    match piece.to_ascii_lowercase() {
        'p' => PAWN_VALUE,
        'n' => KNIGHT_VALUE,
        'b' => BISHOP_VALUE,
        'r' => ROOK_VALUE,
        'q' => QUEEN_VALUE,
        'k' => KING_VALUE,
        _ => 0,
    }
}

/// Value of whatever stands on `destination` before a move lands there.
pub fn capture_value(mirror: &BoardMirror, destination: &str) -> u32 {
    match mirror.piece_at(destination) {
        EMPTY => 0,
        piece => piece_value(piece),
    }
}

/// Pieces taken by each side, derived from what is missing on the board.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Captures {
    /// Black pieces captured by White (lowercase characters).
    pub by_white: Vec<char>,
    /// White pieces captured by Black (uppercase characters).
    pub by_black: Vec<char>,
}

impl Captures {
    pub fn from_mirror(mirror: &BoardMirror) -> Self {
        let counts = mirror.piece_counts();
        let mut captures = Captures::default();
        for &(piece, start) in STARTING_INVENTORY.iter() {
            let white_piece = piece.to_ascii_uppercase();
            let missing_white = start.saturating_sub(counts.get(&white_piece).copied().unwrap_or(0));
            let missing_black = start.saturating_sub(counts.get(&piece).copied().unwrap_or(0));
            captures.by_black.extend(std::iter::repeat(white_piece).take(missing_white));
            captures.by_white.extend(std::iter::repeat(piece).take(missing_black));
        }
        captures
    }

    pub fn taken_by(&self, side: Side) -> &[char] {
        match side {
            Side::White => &self.by_white,
            Side::Black => &self.by_black,
        }
    }

    pub fn count(&self, side: Side, piece: char) -> usize {
        self.taken_by(side)
            .iter()
            .filter(|p| p.eq_ignore_ascii_case(&piece))
            .count()
    }

    pub fn score(&self, side: Side) -> u32 {
        self.taken_by(side).iter().map(|&p| piece_value(p)).sum()
    }
}

#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scores {
    pub white: u32,
    pub black: u32,
}

impl Scores {
    pub fn from_captures(captures: &Captures) -> Self {
        Self {
            white: captures.score(Side::White),
            black: captures.score(Side::Black),
        }
    }

    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::White => self.white,
            Side::Black => self.black,
        }
    }
}
