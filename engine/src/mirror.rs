use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

pub const EMPTY: char = ' ';

/// Plain 8x8 view of the piece placement, row 0 is rank 8.
///
/// Always rebuilt from the full position encoding, never patched.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct BoardMirror {
    grid: [[char; 8]; 8],
}

/// Board coordinates for an algebraic square such as `e4`.
pub fn square_to_coords(square: &str) -> Option<(usize, usize)> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let (file, rank) = (bytes[0], bytes[1]);
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }
    Some(((b'8' - rank) as usize, (file - b'a') as usize))
}

pub fn coords_to_square(row: usize, col: usize) -> String {
    format!("{}{}", (b'a' + col as u8) as char, 8 - row)
}

impl BoardMirror {
    pub fn empty() -> Self {
        Self {
            grid: [[EMPTY; 8]; 8],
        }
    }

    /// Parse the placement field of a position encoding.
    ///
    /// The encoding only ever comes from the rules engine, so a malformed
    /// placement is a broken precondition rather than a recoverable error.
    pub fn rebuild(encoding: &str) -> Self {
        let mut mirror = Self::empty();
        let placement = encoding.split_whitespace().next().unwrap_or("");
        let (mut row, mut col) = (0usize, 0usize);
        for c in placement.chars() {
            match c {
                '/' => {
                    row += 1;
                    col = 0;
                }
                '1'..='8' => col += c as usize - '0' as usize,
                _ => {
                    debug_assert!(row < 8 && col < 8, "placement overflows board: {}", placement);
                    if row < 8 && col < 8 {
                        mirror.grid[row][col] = c;
                    }
                    col += 1;
                }
            }
        }
        debug_assert!(row == 7, "placement must have 8 ranks: {}", placement);
        mirror
    }

    pub fn piece_at(&self, square: &str) -> char {
        square_to_coords(square)
            .map(|(row, col)| self.grid[row][col])
            .unwrap_or(EMPTY)
    }

    pub fn at(&self, row: usize, col: usize) -> char {
        self.grid[row][col]
    }

    pub fn rows(&self) -> &[[char; 8]; 8] {
        &self.grid
    }

    pub fn piece_counts(&self) -> HashMap<char, usize> {
        let mut counts = HashMap::new();
        for piece in self.grid.iter().flatten().filter(|&&c| c != EMPTY) {
            *counts.entry(*piece).or_insert(0) += 1;
        }
        counts
    }
}

impl Default for BoardMirror {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for BoardMirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.grid.iter().enumerate() {
            write!(f, "{} ", 8 - row)?;
            for &cell in cells {
                write!(f, " {}", if cell == EMPTY { '.' } else { cell })?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}
