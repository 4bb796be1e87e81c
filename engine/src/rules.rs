use chess::{Board as ChessBoard, BoardStatus, ChessMove, Color, File, MoveGen, Piece, Rank, Square};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GameError;

/// Standard initial placement, White to move.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Whether a board character belongs to this side (uppercase is White).
    pub fn owns(self, piece: char) -> bool {
        match self {
            Side::White => piece.is_ascii_uppercase(),
            Side::Black => piece.is_ascii_lowercase(),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
        }
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Normal,
    Check,
    Checkmate,
    Stalemate,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Checkmate | GameStatus::Stalemate)
    }
}

/// A move token such as `e2e4` or `e7e8q`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Move(String);

impl Move {
    pub fn parse(token: &str) -> Result<Self, GameError> {
        let token = token.trim();
        let bytes = token.as_bytes();
        if bytes.len() != 4 && bytes.len() != 5 {
            return Err(GameError::InvalidMove(token.to_string()));
        }
        let square_ok = |file: u8, rank: u8| (b'a'..=b'h').contains(&file) && (b'1'..=b'8').contains(&rank);
        if !square_ok(bytes[0], bytes[1]) || !square_ok(bytes[2], bytes[3]) {
            return Err(GameError::InvalidMove(token.to_string()));
        }
        let mut normalized = token[..4].to_string();
        if bytes.len() == 5 {
            let promo = bytes[4].to_ascii_lowercase();
            if !matches!(promo, b'q' | b'r' | b'b' | b'n') {
                return Err(GameError::InvalidMove(token.to_string()));
            }
            normalized.push(promo as char);
        }
        Ok(Move(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn source(&self) -> &str {
        &self.0[0..2]
    }

    pub fn destination(&self) -> &str {
        &self.0[2..4]
    }

    pub fn promotion(&self) -> Option<char> {
        self.0.chars().nth(4)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Move {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Move::parse(s)
    }
}

impl TryFrom<String> for Move {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Move::parse(&value)
    }
}

impl From<Move> for String {
    fn from(mv: Move) -> Self {
        mv.0
    }
}

/// The rules-engine boundary: legality, application, status and the
/// position encoding. Implementations are cheap to clone so a search can
/// explore each branch on its own copy of the position.
pub trait RulesEngine: Clone {
    fn legal_moves(&self, side: Side) -> Vec<Move>;
    fn apply(&mut self, mv: &Move);
    fn status(&self) -> GameStatus;
    fn side_to_move(&self) -> Side;
    fn encode(&self) -> String;
    fn decode(&mut self, encoding: &str) -> Result<(), GameError>;
}

/// `RulesEngine` backed by the `chess` crate.
#[derive(Clone, Debug)]
pub struct ChessRules {
    inner: ChessBoard,
}

impl ChessRules {
    pub fn new() -> Self {
        Self {
            inner: ChessBoard::default(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        ChessBoard::from_str(fen)
            .map(|board| Self { inner: board })
            .map_err(|e| GameError::InvalidPosition(format!("{}: {}", fen, e)))
    }

    pub fn as_chess_board(&self) -> &ChessBoard {
        &self.inner
    }

    fn to_chess_move(mv: &Move) -> ChessMove {
        let b = mv.as_str().as_bytes();
        let square = |file: u8, rank: u8| {
            Square::make_square(
                Rank::from_index((rank - b'1') as usize),
                File::from_index((file - b'a') as usize),
            )
        };
        let promotion = mv.promotion().map(|p| match p {
            'r' => Piece::Rook,
            'b' => Piece::Bishop,
            'n' => Piece::Knight,
            _ => Piece::Queen,
        });
        ChessMove::new(square(b[0], b[1]), square(b[2], b[3]), promotion)
    }

    fn from_chess_move(mv: ChessMove) -> Move {
        let mut token = format!("{}{}", mv.get_source(), mv.get_dest());
        if let Some(piece) = mv.get_promotion() {
            token.push(match piece {
                Piece::Rook => 'r',
                Piece::Bishop => 'b',
                Piece::Knight => 'n',
                _ => 'q',
            });
        }
        Move(token)
    }
}

impl Default for ChessRules {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesEngine for ChessRules {
    fn legal_moves(&self, side: Side) -> Vec<Move> {
        if side != self.side_to_move() {
            return Vec::new();
        }
        MoveGen::new_legal(&self.inner)
            .map(Self::from_chess_move)
            .collect()
    }

    fn apply(&mut self, mv: &Move) {
        let chess_move = Self::to_chess_move(mv);
        if !self.inner.legal(chess_move) {
            debug_assert!(false, "apply called with illegal move {}", mv);
            warn!("ignoring illegal move {} for {}", mv, self.inner);
            return;
        }
        self.inner = self.inner.make_move_new(chess_move);
    }

    fn status(&self) -> GameStatus {
        match self.inner.status() {
            BoardStatus::Checkmate => GameStatus::Checkmate,
            BoardStatus::Stalemate => GameStatus::Stalemate,
            BoardStatus::Ongoing if self.inner.checkers().popcnt() > 0 => GameStatus::Check,
            BoardStatus::Ongoing => GameStatus::Normal,
        }
    }

    fn side_to_move(&self) -> Side {
        self.inner.side_to_move().into()
    }

    fn encode(&self) -> String {
        self.inner.to_string()
    }

    fn decode(&mut self, encoding: &str) -> Result<(), GameError> {
        *self = Self::from_fen(encoding.trim())?;
        Ok(())
    }
}
