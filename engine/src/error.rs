use thiserror::Error;

/// Errors surfaced by session persistence and configuration.
///
/// None of these leave a `Game` half-updated: every load path parses
/// the full record before touching the session.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid save format: {0}")]
    InvalidSaveFormat(String),

    #[error("invalid timer field: {0}")]
    InvalidTimer(String),

    #[error("invalid difficulty: {0}")]
    InvalidDifficulty(String),

    #[error("invalid mode flag: {0}")]
    InvalidModeFlag(String),

    #[error("invalid position encoding: {0}")]
    InvalidPosition(String),

    #[error("invalid move token: {0}")]
    InvalidMove(String),

    #[error("no saved game found at {0}")]
    NothingToLoad(String),

    #[error("invalid config: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Why a proposed move was turned away. The session is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveRejection {
    #[error("the game is already over")]
    GameOver,

    #[error("malformed move token: {0}")]
    Malformed(String),

    #[error("it is the computer's turn")]
    ComputerTurn,

    #[error("it is not your turn")]
    NotYourTurn,

    #[error("illegal move: {0}")]
    IllegalMove(String),
}
