pub mod config;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod game;
pub mod game_storage;
pub mod mirror;
pub mod rules;
pub mod search;
pub mod timer;

pub use config::GameConfig;
pub use engine::{Difficulty, Engine, GreedyStrategy, MoveStrategy, RandomStrategy};
pub use error::{GameError, MoveRejection};
pub use evaluation::{piece_value, Captures, Scores};
pub use game::{Game, GameEvent, GameMode, GameSnapshot, Outcome};
pub use game_storage::{GameStorage, SaveRecord};
pub use mirror::BoardMirror;
pub use rules::{ChessRules, GameStatus, Move, RulesEngine, Side, START_FEN};
pub use search::{search, MinimaxStrategy, SearchInfo};
pub use timer::{format_clock, Timers};
