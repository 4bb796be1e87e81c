use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::GameConfig;
use crate::engine::{Difficulty, Engine};
use crate::error::{GameError, MoveRejection};
use crate::evaluation::{Captures, Scores};
use crate::game_storage::{GameStorage, SaveRecord};
use crate::mirror::{BoardMirror, EMPTY};
use crate::rules::{ChessRules, GameStatus, Move, RulesEngine, Side};
use crate::timer::Timers;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameMode {
    HumanVsHuman,
    HumanVsComputer,
}

impl GameMode {
    pub fn toggled(self) -> Self {
        match self {
            GameMode::HumanVsHuman => GameMode::HumanVsComputer,
            GameMode::HumanVsComputer => GameMode::HumanVsHuman,
        }
    }
}

/// Cues for the front end, one batch per accepted move or tick.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Moved { mv: Move, side: Side },
    Captured { mv: Move, side: Side, piece: char },
    Check { side: Side },
    Checkmate { winner: Side },
    Stalemate,
    Timeout { winner: Side },
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Checkmate { winner: Side },
    Stalemate,
    Timeout { winner: Side },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Checkmate { winner } => write!(f, "{} wins by checkmate!", winner),
            Outcome::Stalemate => write!(f, "Draw by stalemate!"),
            Outcome::Timeout { winner } => write!(f, "{} wins on time!", winner),
        }
    }
}

/// Everything a front end needs to draw the session.
#[derive(Serialize, Clone, Debug)]
pub struct GameSnapshot {
    pub position: String,
    pub board: Vec<String>,
    pub side_to_move: Side,
    pub status: GameStatus,
    pub outcome: Option<Outcome>,
    pub move_history: Vec<Move>,
    pub captured_by_white: Vec<char>,
    pub captured_by_black: Vec<char>,
    pub scores: Scores,
    pub white_seconds: f64,
    pub black_seconds: f64,
    pub mode: GameMode,
    pub difficulty: Difficulty,
}

/// One chess session: the authoritative position plus everything derived
/// from it, the clocks, and the computer opponent.
pub struct Game<R: RulesEngine = ChessRules> {
    initial_position: R,
    rules: R,
    mirror: BoardMirror,
    move_history: Vec<Move>,
    captures: Captures,
    scores: Scores,
    status: GameStatus,
    outcome: Option<Outcome>,
    timers: Timers,
    initial_seconds: f64,
    mode: GameMode,
    human_side: Side,
    engine: Engine,
}

impl Game<ChessRules> {
    pub fn new(config: &GameConfig) -> Self {
        Self::with_rules(ChessRules::new(), config)
    }
}

impl<R: RulesEngine> Game<R> {
    /// Start a session from `rules`, which is also where `new_game` resets to.
    pub fn with_rules(rules: R, config: &GameConfig) -> Self {
        let engine = match config.seed {
            Some(seed) => Engine::with_seed(config.difficulty, seed),
            None => Engine::new(config.difficulty),
        };
        Self::with_engine(rules, config, engine)
    }

    pub fn with_engine(rules: R, config: &GameConfig, engine: Engine) -> Self {
        let mode = if config.human_vs_human {
            GameMode::HumanVsHuman
        } else {
            GameMode::HumanVsComputer
        };
        let mut game = Self {
            initial_position: rules.clone(),
            mirror: BoardMirror::rebuild(&rules.encode()),
            rules,
            move_history: Vec::new(),
            captures: Captures::default(),
            scores: Scores::default(),
            status: GameStatus::Normal,
            outcome: None,
            timers: Timers::new(config.initial_seconds),
            initial_seconds: config.initial_seconds,
            mode,
            human_side: config.human_side,
            engine,
        };
        game.refresh_derived();
        game
    }

    /// Reset to the initial position with fresh clocks. If the computer
    /// owns the side to move it plays straight away.
    pub fn new_game(&mut self, mode: GameMode) -> Vec<GameEvent> {
        self.rules = self.initial_position.clone();
        self.move_history.clear();
        self.timers = Timers::new(self.initial_seconds);
        self.mode = mode;
        self.refresh_derived();
        info!("new game: {:?}, {} difficulty", mode, self.engine.difficulty());
        self.play_computer_turn()
    }

    pub fn toggle_mode(&mut self) -> Vec<GameEvent> {
        self.new_game(self.mode.toggled())
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.engine.set_difficulty(difficulty);
    }

    pub fn cycle_difficulty(&mut self) -> Difficulty {
        let next = self.engine.difficulty().next();
        self.engine.set_difficulty(next);
        next
    }

    /// Try to play `token` on behalf of `side`.
    ///
    /// On success the events include the computer's reply when one follows.
    /// A rejection never changes the session.
    pub fn propose_move(&mut self, token: &str, side: Side) -> Result<Vec<GameEvent>, MoveRejection> {
        if self.outcome.is_some() {
            return Err(MoveRejection::GameOver);
        }
        let mv = Move::parse(token).map_err(|_| MoveRejection::Malformed(token.to_string()))?;

        let to_move = self.rules.side_to_move();
        match self.mode {
            GameMode::HumanVsComputer if to_move != self.human_side => {
                return Err(MoveRejection::ComputerTurn)
            }
            _ if side != to_move => return Err(MoveRejection::NotYourTurn),
            _ => {}
        }

        if !self.rules.legal_moves(to_move).contains(&mv) {
            return Err(MoveRejection::IllegalMove(mv.to_string()));
        }

        let mut events = self.apply_accepted(mv);
        events.extend(self.play_computer_turn());
        Ok(events)
    }

    /// Let the computer move while it owns the side to move.
    pub fn play_computer_turn(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while self.is_computer_turn() {
            match self.engine.choose_move(&self.rules) {
                Some(mv) => {
                    debug!("computer plays {}", mv);
                    events.extend(self.apply_accepted(mv));
                }
                None => {
                    warn!("computer found no move in {}", self.rules.encode());
                    break;
                }
            }
        }
        events
    }

    /// Advance the clock of the side to move by `elapsed` seconds.
    pub fn tick(&mut self, elapsed: f64) -> Option<GameEvent> {
        if self.outcome.is_some() {
            return None;
        }
        let side = self.rules.side_to_move();
        if !self.timers.tick(side, elapsed) {
            return None;
        }
        let winner = side.opponent();
        self.finish(Outcome::Timeout { winner });
        Some(GameEvent::Timeout { winner })
    }

    pub fn start_clock(&mut self) {
        if self.outcome.is_none() {
            self.timers.start();
        }
    }

    pub fn save(&self) -> String {
        SaveRecord {
            position: self.rules.encode(),
            difficulty: self.engine.difficulty(),
            move_history: self.move_history.clone(),
            white_seconds: self.timers.remaining(Side::White),
            black_seconds: self.timers.remaining(Side::Black),
            human_vs_human: self.mode == GameMode::HumanVsHuman,
        }
        .encode()
    }

    /// Restore a session from a save record. Nothing changes unless the
    /// whole record is valid.
    ///
    /// A clock saved at zero ends the game on time. If the computer owns
    /// the side to move it replies straight away and its events are
    /// returned, as with `new_game`.
    pub fn load(&mut self, text: &str) -> Result<Vec<GameEvent>, GameError> {
        let record = SaveRecord::parse(text).map_err(|e| {
            warn!("rejected save record: {}", e);
            e
        })?;
        let mut rules = self.initial_position.clone();
        rules.decode(&record.position)?;

        self.rules = rules;
        self.move_history = record.move_history;
        self.timers = Timers::with_remaining(record.white_seconds, record.black_seconds);
        self.mode = if record.human_vs_human {
            GameMode::HumanVsHuman
        } else {
            GameMode::HumanVsComputer
        };
        self.engine.set_difficulty(record.difficulty);
        self.refresh_derived();

        if self.outcome.is_none() {
            let to_move = self.rules.side_to_move();
            // The side to move loses first when both clocks are empty.
            let flagged = [to_move, to_move.opponent()]
                .into_iter()
                .find(|&side| self.timers.remaining(side) <= 0.0);
            if let Some(side) = flagged {
                self.finish(Outcome::Timeout { winner: side.opponent() });
            } else if !self.move_history.is_empty() {
                self.timers.start();
            }
        }
        info!("game loaded: {} moves, {:?}", self.move_history.len(), self.mode);
        Ok(self.play_computer_turn())
    }

    pub fn save_to(&self, storage: &GameStorage) -> Result<(), GameError> {
        storage.save(&self.save())
    }

    /// `GameError::NothingToLoad` when the slot is empty; the session is
    /// left as it was.
    pub fn load_from(&mut self, storage: &GameStorage) -> Result<Vec<GameEvent>, GameError> {
        let text = storage.load()?;
        self.load(&text)
    }

    pub fn board(&self) -> &BoardMirror {
        &self.mirror
    }

    pub fn position(&self) -> String {
        self.rules.encode()
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn captures(&self) -> &Captures {
        &self.captures
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn move_history(&self) -> &[Move] {
        &self.move_history
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn side_to_move(&self) -> Side {
        self.rules.side_to_move()
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn difficulty(&self) -> Difficulty {
        self.engine.difficulty()
    }

    pub fn human_side(&self) -> Side {
        self.human_side
    }

    pub fn computer_side(&self) -> Option<Side> {
        match self.mode {
            GameMode::HumanVsComputer => Some(self.human_side.opponent()),
            GameMode::HumanVsHuman => None,
        }
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.rules.legal_moves(self.rules.side_to_move())
    }

    /// Legal moves starting on `square`, for move hints.
    pub fn valid_moves_from(&self, square: &str) -> Vec<Move> {
        self.legal_moves()
            .into_iter()
            .filter(|mv| mv.source() == square)
            .collect()
    }

    pub fn outcome_message(&self) -> Option<String> {
        self.outcome.map(|outcome| outcome.to_string())
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            position: self.rules.encode(),
            board: self
                .mirror
                .rows()
                .iter()
                .map(|row| row.iter().collect())
                .collect(),
            side_to_move: self.rules.side_to_move(),
            status: self.status,
            outcome: self.outcome,
            move_history: self.move_history.clone(),
            captured_by_white: self.captures.by_white.clone(),
            captured_by_black: self.captures.by_black.clone(),
            scores: self.scores,
            white_seconds: self.timers.remaining(Side::White),
            black_seconds: self.timers.remaining(Side::Black),
            mode: self.mode,
            difficulty: self.engine.difficulty(),
        }
    }

    fn is_computer_turn(&self) -> bool {
        self.outcome.is_none() && self.computer_side() == Some(self.rules.side_to_move())
    }

    fn apply_accepted(&mut self, mv: Move) -> Vec<GameEvent> {
        let side = self.rules.side_to_move();
        // Read the target square before the mirror is rebuilt.
        let target = self.mirror.piece_at(mv.destination());

        self.rules.apply(&mv);
        self.move_history.push(mv.clone());
        self.refresh_derived();
        if self.outcome.is_none() {
            self.timers.start();
        }

        let mut events = vec![if target == EMPTY {
            GameEvent::Moved { mv, side }
        } else {
            GameEvent::Captured { mv, side, piece: target }
        }];
        match self.status {
            GameStatus::Check => events.push(GameEvent::Check {
                side: self.rules.side_to_move(),
            }),
            GameStatus::Checkmate => events.push(GameEvent::Checkmate { winner: side }),
            GameStatus::Stalemate => events.push(GameEvent::Stalemate),
            GameStatus::Normal => {}
        }
        events
    }

    /// Re-derive mirror, captures, scores and status from the position.
    fn refresh_derived(&mut self) {
        self.mirror = BoardMirror::rebuild(&self.rules.encode());
        self.captures = Captures::from_mirror(&self.mirror);
        self.scores = Scores::from_captures(&self.captures);
        self.status = self.rules.status();
        self.outcome = None;
        match self.status {
            GameStatus::Checkmate => self.finish(Outcome::Checkmate {
                winner: self.rules.side_to_move().opponent(),
            }),
            GameStatus::Stalemate => self.finish(Outcome::Stalemate),
            _ => {}
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.timers.stop();
        self.outcome = Some(outcome);
        info!("game over: {}", outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::STARTING_INVENTORY;
    use crate::rules::START_FEN;
    use pretty_assertions::assert_eq;

    fn config(human_vs_human: bool) -> GameConfig {
        GameConfig {
            human_vs_human,
            seed: Some(11),
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_new_game_state() {
        let game = Game::new(&config(true));
        assert_eq!(game.position(), START_FEN);
        assert!(game.move_history().is_empty());
        assert_eq!(game.status(), GameStatus::Normal);
        assert_eq!(game.scores(), Scores::default());
        assert_eq!(game.timers().remaining(Side::White), 600.0);
        assert_eq!(game.timers().remaining(Side::Black), 600.0);
        assert!(!game.timers().is_running());
        assert!(!game.is_over());
    }

    #[test]
    fn test_opening_move_updates_mirror() {
        let mut game = Game::new(&config(true));
        let events = game.propose_move("e2e4", Side::White).unwrap();
        assert_eq!(
            events,
            vec![GameEvent::Moved {
                mv: Move::parse("e2e4").unwrap(),
                side: Side::White
            }]
        );
        assert_eq!(game.board().piece_at("e4"), 'P');
        assert_eq!(game.board().piece_at("e2"), EMPTY);
        assert_eq!(game.side_to_move(), Side::Black);
        assert!(game.timers().is_running());
    }

    #[test]
    fn test_rejections_leave_state_alone() {
        let mut game = Game::new(&config(true));
        let before = game.save();
        assert_eq!(game.propose_move("e7e5", Side::Black), Err(MoveRejection::NotYourTurn));
        assert_eq!(
            game.propose_move("e2e5", Side::White),
            Err(MoveRejection::IllegalMove("e2e5".to_string()))
        );
        assert!(matches!(game.propose_move("zz", Side::White), Err(MoveRejection::Malformed(_))));
        assert_eq!(game.save(), before);
        assert_eq!(game.board(), &BoardMirror::rebuild(START_FEN));
    }

    #[test]
    fn test_same_move_twice_is_rejected() {
        let mut game = Game::new(&config(true));
        assert!(game.propose_move("e2e4", Side::White).is_ok());
        assert_eq!(game.propose_move("e2e4", Side::White), Err(MoveRejection::NotYourTurn));
    }

    #[test]
    fn test_computer_replies_immediately() {
        let mut game = Game::new(&config(false));
        let events = game.propose_move("e2e4", Side::White).unwrap();
        assert_eq!(game.move_history().len(), 2);
        assert_eq!(game.side_to_move(), Side::White);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], GameEvent::Moved { side: Side::Black, .. }));
    }

    #[test]
    fn test_human_cannot_move_for_the_computer() {
        let rules = ChessRules::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").unwrap();
        let mut game = Game::with_rules(rules, &config(false));
        // The computer has not been asked to move yet; humans still may not.
        assert_eq!(game.propose_move("e7e5", Side::Black), Err(MoveRejection::ComputerTurn));
        assert_eq!(game.propose_move("e7e5", Side::White), Err(MoveRejection::ComputerTurn));
    }

    #[test]
    fn test_computer_opens_when_playing_white() {
        let mut game = Game::new(&GameConfig {
            human_side: Side::Black,
            seed: Some(5),
            ..GameConfig::default()
        });
        let events = game.new_game(GameMode::HumanVsComputer);
        assert_eq!(events.len(), 1);
        assert_eq!(game.move_history().len(), 1);
        assert_eq!(game.side_to_move(), Side::Black);
    }

    #[test]
    fn test_fools_mate_is_terminal() {
        let mut game = Game::new(&config(true));
        game.propose_move("f2f3", Side::White).unwrap();
        game.propose_move("e7e5", Side::Black).unwrap();
        game.propose_move("g2g4", Side::White).unwrap();
        let events = game.propose_move("d8h4", Side::Black).unwrap();
        assert_eq!(events.last(), Some(&GameEvent::Checkmate { winner: Side::Black }));
        assert_eq!(game.outcome(), Some(Outcome::Checkmate { winner: Side::Black }));
        assert_eq!(game.outcome_message().unwrap(), "Black wins by checkmate!");
        assert!(!game.timers().is_running());
        assert_eq!(game.propose_move("a2a3", Side::White), Err(MoveRejection::GameOver));
    }

    #[test]
    fn test_stalemate_ends_the_game() {
        let rules = ChessRules::from_fen("7k/8/6K1/8/8/8/8/5Q2 w - - 0 1").unwrap();
        let mut game = Game::with_rules(rules, &config(true));
        let events = game.propose_move("f1f7", Side::White).unwrap();
        assert_eq!(
            events,
            vec![
                GameEvent::Moved {
                    mv: Move::parse("f1f7").unwrap(),
                    side: Side::White
                },
                GameEvent::Stalemate,
            ]
        );
        assert_eq!(game.status(), GameStatus::Stalemate);
        assert_eq!(game.outcome(), Some(Outcome::Stalemate));
        assert_eq!(game.outcome_message().unwrap(), "Draw by stalemate!");
        assert!(!game.timers().is_running());
        assert_eq!(game.propose_move("h8g8", Side::Black), Err(MoveRejection::GameOver));
        assert_eq!(game.propose_move("f7f8", Side::White), Err(MoveRejection::GameOver));
    }

    #[test]
    fn test_check_event() {
        let mut game = Game::new(&config(true));
        for (token, side) in [("e2e4", Side::White), ("f7f6", Side::Black)] {
            game.propose_move(token, side).unwrap();
        }
        let events = game.propose_move("d1h5", Side::White).unwrap();
        assert_eq!(events.last(), Some(&GameEvent::Check { side: Side::Black }));
        assert_eq!(game.status(), GameStatus::Check);
        assert!(!game.is_over());
    }

    #[test]
    fn test_captures_track_the_board() {
        let mut game = Game::new(&config(true));
        let line = [
            ("e2e4", Side::White),
            ("d7d5", Side::Black),
            ("e4d5", Side::White),
            ("d8d5", Side::Black),
        ];
        for (token, side) in line {
            game.propose_move(token, side).unwrap();
        }
        assert_eq!(game.captures().by_white, vec!['p']);
        assert_eq!(game.captures().by_black, vec!['P']);
        assert_eq!(game.scores(), Scores { white: 1, black: 1 });
        for &(piece, start) in STARTING_INVENTORY.iter() {
            assert!(game.captures().count(Side::White, piece) <= start);
        }
    }

    #[test]
    fn test_valid_moves_from_square() {
        let game = Game::new(&config(true));
        let mut hints: Vec<String> = game.valid_moves_from("g1").into_iter().map(String::from).collect();
        hints.sort();
        assert_eq!(hints, vec!["g1f3".to_string(), "g1h3".to_string()]);
        assert!(game.valid_moves_from("e7").is_empty());
    }

    #[test]
    fn test_toggle_mode_starts_fresh() {
        let mut game = Game::new(&config(true));
        game.propose_move("e2e4", Side::White).unwrap();
        game.toggle_mode();
        assert_eq!(game.mode(), GameMode::HumanVsComputer);
        assert!(game.move_history().is_empty());
        assert_eq!(game.position(), START_FEN);
    }

    #[test]
    fn test_cycle_difficulty() {
        let mut game = Game::new(&config(true));
        assert_eq!(game.difficulty(), Difficulty::Medium);
        assert_eq!(game.cycle_difficulty(), Difficulty::Hard);
        assert_eq!(game.cycle_difficulty(), Difficulty::Easy);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut game = Game::new(&config(true));
        game.propose_move("e2e4", Side::White).unwrap();
        let snapshot = game.snapshot();
        assert_eq!(snapshot.board[4], "    P   ");
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["move_history"][0], "e2e4");
        assert_eq!(json["side_to_move"], "Black");
    }
}
