use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GameError;
use crate::evaluation::capture_value;
use crate::mirror::BoardMirror;
use crate::rules::{Move, RulesEngine};
use crate::search::MinimaxStrategy;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Token used in save files: `1`, `2` or `3`.
    pub fn token(self) -> &'static str {
        match self {
            Difficulty::Easy => "1",
            Difficulty::Medium => "2",
            Difficulty::Hard => "3",
        }
    }

    pub fn from_token(token: &str) -> Result<Self, GameError> {
        match token.trim() {
            "1" => Ok(Difficulty::Easy),
            "2" => Ok(Difficulty::Medium),
            "3" => Ok(Difficulty::Hard),
            other => Err(GameError::InvalidDifficulty(other.to_string())),
        }
    }

    /// Easy -> Medium -> Hard -> Easy
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

/// A move-selection policy for the side to move.
///
/// Returns `None` only when the side to move has no legal moves, which
/// callers must never allow to happen.
pub trait MoveStrategy<R: RulesEngine> {
    fn choose(&self, rules: &R, rng: &mut dyn RngCore) -> Option<Move>;
}

/// Legal moves for the side to move, each paired with the value of the
/// piece sitting on its destination square.
pub fn scored_moves<R: RulesEngine>(rules: &R) -> Vec<(Move, u32)> {
    let mirror = BoardMirror::rebuild(&rules.encode());
    rules
        .legal_moves(rules.side_to_move())
        .into_iter()
        .map(|mv| {
            let value = capture_value(&mirror, mv.destination());
            (mv, value)
        })
        .collect()
}

/// Uniformly random legal move.
pub struct RandomStrategy;

impl<R: RulesEngine> MoveStrategy<R> for RandomStrategy {
    fn choose(&self, rules: &R, rng: &mut dyn RngCore) -> Option<Move> {
        let moves = rules.legal_moves(rules.side_to_move());
        debug_assert!(!moves.is_empty(), "move requested on a position with no legal moves");
        moves.choose(rng).cloned()
    }
}

/// One-ply capture seeker: highest captured value, random among ties.
pub struct GreedyStrategy;

impl GreedyStrategy {
    /// All moves that reach the best capture value available.
    pub fn best_moves<R: RulesEngine>(rules: &R) -> (u32, Vec<Move>) {
        let mut best_value = 0;
        let mut best_moves = Vec::new();
        for (mv, value) in scored_moves(rules) {
            if value > best_value || best_moves.is_empty() {
                best_value = value;
                best_moves.clear();
                best_moves.push(mv);
            } else if value == best_value {
                best_moves.push(mv);
            }
        }
        (best_value, best_moves)
    }
}

impl<R: RulesEngine> MoveStrategy<R> for GreedyStrategy {
    fn choose(&self, rules: &R, rng: &mut dyn RngCore) -> Option<Move> {
        let (best_value, best_moves) = Self::best_moves(rules);
        debug_assert!(!best_moves.is_empty(), "move requested on a position with no legal moves");
        debug!(
            "greedy: {} candidate(s) at capture value {}",
            best_moves.len(),
            best_value
        );
        best_moves.choose(rng).cloned()
    }
}

/// The computer opponent: a difficulty level plus its random source.
pub struct Engine {
    difficulty: Difficulty,
    rng: Box<dyn RngCore + Send>,
}

impl Engine {
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_rng(difficulty, StdRng::from_entropy())
    }

    pub fn with_seed(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_rng(difficulty, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng<G: RngCore + Send + 'static>(difficulty: Difficulty, rng: G) -> Self {
        Self {
            difficulty,
            rng: Box::new(rng),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    pub fn choose_move<R: RulesEngine>(&mut self, rules: &R) -> Option<Move> {
        let rng: &mut dyn RngCore = self.rng.as_mut();
        let chosen = match self.difficulty {
            Difficulty::Easy => RandomStrategy.choose(rules, rng),
            Difficulty::Medium => GreedyStrategy.choose(rules, rng),
            Difficulty::Hard => MinimaxStrategy::default().choose(rules, rng),
        };
        debug!("{} engine chose {:?}", self.difficulty, chosen);
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{ChessRules, Side};
    use std::collections::HashSet;

    #[test]
    fn test_difficulty_tokens() {
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(Difficulty::from_token(difficulty.token()).unwrap(), difficulty);
        }
        assert!(Difficulty::from_token("4").is_err());
        assert_eq!(Difficulty::Hard.next(), Difficulty::Easy);
        assert_eq!(Difficulty::Easy.next(), Difficulty::Medium);
    }

    #[test]
    fn test_random_move_is_legal() {
        let rules = ChessRules::new();
        let legal = rules.legal_moves(Side::White);
        let mut engine = Engine::with_seed(Difficulty::Easy, 7);
        for _ in 0..20 {
            let mv = engine.choose_move(&rules).unwrap();
            assert!(legal.contains(&mv));
        }
    }

    #[test]
    fn test_seeded_engines_agree() {
        let rules = ChessRules::new();
        let mut a = Engine::with_seed(Difficulty::Easy, 42);
        let mut b = Engine::with_seed(Difficulty::Easy, 42);
        for _ in 0..10 {
            assert_eq!(a.choose_move(&rules), b.choose_move(&rules));
        }
    }

    #[test]
    fn test_greedy_takes_the_queen() {
        let rules = ChessRules::from_fen("4k3/8/8/3q1p2/4P3/8/8/4K3 w - - 0 1").unwrap();
        for seed in 0..10 {
            let mut engine = Engine::with_seed(Difficulty::Medium, seed);
            assert_eq!(engine.choose_move(&rules).unwrap().as_str(), "e4d5");
        }
    }

    #[test]
    fn test_greedy_never_below_best_capture() {
        let rules = ChessRules::from_fen(
            "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
        )
        .unwrap();
        let best = scored_moves(&rules).iter().map(|(_, v)| *v).max().unwrap();
        let mirror = BoardMirror::rebuild(&rules.encode());
        let mut engine = Engine::with_seed(Difficulty::Medium, 3);
        for _ in 0..20 {
            let mv = engine.choose_move(&rules).unwrap();
            assert_eq!(capture_value(&mirror, mv.destination()), best);
        }
    }

    #[test]
    fn test_greedy_breaks_ties_randomly() {
        let rules = ChessRules::new();
        let (value, ties) = GreedyStrategy::best_moves(&rules);
        assert_eq!(value, 0);
        assert_eq!(ties.len(), 20);

        let picks: HashSet<Move> = (0..50)
            .map(|seed| Engine::with_seed(Difficulty::Medium, seed).choose_move(&rules).unwrap())
            .collect();
        assert!(picks.len() > 1);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "no legal moves")]
    fn test_choose_on_mated_position_asserts() {
        let rules =
            ChessRules::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        let mut engine = Engine::with_seed(Difficulty::Medium, 1);
        engine.choose_move(&rules);
    }
}
