use log::debug;
use rand::RngCore;

use crate::engine::{scored_moves, MoveStrategy};
use crate::rules::{Move, RulesEngine};

pub const DEFAULT_DEPTH: u32 = 2;
/// Upper bound on plies; the recursion has no other cutoff.
pub const MAX_DEPTH: u32 = 4;

#[derive(Debug, Clone, Default)]
pub struct SearchInfo {
    pub nodes_searched: u64,
    pub best_move: Option<Move>,
    pub score: i32,
}

/// Fixed-depth minimax over the capture proxy.
///
/// A leaf is scored by the value of the piece taken by the move that led
/// to it, positive when the root side made that move and negative when the
/// opponent did. Board material is never counted. Each branch runs on its
/// own clone of the position, so nothing needs restoring afterwards.
pub fn search<R: RulesEngine>(rules: &R, depth: u32) -> SearchInfo {
    let depth = depth.clamp(1, MAX_DEPTH);
    let mut info = SearchInfo::default();

    let moves = scored_moves(rules);
    debug_assert!(!moves.is_empty(), "search started on a position with no legal moves");

    let mut best_score = i32::MIN;
    for (mv, value) in moves {
        let mut child = rules.clone();
        child.apply(&mv);
        let score = minimax(&child, depth - 1, false, value as i32, &mut info);
        // Strict comparison keeps the first move found among equals.
        if score > best_score {
            best_score = score;
            info.best_move = Some(mv);
        }
    }

    info.score = if info.best_move.is_some() { best_score } else { 0 };
    debug!(
        "minimax depth {}: best {:?} score {} after {} nodes",
        depth, info.best_move, info.score, info.nodes_searched
    );
    info
}

fn minimax<R: RulesEngine>(
    rules: &R,
    depth: u32,
    maximizing: bool,
    leading_value: i32,
    info: &mut SearchInfo,
) -> i32 {
    info.nodes_searched += 1;

    if depth == 0 {
        return leading_value;
    }

    let moves = scored_moves(rules);
    if moves.is_empty() {
        return leading_value;
    }

    let mut best = if maximizing { i32::MIN } else { i32::MAX };
    for (mv, value) in moves {
        let signed = if maximizing { value as i32 } else { -(value as i32) };
        let mut child = rules.clone();
        child.apply(&mv);
        let score = minimax(&child, depth - 1, !maximizing, signed, info);
        best = if maximizing { best.max(score) } else { best.min(score) };
    }
    best
}

#[derive(Debug, Clone, Copy)]
pub struct MinimaxStrategy {
    depth: u32,
}

impl MinimaxStrategy {
    pub fn with_depth(depth: u32) -> Self {
        Self {
            depth: depth.clamp(1, MAX_DEPTH),
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }
}

impl Default for MinimaxStrategy {
    fn default() -> Self {
        Self { depth: DEFAULT_DEPTH }
    }
}

impl<R: RulesEngine> MoveStrategy<R> for MinimaxStrategy {
    fn choose(&self, rules: &R, _rng: &mut dyn RngCore) -> Option<Move> {
        search(rules, self.depth).best_move
    }
}
