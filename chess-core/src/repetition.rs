//! Per-game position-count tracking and fifty-move-rule interpretation
//! (§4.15/§3 — component C15).
//!
//! The source's repetition detector keys on the same placement-only hash
//! the rest of the engine uses (§9: "approximate... the source already uses
//! an extended key... in newer code"). We follow that documented tradeoff
//! for the default key but also expose [`StrictPositionKey`] for callers
//! that want side/castling/ep-sensitive three-fold detection.

use crate::board::Board;
use crate::game::Game;

/// Bumps `game`'s position-count table for `board`'s current hash and
/// reports whether this is the position's third occurrence (§8 S7).
pub fn update_position_counts(game: &mut Game, board: &Board) -> bool {
    let count = game.position_counts.entry(board.hash_value).or_insert(0);
    *count += 1;
    *count >= 3
}

/// §4.15: the halfmove clock reaching 100 means fifty full moves have
/// passed without a capture or pawn move.
pub fn is_fifty_move_rule(board: &Board) -> bool {
    board.halfmove_clock >= 100
}

/// A side/castling/ep-sensitive position key for callers that need strict
/// (rather than placement-only) three-fold repetition fidelity (§9).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct StrictPositionKey(u64);

impl StrictPositionKey {
    pub fn of(board: &Board) -> Self {
        let mut key = board.hash_value;
        key ^= (board.to_move as u64) << 1;
        key ^= (board.castling.polyglot_index() as u64) << 2;
        if let Some(ep) = board.ep_square {
            key ^= (ep.file() as u64 + 1) << 8;
        }
        Self(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::apply;
    use crate::resolve::decode_and_resolve;

    #[test]
    fn third_occurrence_is_detected() {
        let mut board = Board::starting_position();
        let mut game = Game::new();
        assert!(!update_position_counts(&mut game, &board));
        // Shuffle knights back and forth twice to repeat the start position.
        for text in ["Nf3", "Nf6", "Ng1", "Ng8", "Nf3", "Nf6", "Ng1", "Ng8"] {
            let mv = decode_and_resolve(text, &board).unwrap();
            apply(&mut board, &mv);
            update_position_counts(&mut game, &board);
        }
        assert!(update_position_counts(&mut game, &board));
    }
}
