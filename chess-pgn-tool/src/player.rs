//! The game player (§4.6 — component C8): walks a parsed [`Game`]'s main
//! line and variations, resolving/applying each move against a live
//! [`Board`], accumulating the running hashes, and triggering the
//! matching/classification layer (C10/C11/C13/C15) at every ply.
//!
//! This lives in `chess-pgn-tool` rather than `chess-core` because it is
//! orchestration over chess-core's primitives, not a rule-engine primitive
//! itself (§4.6's header calls it "thin shim over chess-core" in
//! `SPEC_FULL.md`).

use chess_core::board::Board;
use chess_core::engine::Engine;
use chess_core::error::ErrorKind;
use chess_core::game::{ErrorPly, Game};
use chess_core::matcher::eco;
use chess_core::matcher::endings::EndingsTracker;
use chess_core::mv::{CheckStatus, MoveClass, Variation};
use chess_core::pieces::Colour;
use chess_core::repetition::{is_fifty_move_rule, update_position_counts};
use chess_core::{apply::apply, resolve::resolve};

/// Per-run knobs that used to live in the source's `GlobalState` (§9):
/// bundled here instead of scattered across statics, mirroring
/// [`chess_core::engine::Engine`]'s "no global mutation" design note.
#[derive(Clone, Debug)]
pub struct PlayConfig {
    pub track_repetition: bool,
    pub track_fifty: bool,
    /// 0 means "snapshot final" (§4.6).
    pub fuzzy_match_depth: u32,
    /// Full-move bound past which positional/ECO/endings probing stops
    /// (§4.6's depth bound; defaults to 300).
    pub max_depth: u32,
    pub fix_result_tags: bool,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self { track_repetition: false, track_fifty: false, fuzzy_match_depth: 0, max_depth: 300, fix_result_tags: false }
    }
}

pub struct PlayOutcome {
    pub positional_matched: bool,
    pub matched_endings: Vec<String>,
    pub final_board: Board,
}

/// Plays `game` from `start`, mutating it in place (resolved moves, hashes,
/// repetition/fifty/ECO flags, `moves_ok`/`error_ply` on failure) and
/// reports whether any positional/endings matcher fired anywhere in the
/// tree (main line or variants).
pub fn play_game(game: &mut Game, start: Board, engine: &Engine) -> PlayOutcome {
    play_game_with(game, start, engine, &PlayConfig::default())
}

pub fn play_game_with(game: &mut Game, start: Board, engine: &Engine, config: &PlayConfig) -> PlayOutcome {
    let mut board = start;
    let mut positional_matched = false;
    let mut matched_endings = Vec::new();
    let mut endings_trackers: Vec<EndingsTracker> = vec![EndingsTracker::default(); engine.endings.len()];

    // Probe the initial position too, so FEN-setup games and matches on the
    // starting position itself are caught (§4.6).
    probe_board(&board, game, engine, config, &mut positional_matched, &mut endings_trackers, &mut matched_endings);

    let mut moves = std::mem::take(&mut game.moves);
    for mv in moves.iter_mut() {
        if mv.class == MoveClass::NullMove {
            game.has_main_line_null_move = true;
        }
        let board_before = board.clone();
        if let Err(e) = resolve(mv, &board) {
            game.moves_ok = false;
            game.error_ply = Some(ErrorPly { ply: game.half_moves_played + 1, kind: e.kind() });
            break;
        }
        let check = apply(&mut board, mv);
        mv.check_status = check;
        game.half_moves_played += 1;
        game.cumulative_hash_value = game.cumulative_hash_value.wrapping_add(board.hash_value);

        if config.fuzzy_match_depth == 0 || game.half_moves_played == config.fuzzy_match_depth {
            game.fuzzy_duplicate_hash = board.hash_value;
        }
        if config.track_repetition && update_position_counts(game, &board) {
            game.reached_repetition = true;
        }
        if config.track_fifty && is_fifty_move_rule(&board) {
            game.reached_fifty_move_rule = true;
        }

        probe_board(&board, game, engine, config, &mut positional_matched, &mut endings_trackers, &mut matched_endings);

        // Variants are alternatives to the move just played, so they
        // descend from the position *before* it; fully explored before the
        // main line continues (§4.6).
        for variant in mv.variants.iter_mut() {
            if play_variant(variant, board_before.clone(), engine, config) {
                positional_matched = true;
            }
        }
    }
    game.moves = moves;

    if config.fix_result_tags {
        fixup_result_tag(game, &board);
    }
    game.final_hash_value = board.hash_value;

    PlayOutcome { positional_matched, matched_endings, final_board: board }
}

fn probe_board(
    board: &Board,
    game: &mut Game,
    engine: &Engine,
    config: &PlayConfig,
    positional_matched: &mut bool,
    endings_trackers: &mut [EndingsTracker],
    matched_endings: &mut Vec<String>,
) {
    if game.half_moves_played > config.max_depth * 2 {
        return;
    }
    if engine.positional.position_matches(board).is_some() {
        *positional_matched = true;
    }
    if let Some(entry) = engine.eco_table.eco_matches(board.hash_value, game.cumulative_hash_value, game.half_moves_played) {
        game.eco_tag = Some(eco::entry_to_tag(entry));
    }
    for (spec, tracker) in engine.endings.iter().zip(endings_trackers.iter_mut()) {
        if tracker.update(spec, board) {
            matched_endings.push(spec.name.clone().unwrap_or_default());
        }
    }
}

/// Recursively plays one variation (§4.6): same rules as the main line
/// except null moves are permitted (decode/resolve already treat them as a
/// no-op application) and repetition tracking is disabled, per §4.6's "with
/// repetition tracking disabled for variants".
fn play_variant(variation: &mut Variation, mut board: Board, engine: &Engine, config: &PlayConfig) -> bool {
    let mut matched = engine.positional.position_matches(&board).is_some();
    for mv in variation.moves.iter_mut() {
        let board_before = board.clone();
        if resolve(mv, &board).is_err() {
            break;
        }
        mv.check_status = apply(&mut board, mv);
        if engine.positional.position_matches(&board).is_some() {
            matched = true;
        }
        for sub in mv.variants.iter_mut() {
            if play_variant(sub, board_before.clone(), engine, config) {
                matched = true;
            }
        }
    }
    matched
}

/// §4.6's optional result-tag fix: force the Result tag to match a
/// checkmate's winning side, or to `1/2-1/2` on a terminal stalemate.
fn fixup_result_tag(game: &mut Game, board_after: &Board) {
    use chess_core::movegen::is_stalemate;
    let Some(last) = game.moves.last() else { return };
    let result = match last.check_status {
        CheckStatus::Checkmate => {
            if board_after.to_move == Colour::White {
                "0-1"
            } else {
                "1-0"
            }
        }
        _ if is_stalemate(board_after, board_after.to_move) => "1/2-1/2",
        _ => return,
    };
    game.tags.set(chess_core::game::KnownTag::Result.name(), result);
}

/// Whether an [`chess_core::error::Error`]'s kind should be treated as a
/// fatal per-game stop (§7): every decode/resolution/illegal-castle kind
/// does; FEN errors are handled separately by the caller (best-effort
/// degrade, §4.12) before play even starts.
pub fn is_fatal_move_error(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::Decode | ErrorKind::Resolution | ErrorKind::IllegalCastle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::decode::decode;

    fn game_from_texts(texts: &[&str]) -> Game {
        let mut game = Game::new();
        game.moves = texts.iter().map(|t| decode(t)).collect();
        game
    }

    #[test]
    fn s1_fools_mate_is_checkmate_and_fixes_result() {
        let mut game = game_from_texts(&["f3", "e5", "g4", "Qh4"]);
        let mut config = PlayConfig::default();
        config.fix_result_tags = true;
        let outcome = play_game_with(&mut game, Board::starting_position(), &Engine::new(), &config);
        assert_eq!(game.moves.last().unwrap().check_status, CheckStatus::Checkmate);
        assert_eq!(game.tags.get(chess_core::game::KnownTag::Result), Some("0-1"));
        assert!(game.moves_ok);
        let _ = outcome.final_board;
    }

    #[test]
    fn s2_en_passant_resolves_and_resets_halfmove_clock() {
        let board = chess_core::fen::parse_fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 2").unwrap();
        let mut game = game_from_texts(&["dxe3"]);
        let outcome = play_game(&mut game, board, &Engine::new());
        assert_eq!(game.moves[0].class, MoveClass::EnPassantPawnMove);
        assert_eq!(outcome.final_board.halfmove_clock, 0);
    }

    #[test]
    fn s7_third_repetition_is_flagged() {
        let mut game = game_from_texts(&["Nf3", "Nf6", "Ng1", "Ng8", "Nf3", "Nf6", "Ng1", "Ng8"]);
        let mut config = PlayConfig::default();
        config.track_repetition = true;
        play_game_with(&mut game, Board::starting_position(), &Engine::new(), &config);
        assert!(game.reached_repetition);
    }

    #[test]
    fn main_line_null_move_marks_game_unsound() {
        let mut game = game_from_texts(&["e4", "--"]);
        play_game(&mut game, Board::starting_position(), &Engine::new());
        assert!(game.has_main_line_null_move);
    }
}
