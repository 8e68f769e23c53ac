//! Replays a game and regenerates move text in the selected dialect (§4.13,
//! §6 — component C14).

use crate::board::Board;
use crate::castling::CastleSide;
use crate::fen;
use crate::movegen;
use crate::mv::{CheckStatus, Move, MoveClass};
use crate::pieces::Piece;
use crate::squares::Square;

/// Output move-text dialects selectable via `-W` (§6).
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[must_use]
pub enum Dialect {
    #[default]
    San,
    Epd,
    /// Legacy "CM" dialect: same as SAN but `++` for mate instead of `#`.
    Cm,
    /// Long algebraic, e.g. `e2e4`.
    Lalg,
    /// Hyphenated long algebraic, e.g. `e2-e4`.
    Halg,
    /// Enhanced long algebraic: piece-letter prefix plus an `ep` marker.
    Elalg,
    /// Long algebraic with explicit `x`/`-` separator.
    Xlalg,
    /// UCI: coerces to LALG, with NAGs/comments/move numbers/checks/variations
    /// all suppressed by the caller (§6) -- the rewriter itself only needs
    /// to emit the bare long-algebraic text.
    Uci,
}

/// Annotation comments the rewriter may append after a move, per §4.13.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Annotation {
    Fen,
    HashHex,
    ShannonEval,
}

/// Rewrites `mv` (already resolved against `board_before`, the position
/// *before* the move) in `dialect`, returning the new text. Does not mutate
/// `mv`; callers that want the game's canonical text updated should assign
/// the result back.
pub fn rewrite_move(mv: &Move, board_before: &Board, board_after: &Board, dialect: Dialect, piece_letters: Option<&[char; 6]>) -> String {
    if mv.class == MoveClass::NullMove {
        return "--".to_string();
    }
    let base = match dialect {
        Dialect::San | Dialect::Epd | Dialect::Cm => render_san(mv, board_before, piece_letters),
        Dialect::Lalg | Dialect::Uci => render_long_algebraic(mv, "", false),
        Dialect::Halg => render_long_algebraic(mv, "-", false),
        Dialect::Elalg => render_long_algebraic(mv, "", true),
        Dialect::Xlalg => render_long_algebraic(mv, if mv.captured_piece != Piece::Empty { "x" } else { "-" }, false),
    };
    if dialect == Dialect::Uci {
        return base;
    }
    append_check_marker(base, board_after, dialect)
}

fn append_check_marker(mut text: String, board_after: &Board, dialect: Dialect) -> String {
    match movegen_check_status(board_after) {
        CheckStatus::Checkmate => text.push_str(if dialect == Dialect::Cm { "++" } else { "#" }),
        CheckStatus::Check => text.push('+'),
        CheckStatus::NoCheck => {}
    }
    text
}

fn movegen_check_status(board: &Board) -> CheckStatus {
    let to_move = board.to_move;
    if movegen::king_is_in_checkmate(board, to_move) {
        CheckStatus::Checkmate
    } else if movegen::king_is_in_check(board, to_move) {
        CheckStatus::Check
    } else {
        CheckStatus::NoCheck
    }
}

fn piece_letter(piece: Piece, piece_letters: Option<&[char; 6]>) -> String {
    if let Some(letters) = piece_letters {
        let idx = match piece {
            Piece::Pawn => 0,
            Piece::Knight => 1,
            Piece::Bishop => 2,
            Piece::Rook => 3,
            Piece::Queen => 4,
            Piece::King => 5,
            _ => return String::new(),
        };
        if piece == Piece::Pawn {
            String::new()
        } else {
            letters[idx].to_string()
        }
    } else {
        piece.to_san_letter().to_string()
    }
}

/// Regenerates SAN text, with the minimum disambiguation needed (§4.13):
/// file alone if it uniquely distinguishes the mover, else rank alone, else
/// both; pawn captures always carry the source file.
fn render_san(mv: &Move, board_before: &Board, piece_letters: Option<&[char; 6]>) -> String {
    if mv.class.is_castle() {
        return if mv.class == MoveClass::KingsideCastle { "O-O".to_string() } else { "O-O-O".to_string() };
    }
    let to = mv.to_square().expect("resolved move");
    let from = mv.from_square().expect("resolved move");
    let mut out = String::new();

    if mv.class.is_pawn_move() {
        if mv.captured_piece != Piece::Empty || mv.class == MoveClass::EnPassantPawnMove {
            out.push(from.file_char());
            out.push('x');
        }
        out.push_str(&to.to_string());
        if mv.class == MoveClass::PawnMoveWithPromotion {
            out.push('=');
            out.push_str(&piece_letter(mv.promoted_piece, piece_letters).to_uppercase());
        }
        return out;
    }

    out.push_str(&piece_letter(mv.piece_to_move, piece_letters));
    out.push_str(&disambiguator(mv, board_before, from, to));
    if mv.captured_piece != Piece::Empty {
        out.push('x');
    }
    out.push_str(&to.to_string());
    out
}

fn disambiguator(mv: &Move, board_before: &Board, from: Square, to: Square) -> String {
    let mut others = movegen::find_all(board_before, to, board_before.to_move, mv.piece_to_move);
    others = movegen::exclude_checks(board_before, board_before.to_move, to, others);
    others.retain(|&sq| sq != from);
    if others.is_empty() {
        return String::new();
    }
    if others.iter().all(|sq| sq.file() != from.file()) {
        return from.file_char().to_string();
    }
    if others.iter().all(|sq| sq.rank() != from.rank()) {
        return from.rank_char().to_string();
    }
    from.to_string()
}

fn render_long_algebraic(mv: &Move, separator: &str, enhanced: bool) -> String {
    let from = mv.from_square().expect("resolved move");
    let to = mv.to_square().expect("resolved move");
    let mut out = String::new();
    if enhanced {
        out.push_str(&piece_letter(mv.piece_to_move, None));
    }
    out.push_str(&from.to_string());
    out.push_str(separator);
    out.push_str(&to.to_string());
    if mv.class == MoveClass::PawnMoveWithPromotion {
        out.push('=');
        out.push_str(&piece_letter(mv.promoted_piece, None).to_uppercase());
    }
    if enhanced && mv.class == MoveClass::EnPassantPawnMove {
        out.push_str("ep");
    }
    out
}

/// Generates an annotation comment for a just-applied move, per §4.13.
pub fn annotate(board_after: &Board, kind: Annotation) -> String {
    match kind {
        Annotation::Fen => fen::to_fen(board_after),
        Annotation::HashHex => format!("{:016x}", board_after.hash_value),
        Annotation::ShannonEval => format!("{:+.1}", shannon_eval(board_after)),
    }
}

/// Trivial Shannon material+mobility heuristic (§1 Non-goals, §4.13):
/// material difference plus 0.1 times the mobility difference (candidate
/// destination-square count, pseudo-legal, for each side). Not an engine
/// evaluation -- purely a commentary annotation.
fn shannon_eval(board: &Board) -> f32 {
    use crate::pieces::Colour;
    let material = |colour: Colour| -> f32 { board.squares_of(colour).map(|sq| board.piece_at(sq).piece.shannon_value()).sum() };
    let mobility = |colour: Colour| -> u32 {
        Square::all().filter(|&sq| board.piece_at(sq).is_colour(colour)).map(|sq| rough_mobility(board, sq, board.piece_at(sq).piece, colour)).sum()
    };
    let material_diff = material(Colour::White) - material(Colour::Black);
    let mobility_diff = mobility(Colour::White) as f32 - mobility(Colour::Black) as f32;
    material_diff + 0.1 * mobility_diff
}

fn rough_mobility(board: &Board, from: Square, piece: Piece, colour: crate::pieces::Colour) -> u32 {
    let dirs: &[(i16, i16)] = match piece {
        Piece::Knight => &movegen::KNIGHT_OFFSETS,
        Piece::Bishop => &movegen::BISHOP_DIRS,
        Piece::Rook => &movegen::ROOK_DIRS,
        Piece::Queen | Piece::King => &movegen::KING_DIRS,
        _ => return 0,
    };
    let sliding = matches!(piece, Piece::Bishop | Piece::Rook | Piece::Queen);
    let mut count = 0;
    for &(df, dr) in dirs {
        let mut sq = from.offset(df, dr);
        loop {
            if !sq.is_on_board() {
                break;
            }
            let occ = board.piece_at(sq);
            if occ.piece == Piece::Empty {
                count += 1;
                if !sliding {
                    break;
                }
                sq = sq.offset(df, dr);
                continue;
            }
            if !occ.is_colour(colour) {
                count += 1;
            }
            break;
        }
    }
    count
}

/// If a move fails to rewrite and broken-game retention is on, the rest of
/// the game collapses into a single trailing comment on the last good move
/// (§4.13).
pub fn collapse_broken_tail(last_good_text: &str, remaining_raw: &[String]) -> String {
    format!("{last_good_text} {{broken: {}}}", remaining_raw.join(" "))
}

/// Replaces an existing comment matching `pattern` with a fresh FEN string
/// for `board` (§4.13's "a comment bearing a user-supplied pattern may be
/// replaced with a fresh FEN").
pub fn refresh_fen_comment(comments: &mut [String], pattern: &str, board: &Board) {
    for comment in comments.iter_mut() {
        if comment.contains(pattern) {
            *comment = fen::to_fen(board);
        }
    }
}

/// Resolves `side` (kingside/queenside) so castling rewrite can share the
/// same dialect machinery -- kept as a free function since [`render_san`]
/// special-cases castling and the long-algebraic dialects render the king's
/// actual from/to squares instead.
pub fn castle_rook_dest_file(side: CastleSide) -> i8 {
    side.rook_dest_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::apply;
    use crate::resolve::decode_and_resolve;

    #[test]
    fn rewrites_simple_pawn_push() {
        let board = Board::starting_position();
        let mv = decode_and_resolve("e4", &board).unwrap();
        let mut after = board.clone();
        apply(&mut after, &mv);
        assert_eq!(rewrite_move(&mv, &board, &after, Dialect::San, None), "e4");
    }

    #[test]
    fn rewrites_fools_mate_with_hash() {
        let mut board = Board::starting_position();
        let mut last = String::new();
        for text in ["f3", "e5", "g4", "Qh4"] {
            let mv = decode_and_resolve(text, &board).unwrap();
            let mut after = board.clone();
            apply(&mut after, &mv);
            last = rewrite_move(&mv, &board, &after, Dialect::San, None);
            board = after;
        }
        assert_eq!(last, "Qh4#");
    }

    #[test]
    fn s4_implicit_promotion_rewrites_as_equals_queen() {
        let board = fen::parse_fen("8/P6k/8/8/8/8/7K/8 w - - 0 1").unwrap();
        let mv = decode_and_resolve("a8", &board).unwrap();
        assert_eq!(mv.promoted_piece, Piece::Queen);
        let mut after = board.clone();
        apply(&mut after, &mv);
        assert_eq!(rewrite_move(&mv, &board, &after, Dialect::San, None), "a8=Q");
    }

    #[test]
    fn long_algebraic_uses_from_to_squares() {
        let board = Board::starting_position();
        let mv = decode_and_resolve("Nf3", &board).unwrap();
        let mut after = board.clone();
        apply(&mut after, &mv);
        assert_eq!(rewrite_move(&mv, &board, &after, Dialect::Lalg, None), "g1f3");
        assert_eq!(rewrite_move(&mv, &board, &after, Dialect::Halg, None), "g1-f3");
    }
}
