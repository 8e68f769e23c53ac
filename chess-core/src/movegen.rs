//! Piece offset tables, attack probes, and the pin/check-exclusion
//! primitive (§4.2 — component C3).
//!
//! Every ray generator skips the bounds check a flat 8x8 board would need:
//! walking a mailbox index off the playable area always lands on a border
//! cell (`Piece::Off`), so the loop condition is simply "stop at the first
//! non-empty cell" (§4.1).

use crate::board::Board;
use crate::pieces::{Colour, Piece};
use crate::squares::Square;

pub const KNIGHT_OFFSETS: [(i16, i16); 8] =
    [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];
pub const BISHOP_DIRS: [(i16, i16); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];
pub const ROOK_DIRS: [(i16, i16); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub const KING_DIRS: [(i16, i16); 8] =
    [(1, 0), (-1, 0), (0, 1), (0, -1), (1, 1), (1, -1), (-1, 1), (-1, -1)];

/// A candidate origin square for a move landing on a known target, paired
/// with nothing else — the resolver narrows these by file/rank
/// disambiguators and [`exclude_checks`].
pub type Candidates = Vec<Square>;

fn step_attacks(board: &Board, target: Square, colour: Colour, piece: Piece, offsets: &[(i16, i16)]) -> Candidates {
    offsets
        .iter()
        .filter_map(|&(df, dr)| {
            let from = target.offset(-df, -dr);
            (from.is_on_board() && board.piece_at(from).is_colour(colour) && board.piece_at(from).piece == piece)
                .then_some(from)
        })
        .collect()
}

fn step_attack_one(board: &Board, target: Square, colour: Colour, piece: Piece, offsets: &[(i16, i16)]) -> bool {
    offsets.iter().any(|&(df, dr)| {
        let from = target.offset(-df, -dr);
        from.is_on_board() && board.piece_at(from).is_colour(colour) && board.piece_at(from).piece == piece
    })
}

/// Walks outward from `target` along each of `dirs`, stopping at the first
/// non-empty square; records it if it's `colour`'s `piece`.
fn sliding_attacks(board: &Board, target: Square, colour: Colour, piece: Piece, dirs: &[(i16, i16)]) -> Candidates {
    let mut out = Vec::new();
    for &(df, dr) in dirs {
        let mut sq = target.offset(df, dr);
        while sq.is_on_board() {
            let occ = board.piece_at(sq);
            if occ.piece == Piece::Empty {
                sq = sq.offset(df, dr);
                continue;
            }
            if occ.is_colour(colour) && occ.piece == piece {
                out.push(sq);
            }
            break;
        }
    }
    out
}

fn sliding_attack_one(board: &Board, target: Square, colour: Colour, piece: Piece, dirs: &[(i16, i16)]) -> bool {
    for &(df, dr) in dirs {
        let mut sq = target.offset(df, dr);
        while sq.is_on_board() {
            let occ = board.piece_at(sq);
            if occ.piece == Piece::Empty {
                sq = sq.offset(df, dr);
                continue;
            }
            return occ.is_colour(colour) && occ.piece == piece;
        }
    }
    false
}

/// Pawns of `colour` that could diagonally capture on `target` (used both
/// by the resolver for capture candidates and by check detection).
pub fn pawn_capture_sources(board: &Board, target: Square, colour: Colour) -> Candidates {
    let dr = -colour.pawn_direction() as i16;
    [-1i16, 1]
        .into_iter()
        .filter_map(|df| {
            let from = target.offset(df, dr);
            (from.is_on_board() && board.piece_at(from).is_colour(colour) && board.piece_at(from).piece == Piece::Pawn)
                .then_some(from)
        })
        .collect()
}

fn pawn_attacks_one(board: &Board, target: Square, colour: Colour) -> bool {
    !pawn_capture_sources(board, target, colour).is_empty()
}

/// All `piece`-of-`colour` squares that could legally (pseudo-legally, i.e.
/// ignoring pins) reach `target`, per piece class (§4.2, find-all shape).
pub fn find_all(board: &Board, target: Square, colour: Colour, piece: Piece) -> Candidates {
    match piece {
        Piece::Knight => step_attacks(board, target, colour, piece, &KNIGHT_OFFSETS),
        Piece::King => step_attacks(board, target, colour, piece, &KING_DIRS),
        Piece::Bishop => sliding_attacks(board, target, colour, piece, &BISHOP_DIRS),
        Piece::Rook => sliding_attacks(board, target, colour, piece, &ROOK_DIRS),
        Piece::Queen => {
            let mut v = sliding_attacks(board, target, colour, piece, &BISHOP_DIRS);
            v.extend(sliding_attacks(board, target, colour, piece, &ROOK_DIRS));
            v
        }
        Piece::Pawn => pawn_capture_sources(board, target, colour),
        Piece::Empty | Piece::Off => Vec::new(),
    }
}

/// Earliest-exit boolean form of [`find_all`] (§4.2, find-one shape).
pub fn find_one(board: &Board, target: Square, colour: Colour, piece: Piece) -> bool {
    match piece {
        Piece::Knight => step_attack_one(board, target, colour, piece, &KNIGHT_OFFSETS),
        Piece::King => step_attack_one(board, target, colour, piece, &KING_DIRS),
        Piece::Bishop => sliding_attack_one(board, target, colour, piece, &BISHOP_DIRS),
        Piece::Rook => sliding_attack_one(board, target, colour, piece, &ROOK_DIRS),
        Piece::Queen => {
            sliding_attack_one(board, target, colour, piece, &BISHOP_DIRS)
                || sliding_attack_one(board, target, colour, piece, &ROOK_DIRS)
        }
        Piece::Pawn => pawn_attacks_one(board, target, colour),
        Piece::Empty | Piece::Off => false,
    }
}

/// True iff `colour`'s king square is attacked by any opposing piece.
/// Probes queen, rook, bishop, knight, pawn, king in turn, early-exiting on
/// the first hit (§4.2).
pub fn king_is_in_check(board: &Board, colour: Colour) -> bool {
    let king_sq = board.king_square(colour);
    square_is_attacked(board, king_sq, colour.opposite())
}

/// True iff any `by` piece attacks `square`.
pub fn square_is_attacked(board: &Board, square: Square, by: Colour) -> bool {
    find_one(board, square, by, Piece::Queen)
        || find_one(board, square, by, Piece::Rook)
        || find_one(board, square, by, Piece::Bishop)
        || find_one(board, square, by, Piece::Knight)
        || find_one(board, square, by, Piece::Pawn)
        || find_one(board, square, by, Piece::King)
}

/// Copy-make pin/check exclusion (§4.2): given from-square candidates for a
/// `colour` piece moving to `to`, keep only those that don't leave
/// `colour`'s king in check. This is the correctness-critical primitive
/// used by both the resolver and checkmate detection.
pub fn exclude_checks(board: &Board, colour: Colour, to: Square, candidates: Candidates) -> Candidates {
    candidates.into_iter().filter(|&from| !leaves_king_in_check(board, colour, from, to)).collect()
}

/// Applies `from -> to` on a scratch copy (handling the bystander pawn for
/// en passant, since that's the one normal move that captures on a square
/// other than its destination) and reports whether `colour`'s king ends up
/// in check.
pub fn leaves_king_in_check(board: &Board, colour: Colour, from: Square, to: Square) -> bool {
    let mut probe = board.clone();
    let moving = probe.piece_at(from);
    let is_ep = moving.piece == Piece::Pawn && to.file() != from.file() && probe.piece_at(to).piece == Piece::Empty;
    probe.remove_piece(from);
    if is_ep {
        let captured_sq = Square::from_file_rank(to.file(), from.rank());
        probe.remove_piece(captured_sq);
    } else {
        probe.remove_piece(to);
    }
    probe.set_piece(to, moving);
    king_is_in_check(&probe, colour)
}

/// Every pseudo-legal (pre-check-exclusion) `(from, to)` pair for `colour`,
/// castling deliberately excluded (§4.2: castling is excluded from the
/// escape search for both mate and stalemate detection). Used only by
/// [`king_is_in_checkmate`]/[`is_stalemate`]; the resolver never needs a
/// full move list because it already knows the destination from the SAN
/// text.
fn pseudo_legal_non_castling(board: &Board, colour: Colour) -> Vec<(Square, Square)> {
    let mut moves = Vec::new();
    for from in board.squares_of(colour) {
        let piece = board.piece_at(from).piece;
        match piece {
            Piece::Pawn => pawn_destinations(board, colour, from, &mut moves),
            Piece::Knight => step_destinations(board, colour, from, &KNIGHT_OFFSETS, &mut moves),
            Piece::King => step_destinations(board, colour, from, &KING_DIRS, &mut moves),
            Piece::Bishop => sliding_destinations(board, colour, from, &BISHOP_DIRS, &mut moves),
            Piece::Rook => sliding_destinations(board, colour, from, &ROOK_DIRS, &mut moves),
            Piece::Queen => {
                sliding_destinations(board, colour, from, &BISHOP_DIRS, &mut moves);
                sliding_destinations(board, colour, from, &ROOK_DIRS, &mut moves);
            }
            Piece::Empty | Piece::Off => {}
        }
    }
    moves
}

fn step_destinations(board: &Board, colour: Colour, from: Square, offsets: &[(i16, i16)], out: &mut Vec<(Square, Square)>) {
    for &(df, dr) in offsets {
        let to = from.offset(df, dr);
        if to.is_on_board() && !board.piece_at(to).is_colour(colour) {
            out.push((from, to));
        }
    }
}

fn sliding_destinations(board: &Board, colour: Colour, from: Square, dirs: &[(i16, i16)], out: &mut Vec<(Square, Square)>) {
    for &(df, dr) in dirs {
        let mut to = from.offset(df, dr);
        while to.is_on_board() {
            let occ = board.piece_at(to);
            if occ.piece == Piece::Empty {
                out.push((from, to));
                to = to.offset(df, dr);
                continue;
            }
            if !occ.is_colour(colour) {
                out.push((from, to));
            }
            break;
        }
    }
}

fn pawn_destinations(board: &Board, colour: Colour, from: Square, out: &mut Vec<(Square, Square)>) {
    let dr = colour.pawn_direction() as i16;
    let single = from.offset(0, dr);
    if single.is_on_board() && board.piece_at(single).piece == Piece::Empty {
        out.push((from, single));
        let double = from.offset(0, 2 * dr);
        if from.rank() == colour.pawn_start_rank_idx() && double.is_on_board() && board.piece_at(double).piece == Piece::Empty {
            out.push((from, double));
        }
    }
    for df in [-1i16, 1] {
        let cap = from.offset(df, dr);
        if !cap.is_on_board() {
            continue;
        }
        let occ = board.piece_at(cap);
        if occ.is_playable() && !occ.is_colour(colour) {
            out.push((from, cap));
        } else if board.ep_square == Some(cap) {
            out.push((from, cap));
        }
    }
}

/// `colour`'s king is in checkmate iff it's in check and every pseudo-legal
/// non-castling move, once filtered by [`exclude_checks`], still leaves it
/// in check (i.e. there are none left) (§4.2, §8 property 7).
pub fn king_is_in_checkmate(board: &Board, colour: Colour) -> bool {
    king_is_in_check(board, colour) && legal_moves_exist(board, colour).not()
}

/// Stalemate: not in check, but no legal move exists.
pub fn is_stalemate(board: &Board, colour: Colour) -> bool {
    !king_is_in_check(board, colour) && legal_moves_exist(board, colour).not()
}

fn legal_moves_exist(board: &Board, colour: Colour) -> bool {
    pseudo_legal_non_castling(board, colour)
        .into_iter()
        .any(|(from, to)| !leaves_king_in_check(board, colour, from, to))
}

trait NotExt {
    fn not(self) -> bool;
}
impl NotExt for bool {
    fn not(self) -> bool {
        !self
    }
}

/// Chess960-aware castling legality (§4.2): the right must still exist, the
/// squares the king and rook traverse must be empty (except possibly for
/// each other), and the king may not start, pass through, or land in check.
pub fn can_castle(board: &Board, colour: Colour, side: crate::castling::CastleSide) -> bool {
    let Some(rook_file) = board.castling.rook_file(colour, side) else {
        return false;
    };
    let rank = colour.back_rank() - 1;
    let king_from = board.king_square(colour);
    let king_to_file = side.king_dest_file();
    let rook_to_file = side.rook_dest_file();
    let rook_from = Square::from_file_rank(rook_file, rank);

    let king_path = file_range(king_from.file(), king_to_file);
    let rook_path = file_range(rook_file, rook_to_file);
    for file in king_path.iter().chain(rook_path.iter()).copied() {
        let sq = Square::from_file_rank(file, rank);
        if sq == king_from || sq == rook_from {
            continue;
        }
        if board.piece_at(sq).piece != Piece::Empty {
            return false;
        }
    }

    if king_is_in_check(board, colour) {
        return false;
    }
    let step: i8 = if king_to_file > king_from.file() { 1 } else { -1 };
    let mut file = king_from.file();
    while file != king_to_file {
        file += step;
        let sq = Square::from_file_rank(file, rank);
        if leaves_king_in_check_for_castle(board, colour, king_from, sq) {
            return false;
        }
    }
    true
}

fn file_range(a: i8, b: i8) -> Vec<i8> {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    (lo..=hi).collect()
}

/// Simulates moving only the king (not the rook) to probe check along the
/// castling path, per §4.2's "probed by simulating one-square king moves
/// across the interval".
fn leaves_king_in_check_for_castle(board: &Board, colour: Colour, king_from: Square, king_to: Square) -> bool {
    let mut probe = board.clone();
    let king = probe.remove_piece(king_from);
    probe.remove_piece(king_to);
    probe.set_piece(king_to, king);
    probe.set_king_square(colour, king_to);
    king_is_in_check(&probe, colour)
}
