//! Mutates a [`Board`] per a fully-resolved [`Move`] (§4.5 — component C6).

use crate::board::Board;
use crate::castling::CastleSide;
use crate::mv::{CheckStatus, Move, MoveClass};
use crate::pieces::{ColouredPiece, Piece};
use crate::movegen;
use crate::squares::Square;

/// Applies `mv` (already resolved, i.e. every coordinate filled in) to
/// `board`, following §4.5's eleven-step recipe. Computes and returns the
/// post-move check status of the side now to move; callers typically copy
/// that back into `mv.check_status` (the rewriter instead recomputes and
/// emits its own marker text, §4.13).
pub fn apply(board: &mut Board, mv: &Move) -> CheckStatus {
    let mover = board.to_move;

    if mv.class == MoveClass::NullMove {
        board.ep_square = None;
        board.halfmove_clock += 1;
        flip_side(board, mover);
        return post_move_check_status(board);
    }

    let from = mv.from_square().expect("apply requires a resolved move");
    let to = mv.to_square().expect("apply requires a resolved move");
    let moving_piece = board.piece_at(from);

    // Grab the castling rook's current file before Step 5 clears the
    // mover's castling rights (the king move below would otherwise erase
    // the very file Step 8 needs to relocate the rook).
    let castle_rook_from = mv.class.is_castle().then(|| {
        let side = if mv.class == MoveClass::KingsideCastle { CastleSide::Kingside } else { CastleSide::Queenside };
        let rook_file = board.castling.rook_file(mover, side).expect("castling already validated by resolve");
        Square::from_file_rank(rook_file, mover.back_rank() - 1)
    });

    // Step 1: lift the mover off its origin square.
    board.remove_piece(from);

    let is_capture = mv.class == MoveClass::EnPassantPawnMove || board.piece_at(to).is_playable();
    let is_pawn_move = mv.class.is_pawn_move();

    // Step 2: capture on the destination, clearing a castling right if the
    // captured piece was a rook sitting on its castling-home square.
    if mv.class != MoveClass::EnPassantPawnMove {
        let captured = board.piece_at(to);
        if captured.is_playable() {
            clear_castling_right_if_rook_home(board, captured, to);
            board.remove_piece(to);
        }
    }

    // Step 3: en-passant bystander removal.
    if mv.class == MoveClass::EnPassantPawnMove {
        let captured_sq = Square::from_file_rank(to.file(), from.rank());
        board.remove_piece(captured_sq);
    }
    board.ep_square = None;

    // Step 4: pawn double push sets the new ep square.
    if is_pawn_move && (to.rank() - from.rank()).abs() == 2 {
        let mid = Square::from_file_rank(from.file(), (from.rank() + to.rank()) / 2);
        board.ep_square = Some(mid);
    }

    // Step 5/6: king/rook moves clear castling rights.
    if moving_piece.piece == Piece::King {
        board.castling.clear_colour(mover);
    }
    clear_castling_right_if_rook_home(board, moving_piece, from);

    // Step 7: place the moving (or promoted) piece.
    let placed = if mv.class == MoveClass::PawnMoveWithPromotion {
        ColouredPiece::new(mover, mv.promoted_piece)
    } else {
        moving_piece
    };
    board.set_piece(to, placed);

    // Step 8: castling subsidiary rook move.
    if let Some(rook_from) = castle_rook_from {
        let side = if mv.class == MoveClass::KingsideCastle { CastleSide::Kingside } else { CastleSide::Queenside };
        let rank = mover.back_rank() - 1;
        let rook = board.remove_piece(rook_from);
        board.set_piece(Square::from_file_rank(side.rook_dest_file(), rank), rook);
    }

    // Step 9: halfmove clock.
    if is_capture || is_pawn_move {
        board.halfmove_clock = 0;
    } else {
        board.halfmove_clock += 1;
    }

    // Step 10: flip side to move, bump full-move counter after Black moves.
    flip_side(board, mover);

    // Step 11: check/checkmate status of the side now to move.
    post_move_check_status(board)
}

fn flip_side(board: &mut Board, mover: crate::pieces::Colour) {
    board.to_move = mover.opposite();
    if board.to_move == crate::pieces::Colour::White {
        board.move_number += 1;
    }
}

fn clear_castling_right_if_rook_home(board: &mut Board, piece: ColouredPiece, square: Square) {
    if piece.piece != Piece::Rook {
        return;
    }
    let rank = piece.colour.back_rank() - 1;
    if square.rank() != rank {
        return;
    }
    for side in [CastleSide::Kingside, CastleSide::Queenside] {
        if board.castling.rook_file(piece.colour, side) == Some(square.file()) {
            board.castling.clear_one(piece.colour, side);
        }
    }
}

fn post_move_check_status(board: &Board) -> CheckStatus {
    let to_move = board.to_move;
    if movegen::king_is_in_checkmate(board, to_move) {
        CheckStatus::Checkmate
    } else if movegen::king_is_in_check(board, to_move) {
        CheckStatus::Check
    } else {
        CheckStatus::NoCheck
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::decode_and_resolve;

    #[test]
    fn apply_e4_sets_ep_square() {
        let mut board = Board::starting_position();
        let mv = decode_and_resolve("e4", &board).unwrap();
        apply(&mut board, &mv);
        assert_eq!(board.ep_square, Square::from_algebraic("e3"));
        assert_eq!(board.halfmove_clock, 0);
    }

    #[test]
    fn apply_preserves_hash_invariant() {
        let mut board = Board::starting_position();
        for text in ["e4", "e5", "Nf3", "Nc6"] {
            let mv = decode_and_resolve(text, &board).unwrap();
            apply(&mut board, &mv);
            let hash_before = board.hash_value;
            let mut recomputed = board.clone();
            recomputed.recompute_hash();
            assert_eq!(hash_before, recomputed.hash_value);
        }
    }

    #[test]
    fn fools_mate_is_checkmate() {
        let mut board = Board::starting_position();
        for text in ["f3", "e5", "g4", "Qh4"] {
            let mv = decode_and_resolve(text, &board).unwrap();
            apply(&mut board, &mv);
        }
        assert!(movegen::king_is_in_checkmate(&board, crate::pieces::Colour::White));
    }
}
