//! Hash-table and FEN-pattern positional matching (§4.8 — component C10).

use std::collections::HashMap;

use crate::board::Board;
use crate::pieces::{Colour, Piece};
use crate::squares::Square;
use crate::zobrist::POLYGLOT_KEYS;

/// Full polyglot-shaped hash of `board`, including side-to-move, castling
/// rights, and en-passant file -- used for matching against externally
/// supplied hex hash values (`-H`, §6) and for filling the "polyglot" table.
pub fn polyglot_hash(board: &Board) -> u64 {
    let mut h = 0u64;
    for sq in Square::all() {
        let p = board.piece_at(sq);
        if p.is_playable() {
            h ^= POLYGLOT_KEYS.piece_code(p.colour, p.piece, sq);
        }
    }
    h ^= POLYGLOT_KEYS.castle_code(board.castling.polyglot_index());
    if let Some(ep) = board.ep_square {
        h ^= POLYGLOT_KEYS.ep_file_code(ep.file());
    }
    if board.to_move == Colour::White {
        h ^= POLYGLOT_KEYS.side_to_move_code();
    }
    h
}

/// A final-position hash table entry. `cumulative_hash` is deliberately
/// unused (always zero) for the non-polyglot table because path-independent
/// matching is wanted (§4.8) -- kept here only so the bucket shape mirrors
/// [`crate::matcher::eco::EcoEntry`] and [`crate::matcher::duplicates`].
#[derive(Clone, Debug)]
pub struct PositionEntry {
    pub final_hash: u64,
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default)]
#[must_use]
pub struct PositionalMatcher {
    /// Keyed by the internal placement-only hash, filled by replaying
    /// user-supplied variation lines from the initial (or a given FEN)
    /// position.
    non_polyglot: HashMap<u64, Vec<PositionEntry>>,
    /// Keyed by the polyglot hash, filled directly from user-supplied hex
    /// values.
    polyglot: HashMap<u64, Vec<PositionEntry>>,
    fen_patterns: Vec<FenPattern>,
}

impl PositionalMatcher {
    pub fn add_non_polyglot_line(&mut self, final_board: &Board, name: Option<String>) {
        self.non_polyglot.entry(final_board.hash_value).or_default().push(PositionEntry { final_hash: final_board.hash_value, name });
    }

    pub fn add_polyglot_hash(&mut self, hash: u64, name: Option<String>) {
        self.polyglot.entry(hash).or_default().push(PositionEntry { final_hash: hash, name });
    }

    pub fn add_fen_pattern(&mut self, pattern: FenPattern) {
        self.fen_patterns.push(pattern);
    }

    pub fn is_empty(&self) -> bool {
        self.non_polyglot.is_empty() && self.polyglot.is_empty() && self.fen_patterns.is_empty()
    }

    /// Consults all three matchers in order, short-circuiting on the first
    /// hit (§4.8).
    pub fn position_matches(&self, board: &Board) -> Option<PositionMatch> {
        if let Some(entries) = self.non_polyglot.get(&board.hash_value) {
            return Some(PositionMatch::NonPolyglot(entries.first().and_then(|e| e.name.clone())));
        }
        let pg = polyglot_hash(board);
        if let Some(entries) = self.polyglot.get(&pg) {
            return Some(PositionMatch::Polyglot(entries.first().and_then(|e| e.name.clone())));
        }
        for pattern in &self.fen_patterns {
            if pattern.matches(board) {
                return Some(PositionMatch::FenPattern(pattern.name.clone()));
            }
        }
        None
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PositionMatch {
    NonPolyglot(Option<String>),
    Polyglot(Option<String>),
    FenPattern(Option<String>),
}

/// A board-shape pattern with `?` wildcards over the 8x8 placement field
/// (§4.8, delegated "FEN-pattern matcher" subsystem). Each of the 64
/// characters is either a FEN piece letter, `.` for empty, or `?` for
/// anything.
#[derive(Clone, Debug)]
#[must_use]
pub struct FenPattern {
    pub name: Option<String>,
    cells: [char; 64],
}

impl FenPattern {
    /// Builds a pattern from a FEN placement field (the same `/`-separated,
    /// digit-run-length grammar as real FEN, plus `?` wildcards in place of
    /// any single square).
    pub fn parse(placement: &str, name: Option<String>) -> Option<FenPattern> {
        let mut cells = ['.'; 64];
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return None;
        }
        for (rank_from_top, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_from_top;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(n) = c.to_digit(10) {
                    file += n as usize;
                    continue;
                }
                if file >= 8 {
                    return None;
                }
                cells[rank * 8 + file] = c;
                file += 1;
            }
            if file != 8 {
                return None;
            }
        }
        Some(FenPattern { name, cells })
    }

    pub fn matches(&self, board: &Board) -> bool {
        for rank in 0..8 {
            for file in 0..8 {
                let want = self.cells[rank * 8 + file];
                if want == '?' {
                    continue;
                }
                let p = board.piece_at(Square::from_file_rank(file as i8, rank as i8));
                let got = if p.piece == Piece::Empty { '.' } else { fen_letter(p) };
                if got != want {
                    return false;
                }
            }
        }
        true
    }
}

fn fen_letter(p: crate::pieces::ColouredPiece) -> char {
    let c = match p.piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
        _ => '.',
    };
    if p.colour == Colour::White {
        c.to_ascii_uppercase()
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_polyglot_hits_on_final_position() {
        let mut matcher = PositionalMatcher::default();
        let board = Board::starting_position();
        matcher.add_non_polyglot_line(&board, Some("startpos".into()));
        assert!(matches!(matcher.position_matches(&board), Some(PositionMatch::NonPolyglot(_))));
    }

    #[test]
    fn fen_pattern_wildcards_match() {
        let pattern = FenPattern::parse("????k???/8/8/8/8/8/8/????K???", Some("bare kings".into())).unwrap();
        let mut board = Board::empty();
        board.set_piece(Square::from_file_rank(4, 7), crate::pieces::ColouredPiece::new(Colour::Black, Piece::King));
        board.set_piece(Square::from_file_rank(4, 0), crate::pieces::ColouredPiece::new(Colour::White, Piece::King));
        assert!(pattern.matches(&board));
    }
}
