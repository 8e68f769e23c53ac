//! The move record and the owned move/variation tree (§3 Data model).
//!
//! The source represents a game as a singly-linked list of moves, each
//! optionally carrying a list of sibling variations (themselves move lists).
//! That's a natural recursive algebraic data type in Rust (§9's design
//! note); we use owned `Vec<Move>` for "linked list of moves" and
//! `Vec<Variation>` for "list of sibling variations" rather than hand-rolled
//! pointers or a free-list.

use std::fmt;

use arrayvec::ArrayString;

use crate::pieces::Piece;

/// Bound on a move's rendered text, matching §3's "bounded string, ~20
/// chars" (the longest real dialect output is ELALG with a piece prefix and
/// an `ep` marker, still well under this).
pub const MOVE_TEXT_CAP: usize = 24;

pub type MoveText = ArrayString<MOVE_TEXT_CAP>;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[must_use]
pub enum MoveClass {
    PawnMove,
    PawnMoveWithPromotion,
    EnPassantPawnMove,
    PieceMove,
    KingsideCastle,
    QueensideCastle,
    NullMove,
    UnknownMove,
}

impl MoveClass {
    pub fn is_castle(self) -> bool {
        matches!(self, MoveClass::KingsideCastle | MoveClass::QueensideCastle)
    }

    pub fn is_pawn_move(self) -> bool {
        matches!(
            self,
            MoveClass::PawnMove | MoveClass::PawnMoveWithPromotion | MoveClass::EnPassantPawnMove
        )
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[must_use]
pub enum CheckStatus {
    #[default]
    NoCheck,
    Check,
    Checkmate,
}

/// A square coordinate that may still be unknown mid-decode (§3: "may be
/// zero/absent after decode and must be complete after resolve").
pub type Coord = Option<i8>;

/// A move in a game's move tree. Decode fills in as much of
/// `{from_file, from_rank, to_file, to_rank, piece_to_move, promoted_piece}`
/// as the SAN text permits; resolve (C5) completes the rest or fails.
#[derive(Clone, Debug)]
#[must_use]
pub struct Move {
    pub text: MoveText,
    pub class: MoveClass,
    pub piece_to_move: Piece,
    pub captured_piece: Piece,
    pub promoted_piece: Piece,
    pub from_file: Coord,
    pub from_rank: Coord,
    pub to_file: Coord,
    pub to_rank: Coord,
    pub check_status: CheckStatus,
    pub nags: Vec<String>,
    pub comment_list: Vec<String>,
    pub variants: Vec<Variation>,
    pub terminating_result: Option<String>,
    pub epd: Option<String>,
}

impl Move {
    pub fn new(text: &str, class: MoveClass) -> Self {
        Self {
            text: MoveText::from(text).unwrap_or_else(|_| MoveText::from(&text[..MOVE_TEXT_CAP.min(text.len())]).unwrap_or_default()),
            class,
            piece_to_move: Piece::Empty,
            captured_piece: Piece::Empty,
            promoted_piece: Piece::Empty,
            from_file: None,
            from_rank: None,
            to_file: None,
            to_rank: None,
            check_status: CheckStatus::NoCheck,
            nags: Vec::new(),
            comment_list: Vec::new(),
            variants: Vec::new(),
            terminating_result: None,
            epd: None,
        }
    }

    pub fn null(text: &str) -> Self {
        Self::new(text, MoveClass::NullMove)
    }

    /// True once decode/resolve has filled in every coordinate.
    pub fn is_fully_resolved(&self) -> bool {
        self.from_file.is_some() && self.from_rank.is_some() && self.to_file.is_some() && self.to_rank.is_some()
    }

    pub fn from_square(&self) -> Option<crate::squares::Square> {
        Some(crate::squares::Square::from_file_rank(self.from_file?, self.from_rank?))
    }

    pub fn to_square(&self) -> Option<crate::squares::Square> {
        Some(crate::squares::Square::from_file_rank(self.to_file?, self.to_rank?))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A sub-variation: a move list of its own, with optional prefix/suffix
/// comments (§3). Variations nest via each move's `variants` field, forming
/// a tree.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct Variation {
    pub prefix_comment: Option<String>,
    pub moves: Vec<Move>,
    pub suffix_comment: Option<String>,
}
