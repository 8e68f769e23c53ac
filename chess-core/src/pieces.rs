//! Colour and piece types (§3 Data model).

use std::fmt;
use strum_macros::EnumIter;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, EnumIter)]
#[must_use]
pub enum Colour {
    White,
    Black,
}

impl Colour {
    pub fn opposite(self) -> Colour {
        match self {
            Colour::White => Colour::Black,
            Colour::Black => Colour::White,
        }
    }

    /// Pawn push/rank direction: `+1` for White, `-1` for Black (§4.2).
    pub fn pawn_direction(self) -> i8 {
        match self {
            Colour::White => 1,
            Colour::Black => -1,
        }
    }

    /// One-based back rank (1 or 8) where the king/rooks start and where
    /// castling happens.
    pub fn back_rank(self) -> i8 {
        match self {
            Colour::White => 1,
            Colour::Black => 8,
        }
    }

    /// Zero-based rank index (§3's interior-index convention) where this
    /// colour's pawns start, i.e. where a double push is legal from.
    pub fn pawn_start_rank_idx(self) -> i8 {
        match self {
            Colour::White => 1,
            Colour::Black => 6,
        }
    }

    /// One-based promotion rank (8 or 1).
    pub fn promotion_rank(self) -> i8 {
        match self {
            Colour::White => 8,
            Colour::Black => 1,
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Colour::White => "white",
            Colour::Black => "black",
        })
    }
}

/// A piece kind, including the two sentinels used by the mailbox board: the
/// playable-but-unoccupied `Empty` and the border marker `Off` (§3).
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash, EnumIter)]
#[must_use]
pub enum Piece {
    #[default]
    Empty,
    Off,
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Piece {
    pub fn pieces() -> impl Iterator<Item = Piece> {
        [
            Piece::Pawn,
            Piece::Knight,
            Piece::Bishop,
            Piece::Rook,
            Piece::Queen,
            Piece::King,
        ]
        .into_iter()
    }

    pub fn is_playable(self) -> bool {
        !matches!(self, Piece::Empty | Piece::Off)
    }

    /// English SAN letter, empty for pawns (a pawn move never carries a
    /// piece prefix).
    pub fn to_san_letter(self) -> &'static str {
        match self {
            Piece::Knight => "N",
            Piece::Bishop => "B",
            Piece::Rook => "R",
            Piece::Queen => "Q",
            Piece::King => "K",
            _ => "",
        }
    }

    /// Shannon material value used by the commentary heuristic in the
    /// rewriter (§4.13): P=1,N=B=3,R=5,Q=9.
    pub fn shannon_value(self) -> f32 {
        match self {
            Piece::Pawn => 1.0,
            Piece::Knight | Piece::Bishop => 3.0,
            Piece::Rook => 5.0,
            Piece::Queen => 9.0,
            _ => 0.0,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Piece::Empty => "empty",
            Piece::Off => "off-board",
            Piece::Pawn => "pawn",
            Piece::Knight => "knight",
            Piece::Bishop => "bishop",
            Piece::Rook => "rook",
            Piece::Queen => "queen",
            Piece::King => "king",
        })
    }
}

/// A piece together with its colour; `Empty`/`Off` carry an arbitrary colour
/// that must never be inspected (mirrors the sentinel convention of §3).
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
#[must_use]
pub struct ColouredPiece {
    pub colour: Colour,
    pub piece: Piece,
}

impl ColouredPiece {
    pub const EMPTY: ColouredPiece = ColouredPiece { colour: Colour::White, piece: Piece::Empty };
    pub const OFF: ColouredPiece = ColouredPiece { colour: Colour::White, piece: Piece::Off };

    pub fn new(colour: Colour, piece: Piece) -> Self {
        Self { colour, piece }
    }

    pub fn is_playable(self) -> bool {
        self.piece.is_playable()
    }

    pub fn is_colour(self, colour: Colour) -> bool {
        self.is_playable() && self.colour == colour
    }
}

impl fmt::Display for ColouredPiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match (self.colour, self.piece) {
            (_, Piece::Empty) => '.',
            (_, Piece::Off) => ' ',
            (Colour::White, Piece::Pawn) => 'P',
            (Colour::White, Piece::Knight) => 'N',
            (Colour::White, Piece::Bishop) => 'B',
            (Colour::White, Piece::Rook) => 'R',
            (Colour::White, Piece::Queen) => 'Q',
            (Colour::White, Piece::King) => 'K',
            (Colour::Black, Piece::Pawn) => 'p',
            (Colour::Black, Piece::Knight) => 'n',
            (Colour::Black, Piece::Bishop) => 'b',
            (Colour::Black, Piece::Rook) => 'r',
            (Colour::Black, Piece::Queen) => 'q',
            (Colour::Black, Piece::King) => 'k',
        };
        f.write_fmt(format_args!("{c}"))
    }
}
