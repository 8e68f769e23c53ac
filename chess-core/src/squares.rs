//! The 12×12 mailbox index space (§3, §4.1).
//!
//! Files and ranks are zero-based internally (`0..=7` for a..h / 1..8) but
//! the mailbox index they're stored at is shifted by two in each dimension
//! so that a two-square sentinel border surrounds the playable area. Any
//! piece-offset (knight, ray direction, ...) can therefore be added directly
//! to a mailbox index without a bounds check: walking off the edge of the
//! 8x8 area lands on a border cell holding [`Piece::Off`](crate::pieces::Piece::Off)
//! rather than wrapping into an unrelated rank, and two rows/columns of
//! border are enough to absorb every piece's maximum single-step offset.

use std::fmt;

/// Row/column stride of the mailbox.
pub const BOARD_WIDTH: i16 = 12;
/// Total number of mailbox cells, border included.
pub const BOARD_CELLS: usize = (BOARD_WIDTH * BOARD_WIDTH) as usize;
/// Offset added to a zero-based file/rank to reach its mailbox column/row.
pub const BORDER: i16 = 2;

/// A mailbox cell index, `0..BOARD_CELLS`. May refer to a border cell.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[must_use]
pub struct Square(pub i16);

impl Square {
    /// Builds a square from zero-based file/rank (`0..=7`, a..h / 1..8).
    /// Panics if either coordinate is out of the playable range; callers
    /// dealing with possibly out-of-range candidates should use
    /// [`Square::try_from_offset`] instead.
    pub fn from_file_rank(file: i8, rank: i8) -> Self {
        debug_assert!((0..8).contains(&file) && (0..8).contains(&rank));
        Self(Self::mailbox_index(file as i16, rank as i16))
    }

    fn mailbox_index(file: i16, rank: i16) -> i16 {
        (rank + BORDER) * BOARD_WIDTH + (file + BORDER)
    }

    /// Builds a square `(dfile, drank)` away from `self`, returning it
    /// regardless of whether it lands on the border (the caller is
    /// expected to check [`Square::is_on_board`] or inspect the board
    /// contents, which is `Off` on the border).
    pub fn offset(self, dfile: i16, drank: i16) -> Square {
        Square(self.0 + drank * BOARD_WIDTH + dfile)
    }

    pub fn is_on_board(self) -> bool {
        (0..BOARD_CELLS as i16).contains(&self.0) && {
            let (file, rank) = (self.file_raw(), self.rank_raw());
            (0..8).contains(&file) && (0..8).contains(&rank)
        }
    }

    fn file_raw(self) -> i16 {
        self.0 % BOARD_WIDTH - BORDER
    }

    fn rank_raw(self) -> i16 {
        self.0 / BOARD_WIDTH - BORDER
    }

    /// Zero-based file, `0..=7` for a..h. Only meaningful when
    /// [`Square::is_on_board`].
    pub fn file(self) -> i8 {
        self.file_raw() as i8
    }

    /// Zero-based rank, `0..=7` for ranks 1..8. Only meaningful when
    /// [`Square::is_on_board`].
    pub fn rank(self) -> i8 {
        self.rank_raw() as i8
    }

    pub fn file_char(self) -> char {
        (b'a' + self.file() as u8) as char
    }

    pub fn rank_char(self) -> char {
        (b'1' + self.rank() as u8) as char
    }

    pub fn from_char_file(c: char) -> Option<i8> {
        if ('a'..='h').contains(&c) {
            Some(c as i8 - 'a' as i8)
        } else {
            None
        }
    }

    pub fn from_char_rank(c: char) -> Option<i8> {
        if ('1'..='8').contains(&c) {
            Some(c as i8 - '1' as i8)
        } else {
            None
        }
    }

    pub fn from_algebraic(s: &str) -> Option<Square> {
        let mut chars = s.chars();
        let file = Self::from_char_file(chars.next()?)?;
        let rank = Self::from_char_rank(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Square::from_file_rank(file, rank))
    }

    /// All 64 playable squares, a-file to h-file within each rank, rank 1 to
    /// rank 8.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8).flat_map(|rank| (0..8).map(move |file| Square::from_file_rank(file, rank)))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}
