//! Castling rights, Chess960-aware (§3, §4.2).
//!
//! Each of the four rights is recorded as the *file of the castling rook*,
//! not hard-coded to a/h — this is what makes Chess960 castling fall out of
//! the same machinery as standard castling (§4.2). A right with no recorded
//! file has been lost.

use crate::error::{bail, ErrorKind, Result};
use crate::pieces::Colour;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[must_use]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    pub fn king_dest_file(self) -> i8 {
        match self {
            CastleSide::Kingside => 6,  // g-file
            CastleSide::Queenside => 2, // c-file
        }
    }

    pub fn rook_dest_file(self) -> i8 {
        match self {
            CastleSide::Kingside => 5,  // f-file
            CastleSide::Queenside => 3, // d-file
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[must_use]
pub struct CastlingRights {
    w_king_rook: Option<i8>,
    w_queen_rook: Option<i8>,
    b_king_rook: Option<i8>,
    b_queen_rook: Option<i8>,
}

impl CastlingRights {
    pub fn rook_file(self, colour: Colour, side: CastleSide) -> Option<i8> {
        match (colour, side) {
            (Colour::White, CastleSide::Kingside) => self.w_king_rook,
            (Colour::White, CastleSide::Queenside) => self.w_queen_rook,
            (Colour::Black, CastleSide::Kingside) => self.b_king_rook,
            (Colour::Black, CastleSide::Queenside) => self.b_queen_rook,
        }
    }

    fn rook_file_mut(&mut self, colour: Colour, side: CastleSide) -> &mut Option<i8> {
        match (colour, side) {
            (Colour::White, CastleSide::Kingside) => &mut self.w_king_rook,
            (Colour::White, CastleSide::Queenside) => &mut self.w_queen_rook,
            (Colour::Black, CastleSide::Kingside) => &mut self.b_king_rook,
            (Colour::Black, CastleSide::Queenside) => &mut self.b_queen_rook,
        }
    }

    pub fn can_castle(self, colour: Colour, side: CastleSide) -> bool {
        self.rook_file(colour, side).is_some()
    }

    pub fn set(&mut self, colour: Colour, side: CastleSide, rook_file: i8) {
        *self.rook_file_mut(colour, side) = Some(rook_file);
    }

    pub fn clear_one(&mut self, colour: Colour, side: CastleSide) {
        *self.rook_file_mut(colour, side) = None;
    }

    pub fn clear_colour(&mut self, colour: Colour) {
        self.clear_one(colour, CastleSide::Kingside);
        self.clear_one(colour, CastleSide::Queenside);
    }

    /// Bit index into the polyglot castle-key table: 0=white K, 1=white Q,
    /// 2=black K, 3=black Q.
    pub fn polyglot_index(self) -> usize {
        let mut idx = 0;
        if self.can_castle(Colour::White, CastleSide::Kingside) {
            idx |= 1 << 0;
        }
        if self.can_castle(Colour::White, CastleSide::Queenside) {
            idx |= 1 << 1;
        }
        if self.can_castle(Colour::Black, CastleSide::Kingside) {
            idx |= 1 << 2;
        }
        if self.can_castle(Colour::Black, CastleSide::Queenside) {
            idx |= 1 << 3;
        }
        idx
    }

    /// Parses a FEN/XFEN castling field. Accepts legacy `KQkq` (resolved by
    /// scanning for the outermost rook on the back rank, per §4.12) as well
    /// as Chess960 `A-Ha-h` letters that name the rook file directly.
    pub fn parse(field: &str, king_file: [i8; 2], rook_on: impl Fn(Colour, i8) -> bool) -> Result<Self> {
        let mut rights = CastlingRights::default();
        if field == "-" {
            return Ok(rights);
        }
        if field.is_empty() {
            bail!(ErrorKind::Fen, "empty castling rights field");
        }
        for c in field.chars() {
            let colour = if c.is_ascii_uppercase() { Colour::White } else { Colour::Black };
            let kf = king_file[colour_index(colour)];
            match c.to_ascii_lowercase() {
                'k' => {
                    let file = find_outermost(kf, 8, &rook_on, colour, true)
                        .ok_or_else(|| crate::error::Error::from((ErrorKind::Fen, format!("no kingside rook for {colour}"))))?;
                    rights.set(colour, CastleSide::Kingside, file);
                }
                'q' => {
                    let file = find_outermost(kf, 8, &rook_on, colour, false)
                        .ok_or_else(|| crate::error::Error::from((ErrorKind::Fen, format!("no queenside rook for {colour}"))))?;
                    rights.set(colour, CastleSide::Queenside, file);
                }
                x @ 'a'..='h' => {
                    let file = x as i8 - 'a' as i8;
                    let side = if file < kf { CastleSide::Queenside } else { CastleSide::Kingside };
                    rights.set(colour, side, file);
                }
                _ => bail!(ErrorKind::Fen, "invalid castling rights character '{c}'"),
            }
        }
        Ok(rights)
    }
}

fn colour_index(c: Colour) -> usize {
    match c {
        Colour::White => 0,
        Colour::Black => 1,
    }
}

/// Finds the outermost rook file on `colour`'s back rank relative to the
/// king: the highest file strictly above `king_file` for kingside, the
/// lowest file strictly below it for queenside.
fn find_outermost(king_file: i8, board_files: i8, rook_on: &impl Fn(Colour, i8) -> bool, colour: Colour, kingside: bool) -> Option<i8> {
    if kingside {
        (king_file + 1..board_files).rev().find(|&f| rook_on(colour, f)).or_else(|| (king_file + 1..board_files).find(|&f| rook_on(colour, f)))
    } else {
        (0..king_file).find(|&f| rook_on(colour, f))
    }
}
