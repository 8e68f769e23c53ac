//! A parsed game: tags, the main move line, and the running state the
//! matchers (C8-C13) accumulate while it's played (§3 Data model).

use std::collections::BTreeMap;

use crate::mv::Move;

/// The closed set of tags the source gives dedicated storage to (the "Seven
/// Tag Roster" plus ECO, which the classifier writes back); anything else
/// lands in `extra_tags`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Ord, PartialOrd)]
#[must_use]
pub enum KnownTag {
    Event,
    Site,
    Date,
    Round,
    White,
    Black,
    Result,
    Eco,
    Opening,
    Variation,
    SubVariation,
    FenSetup,
    SetUp,
}

impl KnownTag {
    pub fn name(self) -> &'static str {
        match self {
            KnownTag::Event => "Event",
            KnownTag::Site => "Site",
            KnownTag::Date => "Date",
            KnownTag::Round => "Round",
            KnownTag::White => "White",
            KnownTag::Black => "Black",
            KnownTag::Result => "Result",
            KnownTag::Eco => "ECO",
            KnownTag::Opening => "Opening",
            KnownTag::Variation => "Variation",
            KnownTag::SubVariation => "Sub-Variation",
            KnownTag::FenSetup => "FEN",
            KnownTag::SetUp => "SetUp",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "Event" => KnownTag::Event,
            "Site" => KnownTag::Site,
            "Date" => KnownTag::Date,
            "Round" => KnownTag::Round,
            "White" => KnownTag::White,
            "Black" => KnownTag::Black,
            "Result" => KnownTag::Result,
            "ECO" => KnownTag::Eco,
            "Opening" => KnownTag::Opening,
            "Variation" => KnownTag::Variation,
            "Sub-Variation" => KnownTag::SubVariation,
            "FEN" => KnownTag::FenSetup,
            "SetUp" => KnownTag::SetUp,
            _ => return None,
        })
    }
}

/// A tag table split into the known roster (closed enumeration, §3) plus an
/// open-ended map for anything else the PGN file carries.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct TagTable {
    known: BTreeMap<&'static str, String>,
    pub extra: BTreeMap<String, String>,
}

impl TagTable {
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        if let Some(tag) = KnownTag::from_name(name) {
            self.known.insert(tag.name(), value.into());
        } else {
            self.extra.insert(name.to_string(), value.into());
        }
    }

    pub fn get(&self, tag: KnownTag) -> Option<&str> {
        self.known.get(tag.name()).map(String::as_str)
    }

    pub fn get_named(&self, name: &str) -> Option<&str> {
        if let Some(tag) = KnownTag::from_name(name) {
            self.get(tag)
        } else {
            self.extra.get(name).map(String::as_str)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.known.iter().map(|(k, v)| (*k, v.as_str())).chain(self.extra.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

/// Why resolve/decode stopped a game early (§7); recorded so callers can
/// decide whether to discard, keep-broken, or collapse-and-rewrite it.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[must_use]
pub struct ErrorPly {
    pub ply: u32,
    pub kind: crate::error::ErrorKind,
}

/// A fully parsed PGN game, plus the bookkeeping the matching/classification
/// layer (C8-C13) accumulates while it is played through (§3).
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct Game {
    pub tags: TagTable,
    pub moves: Vec<Move>,
    pub prefix_comment: Option<String>,
    /// The board hash after the final played move (C10's "final_hash").
    pub final_hash_value: u64,
    /// Running sum (wrapping addition, §4.6) of every ply's board hash;
    /// deliberately path-sensitive, unlike `final_hash_value` alone.
    pub cumulative_hash_value: u64,
    /// Board hash snapshotted at `fuzzy_match_depth` plies (0 = "snapshot
    /// final"), used for fuzzy duplicate detection (C12).
    pub fuzzy_duplicate_hash: u64,
    /// Per-position occurrence counts this game has reached so far (C15),
    /// keyed by the (intentionally side-to-move-blind, §9) internal hash.
    pub position_counts: std::collections::HashMap<u64, u32>,
    pub moves_ok: bool,
    pub moves_checked: bool,
    pub error_ply: Option<ErrorPly>,
    /// Number of plies actually played (half-moves), used by the ECO
    /// classifier's depth window and the textual matcher's depth bound.
    pub half_moves_played: u32,
    /// Set once a positional/textual/ECO/endings/duplicate matcher fires;
    /// the driver consults this to decide retention.
    pub eco_tag: Option<EcoTag>,
    pub reached_fifty_move_rule: bool,
    pub reached_repetition: bool,
    /// True the instant a null move is played in the *main line* — marks
    /// the game unsound for matching purposes (§4.6).
    pub has_main_line_null_move: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[must_use]
pub struct EcoTag {
    pub eco: String,
    pub opening: String,
    pub variation: String,
    pub sub_variation: String,
}

impl Game {
    pub fn new() -> Self {
        Self { moves_ok: true, ..Default::default() }
    }
}
