//! The process-wide matching context (§9's "no global mutable state" design
//! note): every table the matchers (C9-C13) consult is bundled into one
//! `Engine`, built once by the driver and threaded through by reference,
//! rather than scattered across `static mut`s or lazily-initialised globals.

use crate::matcher::duplicates::DuplicateTable;
use crate::matcher::eco::EcoTable;
use crate::matcher::endings::EndingSpec;
use crate::matcher::positional::PositionalMatcher;
use crate::matcher::textual::Variation;

/// Everything a single PGN-processing run needs loaded before it can start
/// walking games: opening book, duplicate log, position/variation lists, and
/// ending specifications. None of this is per-game state -- that lives on
/// [`crate::game::Game`] and the per-ending [`crate::matcher::endings::EndingsTracker`]
/// the driver keeps alongside each game in flight.
#[derive(Default)]
#[must_use]
pub struct Engine {
    pub eco_table: EcoTable,
    pub duplicates: DuplicateTable,
    pub positional: PositionalMatcher,
    pub variations: Vec<Variation>,
    pub endings: Vec<EndingSpec>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once every optional table is empty -- the driver can skip the
    /// whole matching pass for a run that only wants, say, rewriting.
    pub fn has_no_matchers(&self) -> bool {
        self.eco_table.max_depth == 0 && self.duplicates.is_empty() && self.positional.is_empty() && self.variations.is_empty() && self.endings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_engine_has_no_matchers() {
        assert!(Engine::new().has_no_matchers());
    }

    #[test]
    fn loading_a_variation_disables_the_fast_path() {
        let mut engine = Engine::new();
        engine.variations.push(Variation::parse("e4 e5"));
        assert!(!engine.has_no_matchers());
    }
}
