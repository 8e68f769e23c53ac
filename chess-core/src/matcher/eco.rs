//! ECO opening classification via a depth-bounded bucketed hash table
//! (§4.9 — component C11).

use std::collections::HashMap;

use crate::game::EcoTag;

/// §4.6/§4.9's "ECO half-move limit": a candidate only counts if the game
/// has played within this many plies of the line's own length.
pub const ECO_HALF_MOVE_LIMIT: u32 = 6;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EcoEntry {
    pub required_hash: u64,
    pub cumulative_hash: u64,
    pub half_moves: u32,
    pub eco: String,
    pub opening: String,
    pub variation: String,
    pub sub_variation: String,
}

/// Bucketed ECO table, keyed by `required_hash % bucket_count` (§3/§4.9).
/// Collisions -- two entries sharing the same `(required_hash,
/// cumulative_hash, half_moves)` triple -- are logged and the later entry
/// dropped, per §4.9/§7.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct EcoTable {
    buckets: HashMap<u64, Vec<EcoEntry>>,
    /// `max(line_half_moves) + 6` across every loaded line, per §4.9; tables
    /// beyond this depth are skipped entirely during matching.
    pub max_depth: u32,
    pub collisions: u32,
}

impl EcoTable {
    /// Records one parsed ECO line's final position. Returns `false` (and
    /// bumps `collisions`) if an identical `(required_hash, cumulative_hash,
    /// half_moves)` key triple is already present.
    pub fn save_eco_details(&mut self, entry: EcoEntry) -> bool {
        let bucket = self.buckets.entry(entry.required_hash).or_default();
        if bucket.iter().any(|e| e.required_hash == entry.required_hash && e.cumulative_hash == entry.cumulative_hash && e.half_moves == entry.half_moves) {
            self.collisions += 1;
            return false;
        }
        self.max_depth = self.max_depth.max(entry.half_moves + ECO_HALF_MOVE_LIMIT);
        bucket.push(entry);
        true
    }

    /// Looks up the best entry for `(hash, cumulative_hash, half_moves)`
    /// (§4.9): exact cumulative-hash and exact-depth matches are preferred;
    /// among non-exact matches within the half-move window, the latest
    /// loaded entry wins (ties prefer the later one, per §4.6/§9's
    /// "processing order" resolution of the tie-break Open Question).
    pub fn eco_matches(&self, hash: u64, cumulative_hash: u64, half_moves: u32) -> Option<&EcoEntry> {
        if half_moves > self.max_depth {
            return None;
        }
        let bucket = self.buckets.get(&hash)?;
        let mut best: Option<&EcoEntry> = None;
        for entry in bucket {
            if entry.required_hash != hash {
                continue;
            }
            if half_moves.abs_diff(entry.half_moves) > ECO_HALF_MOVE_LIMIT {
                continue;
            }
            let candidate_is_exact = entry.cumulative_hash == cumulative_hash && entry.half_moves == half_moves;
            let best_is_exact = best.is_some_and(|b| b.cumulative_hash == cumulative_hash && b.half_moves == half_moves);
            best = match best {
                None => Some(entry),
                Some(_) if candidate_is_exact && !best_is_exact => Some(entry),
                Some(_) if candidate_is_exact == best_is_exact => Some(entry), // later entry wins ties
                Some(b) => Some(b),
            };
        }
        best
    }
}

pub fn entry_to_tag(entry: &EcoEntry) -> EcoTag {
    EcoTag { eco: entry.eco.clone(), opening: entry.opening.clone(), variation: entry.variation.clone(), sub_variation: entry.sub_variation.clone() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hash: u64, cum: u64, half_moves: u32, eco: &str) -> EcoEntry {
        EcoEntry { required_hash: hash, cumulative_hash: cum, half_moves, eco: eco.into(), opening: String::new(), variation: String::new(), sub_variation: String::new() }
    }

    #[test]
    fn s8_matches_within_window_rejects_far_transposition() {
        let mut table = EcoTable::default();
        table.save_eco_details(entry(42, 100, 6, "C60"));
        assert!(table.eco_matches(42, 100, 6).is_some());
        assert!(table.eco_matches(42, 999, 20).is_none());
    }

    #[test]
    fn collisions_are_counted_and_dropped() {
        let mut table = EcoTable::default();
        assert!(table.save_eco_details(entry(1, 2, 3, "A00")));
        assert!(!table.save_eco_details(entry(1, 2, 3, "A01")));
        assert_eq!(table.collisions, 1);
    }
}
