//! Textual variation matching over move text, straight and permutation
//! modes (§4.7 — component C9).

use crate::mv::Move;
use crate::pieces::Colour;

/// One slot in a prepared variation: a pipe-separated set of literal SAN
/// alternatives, the `*` wildcard, or a `!`-prefixed disallowed move (§4.7).
#[derive(Clone, Debug, Eq, PartialEq)]
#[must_use]
pub enum VariantToken {
    Literal(Vec<String>),
    AnyMove,
    Disallowed(Vec<String>),
}

impl VariantToken {
    /// Parses one whitespace-delimited token from a variation file line,
    /// e.g. `*`, `!Nf3`, `c5|c6`.
    pub fn parse(token: &str) -> VariantToken {
        if token == "*" {
            return VariantToken::AnyMove;
        }
        if let Some(rest) = token.strip_prefix('!') {
            return VariantToken::Disallowed(rest.split('|').map(str::to_string).collect());
        }
        VariantToken::Literal(token.split('|').map(str::to_string).collect())
    }
}

#[derive(Clone, Debug, Default)]
#[must_use]
pub struct Variation {
    pub tokens: Vec<VariantToken>,
    pub name: Option<String>,
}

impl Variation {
    pub fn parse(line: &str) -> Variation {
        Variation { tokens: line.split_whitespace().map(VariantToken::parse).collect(), name: None }
    }
}

/// A literal alternative matches a game move when it appears as a substring
/// bounded by non-move characters on both sides (§4.7): `Nf3` matches
/// `Nf3+` but `c6` must not match inside `Nc6`.
fn literal_matches(alt: &str, game_move: &str) -> bool {
    let Some(start) = game_move.find(alt) else { return false };
    let end = start + alt.len();
    let before_ok = start == 0 || !is_move_char(game_move.as_bytes()[start - 1] as char);
    let after_ok = end == game_move.len() || !is_move_char(game_move.as_bytes()[end] as char);
    before_ok && after_ok
}

fn is_move_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

fn token_matches(token: &VariantToken, game_move: &str) -> bool {
    match token {
        VariantToken::AnyMove => true,
        VariantToken::Literal(alts) => alts.iter().any(|a| literal_matches(a, game_move)),
        VariantToken::Disallowed(alts) => !alts.iter().any(|a| literal_matches(a, game_move)),
    }
}

fn token_is_disallowed(token: &VariantToken) -> bool {
    matches!(token, VariantToken::Disallowed(_))
}

/// Straight matching (§4.7): align tokens one-for-one with the game's
/// moves, in order. The game must be at least as long as the variation.
pub fn matches_straight(variation: &Variation, game_moves: &[Move]) -> bool {
    if game_moves.len() < variation.tokens.len() {
        return false;
    }
    variation.tokens.iter().zip(game_moves.iter()).all(|(tok, mv)| token_matches(tok, &mv.text))
}

/// Permutation matching (§4.7, the default): tokens for the same
/// colour-to-move slot may match in any order, in two stages.
pub fn matches_permutation(variation: &Variation, game_moves: &[Move]) -> bool {
    let length = variation.tokens.len();
    if game_moves.len() < length {
        return false;
    }
    let prefix = &game_moves[..length];

    // Stage 1: any disallowed-move occurrence anywhere in the correctly
    // coloured slot within the prefix fails the whole match.
    for (idx, tok) in variation.tokens.iter().enumerate() {
        let VariantToken::Disallowed(alts) = tok else { continue };
        for (mv_idx, mv) in prefix.iter().enumerate() {
            if mv_idx % 2 != idx % 2 {
                continue;
            }
            if alts.iter().any(|a| literal_matches(a, &mv.text)) {
                return false;
            }
        }
    }

    // Stage 2: disallowed tokens convert to wildcards; greedily match
    // remaining literal tokens per colour slot, falling back to consuming a
    // wildcard of the matching colour.
    let mut consumed = vec![false; variation.tokens.len()];
    let mut wildcard_pool = [0usize; 2];
    for (idx, tok) in variation.tokens.iter().enumerate() {
        if matches!(tok, VariantToken::AnyMove) || token_is_disallowed(tok) {
            wildcard_pool[idx % 2] += 1;
            consumed[idx] = true; // wildcards/disallowed are "pre-matched" slots
        }
    }

    for (mv_idx, mv) in prefix.iter().enumerate() {
        let colour_slot = mv_idx % 2;
        let found_literal = variation.tokens.iter().enumerate().find(|(idx, tok)| {
            *idx % 2 == colour_slot && !consumed[*idx] && matches!(tok, VariantToken::Literal(alts) if alts.iter().any(|a| literal_matches(a, &mv.text)))
        });
        if let Some((idx, _)) = found_literal {
            consumed[idx] = true;
            continue;
        }
        if wildcard_pool[colour_slot] > 0 {
            wildcard_pool[colour_slot] -= 1;
            continue;
        }
        return false;
    }
    consumed.iter().all(|&c| c)
}

/// Assumed game colour-to-move alternation: index 0 is White's slot, index 1
/// Black's -- matching the variation file convention that "odd/even tokens
/// bind to Black/White respectively" relative to whichever colour made the
/// first recorded move (§4.7). Callers that start matching mid-game should
/// slice `game_moves` so index 0 is the first token's colour.
pub fn colour_slot(index: usize) -> Colour {
    if index % 2 == 0 {
        Colour::White
    } else {
        Colour::Black
    }
}

/// Runs the configured matching mode (permutation by default, §4.7) across
/// the game up to `max_depth` full moves, trying every starting offset so a
/// variation can match anywhere in the line, not just from move 1.
pub fn variation_matches(variation: &Variation, game_moves: &[Move], straight: bool, max_depth: u32) -> bool {
    let ply_limit = (max_depth as usize) * 2;
    let bound = game_moves.len().min(ply_limit.max(variation.tokens.len()));
    for start in 0..=bound.saturating_sub(variation.tokens.len()) {
        let window = &game_moves[start..];
        let hit = if straight { matches_straight(variation, window) } else { matches_permutation(variation, window) };
        if hit {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;

    fn moves(texts: &[&str]) -> Vec<Move> {
        texts.iter().map(|t| decode(t)).collect()
    }

    #[test]
    fn s5_permutation_fails_on_black_mismatch() {
        let variation = Variation::parse("* c5 Nf3 Nc6");
        let game = moves(&["e4", "c5", "Nf3", "d6"]);
        assert!(!matches_permutation(&variation, &game));
        assert!(!matches_straight(&variation, &game));
    }

    #[test]
    fn s5_permutation_succeeds_on_transposition() {
        let variation = Variation::parse("* c5 Nf3 Nc6");
        let game = moves(&["d4", "c5", "Nf3", "Nc6"]);
        assert!(matches_permutation(&variation, &game));
        assert!(matches_straight(&variation, &game));
    }

    #[test]
    fn s6_disallowed_move_succeeds_when_absent() {
        let variation = Variation::parse("e4 c5 !Nf3");
        let game = moves(&["e4", "c5", "Nc3"]);
        assert!(matches_permutation(&variation, &game));
    }

    #[test]
    fn s6_disallowed_move_fails_when_present() {
        let variation = Variation::parse("e4 c5 !Nf3");
        let game = moves(&["e4", "c5", "Nf3", "d6"]);
        assert!(!matches_permutation(&variation, &game));
    }

    #[test]
    fn literal_match_is_bounded_by_non_move_chars() {
        assert!(literal_matches("Nf3", "Nf3+"));
        assert!(!literal_matches("c6", "Nc6"));
    }
}
