//! Wires `pgn-reader` (§1's "external lexical/grammar layer") into
//! `chess-core`'s [`Game`]/[`Move`] tree.
//!
//! Decode (C4) is pure lexical, so the visitor can call
//! `chess_core::decode::decode` directly on each `SanPlus`'s rendered text
//! without touching a board; resolution/application happen later, ply by
//! ply, in [`crate::player`].

use chess_core::game::{Game, KnownTag};
use chess_core::mv::{Move, Variation};
use pgn_reader::{Nag, Outcome, RawComment, RawHeader, SanPlus, Skip, Visitor};

/// Builds one [`Game`] from a single PGN game's worth of callbacks.
///
/// `stack`/`prefix_stack` mirror the nesting of recursive annotation
/// variations: `stack[0]` is the main line, `stack[n]` (n>0) is whichever
/// variation is currently open. A `(`/`)` pair in the source text is a
/// `begin_variation`/`end_variation` pair; per PGN's RAV semantics the
/// variation is an alternative for the move that was *just* appended to the
/// enclosing list, so `end_variation` attaches the finished list onto that
/// move's `variants`.
pub struct GameBuilder {
    game: Game,
    stack: Vec<Vec<Move>>,
    prefix_stack: Vec<Option<String>>,
    just_closed_variation: bool,
}

impl Default for GameBuilder {
    fn default() -> Self {
        Self { game: Game::new(), stack: vec![Vec::new()], prefix_stack: vec![None], just_closed_variation: false }
    }
}

impl GameBuilder {
    fn current_list(&mut self) -> &mut Vec<Move> {
        self.stack.last_mut().expect("stack always has the main line")
    }

    fn attach_comment(&mut self, text: String) {
        if self.just_closed_variation {
            self.just_closed_variation = false;
            // The comment right after a closing paren is the variation's
            // suffix comment, not a fresh comment on the move it replaced.
            if let Some(mv) = self.stack.last_mut().and_then(|l| l.last_mut()) {
                if let Some(variation) = mv.variants.last_mut() {
                    variation.suffix_comment = Some(match variation.suffix_comment.take() {
                        Some(existing) => format!("{existing} {text}"),
                        None => text,
                    });
                    return;
                }
            }
        }
        if let Some(mv) = self.current_list().last_mut() {
            mv.comment_list.push(text);
        } else {
            let depth = self.prefix_stack.len() - 1;
            let slot = &mut self.prefix_stack[depth];
            *slot = Some(match slot.take() {
                Some(existing) => format!("{existing} {text}"),
                None => text,
            });
        }
    }
}

impl Visitor for GameBuilder {
    type Result = Game;

    fn begin_game(&mut self) {
        self.game = Game::new();
        self.stack = vec![Vec::new()];
        self.prefix_stack = vec![None];
        self.just_closed_variation = false;
    }

    fn header(&mut self, key: &[u8], value: RawHeader<'_>) {
        let key = String::from_utf8_lossy(key).into_owned();
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        self.game.tags.set(&key, value);
    }

    fn end_headers(&mut self) -> Skip {
        Skip(false)
    }

    fn san(&mut self, san_plus: SanPlus) {
        self.just_closed_variation = false;
        let mv = chess_core::decode::decode(&san_plus.to_string());
        self.current_list().push(mv);
    }

    fn begin_variation(&mut self) -> Skip {
        self.just_closed_variation = false;
        self.stack.push(Vec::new());
        self.prefix_stack.push(None);
        Skip(false)
    }

    fn end_variation(&mut self) {
        let moves = self.stack.pop().expect("begin_variation always pushes");
        let prefix_comment = self.prefix_stack.pop().expect("begin_variation always pushes");
        let variation = Variation { prefix_comment, moves, suffix_comment: None };
        if let Some(mv) = self.current_list().last_mut() {
            mv.variants.push(variation);
        }
        self.just_closed_variation = true;
    }

    fn comment(&mut self, comment: RawComment<'_>) {
        let text = String::from_utf8_lossy(comment.as_bytes()).trim().to_string();
        if !text.is_empty() {
            self.attach_comment(text);
        }
    }

    fn nag(&mut self, nag: Nag) {
        self.just_closed_variation = false;
        if let Some(mv) = self.current_list().last_mut() {
            mv.nags.push(nag.to_string());
        }
    }

    fn outcome(&mut self, outcome: Option<Outcome>) {
        if let Some(outcome) = outcome {
            let text = outcome.to_string();
            if let Some(mv) = self.stack[0].last_mut() {
                mv.terminating_result = Some(text.clone());
            }
            self.game.tags.set(KnownTag::Result.name(), text);
        }
    }

    fn end_game(&mut self) -> Game {
        let mut game = std::mem::replace(&mut self.game, Game::new());
        game.moves = self.stack.pop().unwrap_or_default();
        self.stack.push(Vec::new());
        self.prefix_stack = vec![None];
        game.prefix_comment = self.prefix_stack.pop().unwrap_or(None);
        game
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgn_reader::BufferedReader;

    #[test]
    fn parses_simple_mainline_and_tags() {
        let pgn = b"[Event \"Test\"]\n[White \"A\"]\n[Black \"B\"]\n[Result \"0-1\"]\n\n1. f3 e5 2. g4 Qh4# 0-1\n";
        let mut reader = BufferedReader::new_cursor(&pgn[..]);
        let mut builder = GameBuilder::default();
        let game = reader.read_game(&mut builder).unwrap().unwrap();
        assert_eq!(game.tags.get(KnownTag::White), Some("A"));
        assert_eq!(game.moves.len(), 4);
        assert_eq!(game.moves[3].text.as_str(), "Qh4#");
    }

    #[test]
    fn attaches_variation_to_preceding_move() {
        let pgn = b"[Event \"Test\"]\n\n1. e4 (1. d4 d5) 1... e5 *\n";
        let mut reader = BufferedReader::new_cursor(&pgn[..]);
        let mut builder = GameBuilder::default();
        let game = reader.read_game(&mut builder).unwrap().unwrap();
        assert_eq!(game.moves.len(), 2);
        assert_eq!(game.moves[0].variants.len(), 1);
        assert_eq!(game.moves[0].variants[0].moves.len(), 2);
    }
}
