//! The CLI surface (§6), parsed with `clap`'s derive API in the teacher's
//! style (a flat `#[derive(Parser)]` struct, `src/main.rs`).

use std::path::PathBuf;

use chess_core::rewriter::Dialect;
use clap::Parser;

/// Batch PGN processor: plays every game through the rule engine, applies
/// the configured filters and matchers, and rewrites what survives.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// PGN files to process; reads stdin if none given and `-f`/`-A` are
    /// also absent.
    pub inputs: Vec<PathBuf>,

    /// -f: a file listing one input PGN path per line.
    #[arg(short = 'f', long = "filelist")]
    pub file_of_inputs: Option<PathBuf>,

    /// -A: an argument file, itself containing whitespace-separated CLI
    /// arguments (may nest -A recursively).
    #[arg(short = 'A', long = "argfile")]
    pub arg_file: Option<PathBuf>,

    /// -M: retain only games ending in checkmate.
    #[arg(short = 'M', long)]
    pub checkmate: bool,

    /// Retain only games reaching a stalemate.
    #[arg(long)]
    pub stalemate: bool,

    /// Retain only games that reach the fifty-move rule.
    #[arg(long)]
    pub fifty: bool,

    /// Retain only games reaching a third repeated position.
    #[arg(long)]
    pub repetition: bool,

    /// -b: minimum number of full moves a game must reach.
    #[arg(short = 'b', long)]
    pub min_moves: Option<u32>,

    /// -p: maximum ply count to play/probe before stopping early.
    #[arg(short = 'p', long)]
    pub max_plies: Option<u32>,

    /// -t: retain only games whose tags contain `KEY=VALUE` (repeatable).
    #[arg(short = 't', long = "tag")]
    pub tag_match: Vec<String>,

    /// -T: retain only games naming this player in White or Black
    /// (repeatable).
    #[arg(short = 'T', long = "player")]
    pub player_match: Vec<String>,

    /// -v: textual variation spec file.
    #[arg(short = 'v', long = "variations")]
    pub variation_file: Option<PathBuf>,

    /// Use straight (positional) matching instead of the permutation
    /// default for `-v`.
    #[arg(long)]
    pub straight: bool,

    /// -x: positional variation/hash/FEN-pattern spec file.
    #[arg(short = 'x', long = "positions")]
    pub positional_file: Option<PathBuf>,

    /// -H: match a single hex polyglot hash directly (repeatable).
    #[arg(short = 'H', long = "hexhash")]
    pub hex_hash: Vec<String>,

    /// -z: endings spec file.
    #[arg(short = 'z', long = "endings")]
    pub endings_file: Option<PathBuf>,

    /// -e: ECO classification PGN file.
    #[arg(short = 'e', long = "ecofile")]
    pub eco_file: Option<PathBuf>,

    /// -E: ECO split level (how many ECO-code characters to group files
    /// by, when splitting output per-code).
    #[arg(short = 'E', long = "ecosplit")]
    pub eco_split: Option<u32>,

    /// -F: append a FEN comment after the final move of each retained game.
    #[arg(short = 'F', long)]
    pub fen_output: bool,

    /// Append a polyglot-hash comment after the final move.
    #[arg(long)]
    pub annotate_hash: bool,

    /// Append a Shannon material+mobility evaluation comment after the
    /// final move.
    #[arg(long)]
    pub annotate_eval: bool,

    /// -d: exact/fuzzy duplicate hash file (external, disk-backed).
    #[arg(short = 'd', long = "dupfile")]
    pub duplicates_file: Option<PathBuf>,

    /// -D: suppress output of games flagged as duplicates.
    #[arg(short = 'D', long)]
    pub suppress_duplicates: bool,

    /// -U: suppress output of the original of a duplicate pair (keep only
    /// later repeats).
    #[arg(short = 'U', long)]
    pub suppress_originals: bool,

    /// --fuzzydepth N: ply depth at which the fuzzy duplicate hash is
    /// snapshotted (0 = final position).
    #[arg(long, default_value_t = 0)]
    pub fuzzydepth: u32,

    /// --selectonly: comma-separated game-number ranges to keep, e.g.
    /// `3-7,10,15-`.
    #[arg(long)]
    pub selectonly: Option<String>,

    /// --skipmatching: comma-separated game-number ranges to skip.
    #[arg(long)]
    pub skipmatching: Option<String>,

    /// --stopafter N: stop once N games have matched.
    #[arg(long)]
    pub stopafter: Option<u32>,

    /// -#N: split output into files of N games each.
    #[arg(short = '#', long = "gamesperfile")]
    pub games_per_file: Option<u32>,

    /// --keepbroken: emit games with a decode/resolution error up to the
    /// failure point instead of discarding them.
    #[arg(long)]
    pub keepbroken: bool,

    /// --fixresulttags: rewrite the `Result` tag to match the actual
    /// checkmate/stalemate outcome reached.
    #[arg(long)]
    pub fixresulttags: bool,

    /// -W: output move-text dialect (san, epd, cm, lalg, halg, elalg,
    /// xlalg, uci).
    #[arg(short = 'W', long, default_value = "san")]
    pub dialect: String,

    /// Language-specific SAN piece letters, PNBRQK order, e.g. `PSLTDK`.
    #[arg(long)]
    pub piece_letters: Option<String>,

    /// --logfile: write diagnostics here instead of stderr.
    #[arg(long)]
    pub logfile: Option<PathBuf>,

    /// --quiet: suppress the end-of-run summary.
    #[arg(long)]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_dialect(&self) -> Dialect {
        match self.dialect.to_ascii_lowercase().as_str() {
            "epd" => Dialect::Epd,
            "cm" => Dialect::Cm,
            "lalg" => Dialect::Lalg,
            "halg" => Dialect::Halg,
            "elalg" => Dialect::Elalg,
            "xlalg" => Dialect::Xlalg,
            "uci" => Dialect::Uci,
            _ => Dialect::San,
        }
    }

    /// Parses a 6-letter PNBRQK override string into the array `rewrite_move`
    /// expects, or `None` to keep the built-in English letters.
    pub fn parse_piece_letters(&self) -> Option<[char; 6]> {
        let letters = self.piece_letters.as_ref()?;
        let chars: Vec<char> = letters.chars().collect();
        if chars.len() != 6 {
            return None;
        }
        Some([chars[0], chars[1], chars[2], chars[3], chars[4], chars[5]])
    }
}

/// Parses a `--selectonly`/`--skipmatching` range list (`3-7,10,15-`) into a
/// predicate over 1-based game numbers.
#[derive(Clone, Debug, Default)]
pub struct GameRanges {
    ranges: Vec<(u32, Option<u32>)>,
}

impl GameRanges {
    pub fn parse(spec: &str) -> GameRanges {
        let mut ranges = Vec::new();
        for part in spec.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if let Some((lo, hi)) = part.split_once('-') {
                let lo: u32 = lo.trim().parse().unwrap_or(1);
                let hi = hi.trim().parse().ok();
                ranges.push((lo, hi));
            } else if let Ok(n) = part.parse() {
                ranges.push((n, Some(n)));
            }
        }
        GameRanges { ranges }
    }

    pub fn contains(&self, game_number: u32) -> bool {
        self.ranges.iter().any(|&(lo, hi)| game_number >= lo && hi.map_or(true, |hi| game_number <= hi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_defaults_to_san() {
        let cli = Cli::parse_from(["chess-pgn-tool"]);
        assert_eq!(cli.parse_dialect(), Dialect::San);
    }

    #[test]
    fn game_ranges_parses_open_ended_and_single() {
        let ranges = GameRanges::parse("3-7,10,15-");
        assert!(!ranges.contains(2));
        assert!(ranges.contains(5));
        assert!(ranges.contains(10));
        assert!(!ranges.contains(11));
        assert!(ranges.contains(1000));
    }
}
