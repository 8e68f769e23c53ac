//! Thin driver (§9's "thin shim" pattern, mirrored from `motors/src/main.rs`):
//! parse arguments, build an [`chess_core::engine::Engine`] from the spec
//! files, stream every input game through the player and matchers, and
//! rewrite what survives.

mod cli;
mod diagnostics;
mod pgn_visitor;
mod player;
mod specs;

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chess_core::board::Board;
use chess_core::engine::Engine;
use chess_core::game::{Game, KnownTag};
use chess_core::matcher::duplicates::{DuplicateHit, ExternalDuplicateFile};
use chess_core::matcher::textual::variation_matches;
use chess_core::movegen::is_stalemate;
use chess_core::mv::CheckStatus;
use chess_core::rewriter::{self, Annotation, Dialect};
use clap::Parser;
use cli::{Cli, GameRanges};
use diagnostics::{Diagnostics, Location, RunSummary, Severity};
use pgn_visitor::GameBuilder;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Expands `-A`/`--argfile` into its contents (whitespace-separated tokens),
/// recursively, before clap ever sees the argument list.
fn expand_args(args: Vec<String>) -> Result<Vec<String>> {
    let mut out = Vec::new();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "-A" || arg == "--argfile" {
            let path = iter.next().context("-A/--argfile requires a path")?;
            let contents = std::fs::read_to_string(&path).with_context(|| format!("reading argument file '{path}'"))?;
            let tokens: Vec<String> = contents.split_whitespace().map(str::to_string).collect();
            out.extend(expand_args(tokens)?);
        } else {
            out.push(arg);
        }
    }
    Ok(out)
}

struct RunContext {
    engine: Engine,
    dialect: Dialect,
    piece_letters: Option<[char; 6]>,
    select_only: Option<GameRanges>,
    skip_matching: Option<GameRanges>,
    max_depth_full_moves: u32,
    game_number: u32,
    stop: bool,
    /// Backing store for `-d`: when set, duplicate bookkeeping goes through
    /// this fixed-record file instead of the in-memory table, for corpora
    /// too large to hold in memory (§4.10/§6). Kept around (not deleted at
    /// exit) since the user named the path explicitly, presumably to reuse
    /// it across runs -- the spec's "virtual.tmp" auto-cleanup describes the
    /// *default*, unnamed temp file, which this crate doesn't need unless
    /// `-d` is given.
    external_duplicates: Option<ExternalDuplicateFile>,
}

impl RunContext {
    fn check_duplicate(&mut self, hash: u64, cumulative_hash: u64, fuzzy: bool, file_number: u32) -> Result<Option<DuplicateHit>> {
        if let Some(external) = &mut self.external_duplicates {
            return Ok(external.check_and_insert(hash, cumulative_hash, fuzzy, file_number)?);
        }
        Ok(self.engine.duplicates.check_and_insert(hash, cumulative_hash, fuzzy, file_number))
    }
}

fn run() -> Result<()> {
    let raw_args: Vec<String> = std::env::args().collect();
    let expanded = expand_args(raw_args)?;
    let cli = Cli::parse_from(expanded);

    let mut diag = match &cli.logfile {
        Some(path) => Diagnostics::to_file(path).with_context(|| format!("opening log file '{}'", path.display()))?,
        None => Diagnostics::stderr(),
    };

    let mut engine = Engine::new();
    if let Some(path) = &cli.variation_file {
        let file = File::open(path).with_context(|| format!("opening variation file '{}'", path.display()))?;
        engine.variations = specs::load_variation_file(BufReader::new(file))?;
    }
    if let Some(path) = &cli.positional_file {
        let file = File::open(path).with_context(|| format!("opening positional file '{}'", path.display()))?;
        specs::load_positional_file(BufReader::new(file), &mut engine)?;
    }
    if let Some(path) = &cli.endings_file {
        let file = File::open(path).with_context(|| format!("opening endings file '{}'", path.display()))?;
        engine.endings = specs::load_endings_file(BufReader::new(file))?;
    }
    if let Some(path) = &cli.eco_file {
        let file = File::open(path).with_context(|| format!("opening ECO file '{}'", path.display()))?;
        specs::load_eco_file(file, &mut engine)?;
    }
    for hex in &cli.hex_hash {
        specs::add_hex_hash_match(&mut engine, hex)?;
    }

    let external_duplicates = match &cli.duplicates_file {
        Some(path) => Some(ExternalDuplicateFile::create(path).with_context(|| format!("opening duplicates file '{}'", path.display()))?),
        None => None,
    };

    let max_plies = cli.max_plies.unwrap_or(600);
    let mut ctx = RunContext {
        engine,
        dialect: cli.parse_dialect(),
        piece_letters: cli.parse_piece_letters(),
        select_only: cli.selectonly.as_deref().map(GameRanges::parse),
        skip_matching: cli.skipmatching.as_deref().map(GameRanges::parse),
        max_depth_full_moves: max_plies.div_ceil(2),
        game_number: 0,
        stop: false,
        external_duplicates,
    };

    let mut summary = RunSummary::default();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let mut inputs: Vec<PathBuf> = cli.inputs.clone();
    if let Some(path) = &cli.file_of_inputs {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading file list '{}'", path.display()))?;
        inputs.extend(text.lines().map(str::trim).filter(|l| !l.is_empty()).map(PathBuf::from));
    }

    if inputs.is_empty() {
        process_reader(std::io::stdin().lock(), "<stdin>", &cli, &mut ctx, &mut diag, &mut summary, &mut out)?;
    } else {
        for path in &inputs {
            if ctx.stop {
                break;
            }
            let file = File::open(path).with_context(|| format!("opening input file '{}'", path.display()))?;
            process_reader(BufReader::new(file), &path.display().to_string(), &cli, &mut ctx, &mut diag, &mut summary, &mut out)?;
        }
    }

    summary.eco_collisions = ctx.engine.eco_table.collisions;
    summary.eco_max_depth = ctx.engine.eco_table.max_depth;
    summary.print(cli.quiet);
    Ok(())
}

fn process_reader<R: Read, W: Write>(
    reader: R,
    file_label: &str,
    cli: &Cli,
    ctx: &mut RunContext,
    diag: &mut Diagnostics,
    summary: &mut RunSummary,
    out: &mut W,
) -> Result<()> {
    let mut pgn_reader = pgn_reader::BufferedReader::new(reader);
    let mut builder = GameBuilder::default();
    while !ctx.stop {
        let Some(mut game) = pgn_reader.read_game(&mut builder)? else { break };
        ctx.game_number += 1;
        summary.games_processed += 1;
        process_game(&mut game, file_label, ctx.game_number, cli, ctx, diag, summary, out);
        if let Some(stopafter) = cli.stopafter {
            if summary.games_matched >= stopafter {
                ctx.stop = true;
            }
        }
    }
    Ok(())
}

fn starting_board(game: &Game) -> Result<Board> {
    let is_setup = game.tags.get(KnownTag::SetUp) == Some("1");
    if is_setup {
        if let Some(fen) = game.tags.get(KnownTag::FenSetup) {
            return Ok(chess_core::fen::parse_fen(fen).unwrap_or_else(|_| Board::starting_position()));
        }
    }
    Ok(Board::starting_position())
}

#[allow(clippy::too_many_arguments)]
fn process_game<W: Write>(game: &mut Game, file_label: &str, game_number: u32, cli: &Cli, ctx: &mut RunContext, diag: &mut Diagnostics, summary: &mut RunSummary, out: &mut W) {
    let location = Location { file: file_label.to_string(), line: game_number, game_label: format!("game {game_number}") };

    let start = match starting_board(game) {
        Ok(b) => b,
        Err(e) => {
            diag.report(Severity::Error, &location, &format!("bad FEN setup: {e}"));
            summary.games_skipped_broken += 1;
            return;
        }
    };

    let config = player::PlayConfig {
        track_repetition: cli.repetition,
        track_fifty: cli.fifty,
        fuzzy_match_depth: cli.fuzzydepth,
        max_depth: ctx.max_depth_full_moves,
        fix_result_tags: cli.fixresulttags,
    };
    let outcome = player::play_game_with(game, start.clone(), &ctx.engine, &config);
    if let Some(eco) = game.eco_tag.clone() {
        game.tags.set(KnownTag::Eco.name(), eco.eco);
        game.tags.set(KnownTag::Opening.name(), eco.opening);
        if !eco.variation.is_empty() {
            game.tags.set(KnownTag::Variation.name(), eco.variation);
        }
        if !eco.sub_variation.is_empty() {
            game.tags.set(KnownTag::SubVariation.name(), eco.sub_variation);
        }
    }

    if !game.moves_ok && !cli.keepbroken {
        if let Some(err_ply) = game.error_ply {
            diag.report(Severity::Warning, &location, &format!("game stopped at ply {}: {}", err_ply.ply, err_ply.kind));
        }
        summary.games_skipped_broken += 1;
        return;
    }

    // §4.6: a main-line null move marks the game unsound -- matches are
    // suppressed unless broken-game retention (`--keepbroken`) is on.
    if game.has_main_line_null_move && !cli.keepbroken {
        diag.report(Severity::Warning, &location, "main line contains a null move; game is unsound");
        summary.games_skipped_broken += 1;
        return;
    }

    if !passes_filters(game, &outcome, cli, ctx) {
        return;
    }

    if let Some(ranges) = &ctx.select_only {
        if !ranges.contains(game_number) {
            return;
        }
    }
    if let Some(ranges) = &ctx.skip_matching {
        if ranges.contains(game_number) {
            return;
        }
    }

    if ctx.external_duplicates.is_some() || cli.suppress_duplicates || cli.suppress_originals {
        let fuzzy = cli.fuzzydepth != 0;
        let hash = if fuzzy { game.fuzzy_duplicate_hash } else { game.final_hash_value };
        let hit = match ctx.check_duplicate(hash, game.cumulative_hash_value, fuzzy, game_number) {
            Ok(hit) => hit,
            Err(e) => {
                diag.fatal(&format!("duplicate file I/O error: {e}"));
                return;
            }
        };
        if let Some(hit) = hit {
            summary.duplicates_found += 1;
            let DuplicateHit::Exact { originating_file } | DuplicateHit::Fuzzy { originating_file } = hit;
            diag.report(Severity::Info, &location, &format!("duplicate of game {originating_file}"));
            if cli.suppress_duplicates {
                return;
            }
        }
    }

    summary.games_matched += 1;
    let text = render_game(game, &start, ctx.dialect, ctx.piece_letters, cli);
    let _ = writeln!(out, "{text}\n");
}

fn passes_filters(game: &Game, outcome: &player::PlayOutcome, cli: &Cli, ctx: &RunContext) -> bool {
    if cli.checkmate {
        let mated = game.moves.last().is_some_and(|mv| mv.check_status == CheckStatus::Checkmate);
        if !mated {
            return false;
        }
    }
    if cli.stalemate && !is_stalemate(&outcome.final_board, outcome.final_board.to_move) {
        return false;
    }
    if cli.fifty && !game.reached_fifty_move_rule {
        return false;
    }
    if cli.repetition && !game.reached_repetition {
        return false;
    }
    if let Some(min_moves) = cli.min_moves {
        if game.half_moves_played.div_ceil(2) < min_moves {
            return false;
        }
    }
    for spec in &cli.tag_match {
        let Some((key, value)) = spec.split_once('=') else { continue };
        if game.tags.get_named(key) != Some(value) {
            return false;
        }
    }
    if !cli.player_match.is_empty() {
        let white = game.tags.get(KnownTag::White).unwrap_or_default();
        let black = game.tags.get(KnownTag::Black).unwrap_or_default();
        if !cli.player_match.iter().any(|p| white.contains(p.as_str()) || black.contains(p.as_str())) {
            return false;
        }
    }
    if !ctx.engine.variations.is_empty() {
        let hit = ctx.engine.variations.iter().any(|v| variation_matches(v, &game.moves, cli.straight, ctx.max_depth_full_moves));
        if !hit {
            return false;
        }
    }
    if !ctx.engine.positional.is_empty() && !outcome.positional_matched {
        return false;
    }
    if !ctx.engine.endings.is_empty() && outcome.matched_endings.is_empty() {
        return false;
    }
    true
}

fn render_game(game: &Game, start: &Board, dialect: Dialect, piece_letters: Option<[char; 6]>, cli: &Cli) -> String {
    let uci = dialect == Dialect::Uci;
    let mut text = String::new();
    if !uci {
        for (name, value) in game.tags.iter() {
            text.push_str(&format!("[{name} \"{value}\"]\n"));
        }
        text.push('\n');
    }
    let final_board = render_moves(&game.moves, start.clone(), dialect, piece_letters.as_ref(), uci, &mut text);
    if !uci {
        let mut annotations = Vec::new();
        if cli.fen_output {
            annotations.push(rewriter::annotate(&final_board, Annotation::Fen));
        }
        if cli.annotate_hash {
            annotations.push(rewriter::annotate(&final_board, Annotation::HashHex));
        }
        if cli.annotate_eval {
            annotations.push(rewriter::annotate(&final_board, Annotation::ShannonEval));
        }
        if !annotations.is_empty() {
            text.push_str(&format!("{{{}}} ", annotations.join("; ")));
        }
        if let Some(result) = game.tags.get(KnownTag::Result) {
            text.push_str(result);
        }
    }
    text.trim_end().to_string()
}

fn render_moves(moves: &[chess_core::mv::Move], mut board: Board, dialect: Dialect, piece_letters: Option<&[char; 6]>, uci: bool, out: &mut String) -> Board {
    for mv in moves {
        if !uci && board.to_move == chess_core::pieces::Colour::White {
            out.push_str(&format!("{}. ", board.move_number));
        } else if !uci && out.is_empty() {
            out.push_str(&format!("{}...", board.move_number));
        }
        let board_before = board.clone();
        let mut after = board.clone();
        chess_core::apply::apply(&mut after, mv);
        let rendered = rewriter::rewrite_move(mv, &board_before, &after, dialect, piece_letters);
        out.push_str(&rendered);
        out.push(' ');
        if !uci {
            for nag in &mv.nags {
                out.push_str(nag);
                out.push(' ');
            }
            for comment in &mv.comment_list {
                out.push_str(&format!("{{{comment}}} "));
            }
            for variant in &mv.variants {
                out.push('(');
                render_variant(variant, board_before.clone(), dialect, piece_letters, out);
                out.push_str(") ");
            }
        }
        board = after;
    }
    board
}

fn render_variant(variant: &chess_core::mv::Variation, board: Board, dialect: Dialect, piece_letters: Option<&[char; 6]>, out: &mut String) {
    if let Some(prefix) = &variant.prefix_comment {
        out.push_str(&format!("{{{prefix}}} "));
    }
    render_moves(&variant.moves, board, dialect, piece_letters, false, out);
    if let Some(suffix) = &variant.suffix_comment {
        out.push_str(&format!("{{{suffix}}} "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_args_inlines_argfile_tokens() {
        let dir = std::env::temp_dir();
        let path = dir.join("chess_pgn_tool_test_argfile.txt");
        std::fs::write(&path, "-M --stalemate\n").unwrap();
        let args = vec!["chess-pgn-tool".to_string(), "-A".to_string(), path.display().to_string()];
        let expanded = expand_args(args).unwrap();
        assert_eq!(expanded, vec!["chess-pgn-tool", "-M", "--stalemate"]);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn renders_fools_mate_as_san() {
        let mut game = Game::new();
        game.moves = ["f3", "e5", "g4", "Qh4"].iter().map(|t| chess_core::decode::decode(t)).collect();
        let start = Board::starting_position();
        player::play_game(&mut game, start.clone(), &Engine::new());
        let text = render_game(&game, &start, Dialect::San, None, &Cli::parse_from(["chess-pgn-tool"]));
        assert!(text.contains("Qh4#"));
    }

    /// A matched ECO entry must land on the output tags (ECO/Opening), not
    /// just on `Game::eco_tag` -- `process_game` is the one place that
    /// copies it over before rendering.
    #[test]
    fn eco_match_is_written_back_to_tags() {
        let mut engine = Engine::new();
        let mut board = Board::starting_position();
        let mut half_moves = 0u32;
        let mut cumulative = 0u64;
        for text in ["e4", "e5", "Nf3", "Nc6", "Bb5"] {
            let mv = chess_core::resolve::decode_and_resolve(text, &board).unwrap();
            chess_core::apply::apply(&mut board, &mv);
            half_moves += 1;
            cumulative = cumulative.wrapping_add(board.hash_value);
        }
        engine.eco_table.save_eco_details(chess_core::matcher::eco::EcoEntry {
            required_hash: board.hash_value,
            cumulative_hash: cumulative,
            half_moves,
            eco: "C60".to_string(),
            opening: "Ruy Lopez".to_string(),
            variation: String::new(),
            sub_variation: String::new(),
        });

        let mut game = Game::new();
        game.moves = ["e4", "e5", "Nf3", "Nc6", "Bb5"].iter().map(|t| chess_core::decode::decode(t)).collect();
        let mut ctx = RunContext {
            engine,
            dialect: Dialect::San,
            piece_letters: None,
            select_only: None,
            skip_matching: None,
            max_depth_full_moves: 300,
            game_number: 0,
            stop: false,
            external_duplicates: None,
        };
        let cli = Cli::parse_from(["chess-pgn-tool"]);
        let mut diag = Diagnostics::stderr();
        let mut summary = RunSummary::default();
        let mut out: Vec<u8> = Vec::new();
        process_game(&mut game, "<test>", 1, &cli, &mut ctx, &mut diag, &mut summary, &mut out);

        assert_eq!(game.tags.get(KnownTag::Eco), Some("C60"));
        assert_eq!(game.tags.get(KnownTag::Opening), Some("Ruy Lopez"));
    }
}
