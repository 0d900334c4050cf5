//! Command-line interface for strictly_arena.

use clap::{Args, Parser, Subcommand};
use std::io::BufRead;
use std::path::PathBuf;
use strictly_arena::{
    ArenaConfig, ConfigError, LegalityKind, RejectedMovePolicy, SourceKind, TapRelay,
};
use strictly_checkers::Position;
use tracing::{debug, warn};

/// Strictly Arena - checkers between humans and agents
#[derive(Parser, Debug)]
#[command(name = "strictly_arena")]
#[command(about = "Play checkers between humans and random agents", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play one game in the terminal. Human moves are typed as `row col`,
    /// one cell per line.
    Play(PlayArgs),
}

/// Options for `play`; each overrides the config file.
#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Source playing Red
    #[arg(long, value_enum)]
    pub red: Option<SourceKind>,

    /// Source playing Black
    #[arg(long, value_enum)]
    pub black: Option<SourceKind>,

    /// Random agents' delay before each move, in milliseconds
    #[arg(long)]
    pub think_ms: Option<u64>,

    /// Seed for reproducible agents
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many move requests
    #[arg(long)]
    pub max_turns: Option<usize>,

    /// Ruleset screening moves
    #[arg(long, value_enum)]
    pub legality: Option<LegalityKind>,

    /// Ask the same side again after a refused move
    #[arg(long)]
    pub retry_rejected: bool,
}

impl PlayArgs {
    /// Loads the config file (or defaults) and applies the overrides.
    pub fn resolve(&self) -> Result<ArenaConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ArenaConfig::from_file(path)?,
            None => ArenaConfig::default(),
        };

        if let Some(kind) = self.red {
            config = config.with_red(kind);
        }
        if let Some(kind) = self.black {
            config = config.with_black(kind);
        }
        if let Some(ms) = self.think_ms {
            config = config.with_think_time_ms(ms);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(limit) = self.max_turns {
            config = config.with_max_turns(limit);
        }
        if let Some(legality) = self.legality {
            config = config.with_legality(legality);
        }
        if self.retry_rejected {
            config = config.with_rejected_move(RejectedMovePolicy::Retry);
        }
        Ok(config)
    }
}

/// Parses a typed tap such as `6 0` or `6,0`.
pub fn parse_tap(line: &str) -> Option<Position> {
    let mut parts = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty());
    let row = parts.next()?.parse().ok()?;
    let col = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Position::new(row, col)
}

/// Forwards typed cells to the relay until `reader` ends, then closes it.
///
/// Blocks the calling thread.
pub fn relay_taps(reader: impl BufRead, relay: &TapRelay) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Failed to read taps");
                break;
            }
        };
        match parse_tap(&line) {
            Some(cell) => {
                if !relay.notify_tap(cell) {
                    println!("Not your turn to tap; ignored {cell}");
                }
            }
            None => println!("Expected `row col` with both in 0..8, got {line:?}"),
        }
    }
    debug!("Tap input closed");
    relay.close();
}
