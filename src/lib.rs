//! Strictly Arena - turn loop and move sources for checkers
//!
//! # Architecture
//!
//! - **Runner**: the turn loop that asks each side for a move, applies it
//!   and republishes the board
//! - **Players**: move sources behind one async contract (random agent,
//!   human taps, scripted replay)
//! - **Relay**: single-slot hand-off from board taps to the human source
//! - **Config**: TOML settings seating a source at each color
//!
//! # Example
//!
//! ```no_run
//! use strictly_arena::{ArenaConfig, SourceKind, TapRelay};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ArenaConfig::default()
//!     .with_red(SourceKind::Random)
//!     .with_black(SourceKind::Random)
//!     .with_think_time_ms(0);
//! let relay = TapRelay::new();
//! let mut runner = config.build_runner(&relay);
//! let outcome = runner.run().await?;
//! println!("{:?}", outcome.winner);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod players;
mod relay;
mod runner;

// Crate-level exports - Configuration
pub use config::{ArenaConfig, ConfigError, LegalityKind, SourceKind, UNATTENDED_TURN_LIMIT};

// Crate-level exports - Move sources
pub use players::{
    DEFAULT_THINK_TIME, HumanInput, MoveSource, RandomAgent, RandomStrategy, ScriptedSource,
};

// Crate-level exports - Input relay
pub use relay::{RelayError, TapRelay};

// Crate-level exports - Turn loop
pub use runner::{
    GameEnvironment, GameEvent, GameOutcome, GameRunner, RejectedMovePolicy, RunnerOptions,
    RunnerPhase, StopHandle,
};
