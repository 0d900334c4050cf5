//! Arena configuration: who plays each color and under which rules.

use crate::players::{HumanInput, MoveSource, RandomAgent, RandomStrategy};
use crate::relay::TapRelay;
use crate::runner::{GameEnvironment, GameRunner, RejectedMovePolicy, RunnerOptions};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use strictly_checkers::{Color, Diagonal, GameState, Permissive};
use tracing::{debug, info, instrument};

/// Turn limit applied when no human is seated and none is configured.
///
/// Without kings, two agents can reach a board where neither side has a
/// forward move and both keep passing.
pub const UNATTENDED_TURN_LIMIT: usize = 500;

/// Kind of move source seated at a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Taps relayed from the presentation layer.
    Human,
    /// Random forward moves.
    Random,
    /// Random piece sent to the top-left corner.
    Corner,
}

/// Ruleset screening moves before they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LegalityKind {
    /// Any move from an owned piece.
    #[default]
    Permissive,
    /// Forward diagonal steps and jumps into empty cells.
    Diagonal,
}

/// Settings for one game.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Source playing Red.
    #[serde(default = "default_red")]
    red: SourceKind,

    /// Source playing Black.
    #[serde(default = "default_black")]
    black: SourceKind,

    /// Random agents' delay before each move, in milliseconds.
    #[serde(default = "default_think_time_ms")]
    think_time_ms: u64,

    /// Seed for reproducible agents.
    #[serde(default)]
    seed: Option<u64>,

    /// Ruleset. Seats played through taps always use [`LegalityKind::Diagonal`].
    #[serde(default)]
    legality: LegalityKind,

    /// Turn handling for refused moves.
    #[serde(default)]
    rejected_move: RejectedMovePolicy,

    /// Stop after this many move requests without a winner. Agent-only
    /// games fall back to [`UNATTENDED_TURN_LIMIT`].
    #[serde(default)]
    max_turns: Option<usize>,
}

#[instrument]
fn default_red() -> SourceKind {
    SourceKind::Random
}

#[instrument]
fn default_black() -> SourceKind {
    SourceKind::Human
}

#[instrument]
fn default_think_time_ms() -> u64 {
    2000
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            red: default_red(),
            black: default_black(),
            think_time_ms: default_think_time_ms(),
            seed: None,
            legality: LegalityKind::default(),
            rejected_move: RejectedMovePolicy::default(),
            max_turns: None,
        }
    }
}

impl ArenaConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(red = ?config.red, black = ?config.black, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Seats `kind` at Red.
    pub fn with_red(mut self, kind: SourceKind) -> Self {
        self.red = kind;
        self
    }

    /// Seats `kind` at Black.
    pub fn with_black(mut self, kind: SourceKind) -> Self {
        self.black = kind;
        self
    }

    /// Sets the random agents' delay.
    pub fn with_think_time_ms(mut self, ms: u64) -> Self {
        self.think_time_ms = ms;
        self
    }

    /// Sets the agent seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the ruleset.
    pub fn with_legality(mut self, legality: LegalityKind) -> Self {
        self.legality = legality;
        self
    }

    /// Sets turn handling for refused moves.
    pub fn with_rejected_move(mut self, policy: RejectedMovePolicy) -> Self {
        self.rejected_move = policy;
        self
    }

    /// Sets the turn limit.
    pub fn with_max_turns(mut self, limit: usize) -> Self {
        self.max_turns = Some(limit);
        self
    }

    /// True if either color is played through taps.
    pub fn needs_taps(&self) -> bool {
        self.red == SourceKind::Human || self.black == SourceKind::Human
    }

    /// Ruleset the runner actually uses.
    ///
    /// Taps can describe any jump, and a jump over an empty cell is fatal in
    /// the engine, so human games are always screened by [`LegalityKind::Diagonal`].
    pub fn effective_legality(&self) -> LegalityKind {
        if self.needs_taps() {
            LegalityKind::Diagonal
        } else {
            self.legality
        }
    }

    /// Turn limit the runner actually uses.
    pub fn effective_max_turns(&self) -> Option<usize> {
        match self.max_turns {
            Some(limit) => Some(limit),
            None if self.needs_taps() => None,
            None => Some(UNATTENDED_TURN_LIMIT),
        }
    }

    /// Builds the move source for `color`.
    #[instrument(skip(self, relay))]
    pub fn build_source(&self, color: Color, relay: &TapRelay) -> Box<dyn MoveSource> {
        let kind = match color {
            Color::Red => self.red,
            Color::Black => self.black,
        };
        let name = format!("{color} {kind:?}");

        let strategy = match kind {
            SourceKind::Human => return Box::new(HumanInput::new(name, relay.clone())),
            SourceKind::Random => RandomStrategy::Legal,
            SourceKind::Corner => RandomStrategy::Corner,
        };

        let agent = RandomAgent::new(name)
            .with_think_time(Duration::from_millis(self.think_time_ms))
            .with_strategy(strategy);
        match self.seed {
            // Distinct streams per color from one seed.
            Some(seed) => Box::new(agent.with_seed(seed.wrapping_add(color as u64))),
            None => Box::new(agent),
        }
    }

    /// Builds an idle runner for a fresh standard game.
    #[instrument(skip(self, relay))]
    pub fn build_runner(&self, relay: &TapRelay) -> GameRunner {
        let environment = GameEnvironment::new(
            self.build_source(Color::Red, relay),
            self.build_source(Color::Black, relay),
        );
        let options = RunnerOptions {
            rejected_move: self.rejected_move,
            max_turns: self.effective_max_turns(),
        };

        let legality = self.effective_legality();
        if legality != self.legality {
            info!(configured = ?self.legality, "Human seat present, screening moves diagonally");
        }

        let runner = GameRunner::new(GameState::new(), environment).with_options(options);
        match legality {
            LegalityKind::Permissive => runner.with_policy(Permissive),
            LegalityKind::Diagonal => runner.with_policy(Diagonal),
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new config error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config = ArenaConfig::from_toml("").unwrap();
        assert_eq!(*config.red(), SourceKind::Random);
        assert_eq!(*config.black(), SourceKind::Human);
        assert_eq!(*config.think_time_ms(), 2000);
        assert_eq!(*config.legality(), LegalityKind::Permissive);
        assert_eq!(*config.rejected_move(), RejectedMovePolicy::ConsumesTurn);
        assert!(config.needs_taps());
    }

    #[test]
    fn test_human_seat_forces_diagonal_rules() {
        let config = ArenaConfig::default();
        assert_eq!(*config.legality(), LegalityKind::Permissive);
        assert_eq!(config.effective_legality(), LegalityKind::Diagonal);
        assert_eq!(config.effective_max_turns(), None);

        let agents = config.with_black(SourceKind::Random);
        assert_eq!(agents.effective_legality(), LegalityKind::Permissive);
    }

    #[test]
    fn test_agent_games_get_turn_limit() {
        let agents = ArenaConfig::default().with_black(SourceKind::Corner);
        assert_eq!(agents.effective_max_turns(), Some(UNATTENDED_TURN_LIMIT));
        assert_eq!(agents.with_max_turns(12).effective_max_turns(), Some(12));
    }

    #[test]
    fn test_parse_full_config() {
        let config = ArenaConfig::from_toml(
            r#"
            red = "corner"
            black = "random"
            think_time_ms = 0
            seed = 9
            legality = "diagonal"
            rejected_move = "retry"
            max_turns = 40
            "#,
        )
        .unwrap();
        assert_eq!(*config.red(), SourceKind::Corner);
        assert_eq!(*config.black(), SourceKind::Random);
        assert_eq!(*config.seed(), Some(9));
        assert_eq!(*config.legality(), LegalityKind::Diagonal);
        assert_eq!(*config.rejected_move(), RejectedMovePolicy::Retry);
        assert_eq!(*config.max_turns(), Some(40));
        assert!(!config.needs_taps());
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        let err = ArenaConfig::from_toml(r#"red = "oracle""#).unwrap_err();
        assert!(err.message.contains("Failed to parse config"));
    }

    #[test]
    fn test_source_names_follow_color() {
        let config = ArenaConfig::default().with_red(SourceKind::Corner);
        let relay = TapRelay::new();
        assert_eq!(config.build_source(Color::Red, &relay).name(), "Red Corner");
        assert_eq!(config.build_source(Color::Black, &relay).name(), "Black Human");
    }
}
