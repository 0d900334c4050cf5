//! Random agent for unattended play.

use super::MoveSource;
use anyhow::{Result, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strictly_checkers::{GameState, PlayerMove, Position, candidate_moves};
use tracing::{debug, instrument};

/// How long the agent pretends to think before answering.
pub const DEFAULT_THINK_TIME: Duration = Duration::from_secs(2);

/// How the agent picks among its options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RandomStrategy {
    /// Uniformly among forward diagonal steps and jumps. Passes in place
    /// when there are none.
    #[default]
    Legal,
    /// A random piece to the top-left corner, regardless of legality.
    Corner,
}

/// Agent that moves at random after a fixed delay.
pub struct RandomAgent {
    name: String,
    think_time: Duration,
    strategy: RandomStrategy,
    rng: StdRng,
}

impl RandomAgent {
    /// Creates an agent with the default think time and strategy.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            think_time: DEFAULT_THINK_TIME,
            strategy: RandomStrategy::default(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Sets the delay before each move.
    pub fn with_think_time(mut self, think_time: Duration) -> Self {
        self.think_time = think_time;
        self
    }

    /// Sets the selection strategy.
    pub fn with_strategy(mut self, strategy: RandomStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Makes the agent's choices reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    fn choose(&mut self, state: &GameState) -> Result<PlayerMove> {
        let color = state.current_player();
        let Some(piece) = state.player(color).pieces().choose(&mut self.rng) else {
            bail!("{color} has no live pieces to move");
        };
        let origin = piece.position();

        let mv = match self.strategy {
            RandomStrategy::Corner => PlayerMove::new(origin, Position::ORIGIN),
            RandomStrategy::Legal => {
                match candidate_moves(state, color).choose(&mut self.rng) {
                    Some(&mv) => mv,
                    None => {
                        debug!(agent = %self.name, "No forward moves, passing in place");
                        PlayerMove::new(origin, origin)
                    }
                }
            }
        };
        Ok(mv)
    }
}

#[async_trait::async_trait]
impl MoveSource for RandomAgent {
    #[instrument(skip_all, fields(agent = %self.name, strategy = ?self.strategy))]
    async fn next_move(&mut self, state: &GameState) -> Result<PlayerMove> {
        tokio::time::sleep(self.think_time).await;
        let mv = self.choose(state)?;
        debug!(mv = %mv, "Agent chose move");
        Ok(mv)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_checkers::Color;

    #[test]
    fn test_corner_strategy_targets_origin() {
        let mut agent = RandomAgent::new("corner")
            .with_strategy(RandomStrategy::Corner)
            .with_seed(7);
        let state = GameState::new();
        for _ in 0..20 {
            let mv = agent.choose(&state).unwrap();
            assert_eq!(mv.to(), Position::ORIGIN);
            assert!(state.player(Color::Black).piece_at(mv.from()).is_some());
        }
    }

    #[test]
    fn test_legal_strategy_picks_candidates() {
        let mut agent = RandomAgent::new("legal").with_seed(7);
        let state = GameState::new();
        let candidates = candidate_moves(&state, Color::Black);
        for _ in 0..20 {
            assert!(candidates.contains(&agent.choose(&state).unwrap()));
        }
    }

    #[test]
    fn test_same_seed_same_choice() {
        let state = GameState::new();
        let mut a = RandomAgent::new("a").with_seed(42);
        let mut b = RandomAgent::new("b").with_seed(42);
        for _ in 0..10 {
            assert_eq!(a.choose(&state).unwrap(), b.choose(&state).unwrap());
        }
    }

    #[test]
    fn test_blocked_side_passes_in_place() {
        let red = Position::new(7, 1).unwrap();
        let state = GameState::from_positions(&[red], &[Position::ORIGIN], Color::Red).unwrap();
        let mut agent = RandomAgent::new("stuck").with_seed(1);
        assert_eq!(agent.choose(&state).unwrap(), PlayerMove::new(red, red));
    }

    #[test]
    fn test_empty_side_is_an_error() {
        let state = GameState::from_positions(&[], &[Position::ORIGIN], Color::Red).unwrap();
        let mut agent = RandomAgent::new("gone").with_seed(1);
        assert!(agent.choose(&state).is_err());
    }
}
