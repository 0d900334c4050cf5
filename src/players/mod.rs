//! Move sources: the uniform contract through which humans and agents
//! supply moves.

mod human;
mod random_agent;
mod scripted;

pub use human::HumanInput;
pub use random_agent::{DEFAULT_THINK_TIME, RandomAgent, RandomStrategy};
pub use scripted::ScriptedSource;

use anyhow::Result;
use strictly_checkers::{GameState, PlayerMove};

/// Anything that can propose the next move for the side to move.
///
/// Implementations may suspend for as long as they like; the game loop waits.
#[async_trait::async_trait]
pub trait MoveSource: Send {
    /// Proposes a move for `state.current_player()`.
    async fn next_move(&mut self, state: &GameState) -> Result<PlayerMove>;

    /// Returns the source's display name.
    fn name(&self) -> &str;
}
