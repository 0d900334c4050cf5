//! Move source that replays a fixed list of moves.

use super::MoveSource;
use anyhow::{Result, bail};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use strictly_checkers::{GameState, PlayerMove};
use tracing::debug;

/// Plays back moves in order, then fails.
///
/// Useful for deterministic games in tests and demos.
pub struct ScriptedSource {
    name: String,
    moves: VecDeque<PlayerMove>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    /// Creates a source that will play `moves` in order.
    pub fn new(name: impl Into<String>, moves: impl IntoIterator<Item = PlayerMove>) -> Self {
        Self {
            name: name.into(),
            moves: moves.into_iter().collect(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter of `next_move` calls, readable after the source has
    /// been handed to a runner.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait::async_trait]
impl MoveSource for ScriptedSource {
    async fn next_move(&mut self, _state: &GameState) -> Result<PlayerMove> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.moves.pop_front() {
            Some(mv) => {
                debug!(source = %self.name, mv = %mv, remaining = self.moves.len(), "Replaying move");
                Ok(mv)
            }
            None => bail!("{} has no scripted moves left", self.name),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
