//! Human player fed by board taps.

use super::MoveSource;
use crate::relay::TapRelay;
use anyhow::Result;
use strictly_checkers::{GameState, PlayerMove, Position};
use tracing::{debug, info, instrument};

/// Human player that builds a move out of two taps.
///
/// The first accepted tap must land on one of the mover's own pieces, the
/// second on an empty cell. Any other tap is ignored and the wait resumes.
pub struct HumanInput {
    name: String,
    relay: TapRelay,
}

impl HumanInput {
    /// Creates a human player listening on `relay`.
    pub fn new(name: impl Into<String>, relay: TapRelay) -> Self {
        Self {
            name: name.into(),
            relay,
        }
    }

    async fn wait_for(&self, accept: impl Fn(Position) -> bool) -> Result<Position> {
        loop {
            let tap = self.relay.next_tap().await?;
            if accept(tap) {
                return Ok(tap);
            }
            debug!(human = %self.name, tap = %tap, "Ignoring tap");
        }
    }
}

#[async_trait::async_trait]
impl MoveSource for HumanInput {
    #[instrument(skip_all, fields(human = %self.name, color = %state.current_player()))]
    async fn next_move(&mut self, state: &GameState) -> Result<PlayerMove> {
        info!("Waiting for human taps");
        let own = state.player(state.current_player());

        let from = self.wait_for(|cell| own.piece_at(cell).is_some()).await?;
        debug!(from = %from, "Origin selected");
        let to = self.wait_for(|cell| !state.is_occupied(cell)).await?;

        let mv = PlayerMove::new(from, to);
        info!(mv = %mv, "Human chose move");
        Ok(mv)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
