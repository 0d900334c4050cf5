//! Move application and the capture rule.
//!
//! The [`RuleEngine`] relocates pieces and resolves jump captures. Whether a
//! move is acceptable in the first place is delegated to a
//! [`LegalityPolicy`], so stricter rulesets can be swapped in without
//! touching capture handling.

use crate::error::MoveError;
use crate::types::{Color, GameState, Piece, PieceId, PlayerMove, Position};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Legality policies
// ─────────────────────────────────────────────────────────────

/// Decides whether a move may be applied.
///
/// Runs after the engine has confirmed the acting color owns a piece on the
/// origin cell, and before anything is mutated.
pub trait LegalityPolicy: Send + Sync + std::fmt::Debug {
    /// Returns `Err(MoveError::Illegal { .. })` to reject `mv`.
    fn check(&self, state: &GameState, mv: PlayerMove, acting: Color) -> Result<(), MoveError>;
}

impl<P: LegalityPolicy + ?Sized> LegalityPolicy for Box<P> {
    fn check(&self, state: &GameState, mv: PlayerMove, acting: Color) -> Result<(), MoveError> {
        (**self).check(state, mv, acting)
    }
}

/// Accepts every move whose origin holds one of the mover's pieces.
///
/// Destinations are neither checked for occupancy nor for distance or
/// direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Permissive;

impl LegalityPolicy for Permissive {
    fn check(&self, _state: &GameState, _mv: PlayerMove, _acting: Color) -> Result<(), MoveError> {
        Ok(())
    }
}

/// Forward diagonal steps into empty cells, and forward jumps over an
/// opposing piece.
#[derive(Debug, Clone, Copy, Default)]
pub struct Diagonal;

impl LegalityPolicy for Diagonal {
    fn check(&self, state: &GameState, mv: PlayerMove, acting: Color) -> Result<(), MoveError> {
        let illegal = |reason: &'static str| -> Result<(), MoveError> {
            Err(MoveError::Illegal { mv, reason })
        };

        if state.is_occupied(mv.to()) {
            return illegal("destination is occupied");
        }

        let forward = acting.forward();
        let (drow, dcol) = mv.delta();
        match dcol.abs() {
            1 if drow == forward => Ok(()),
            2 if drow == 2 * forward => {
                let jumped = mv
                    .midpoint()
                    .and_then(|mid| state.player(acting.opponent()).piece_at(mid));
                match jumped {
                    Some(_) => Ok(()),
                    None => illegal("no opposing piece to jump"),
                }
            }
            _ => illegal("not a forward diagonal step or jump"),
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Rule engine
// ─────────────────────────────────────────────────────────────

/// What an applied move did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    /// The relocated piece.
    pub moved: PieceId,
    /// The opposing piece removed by a jump.
    pub captured: Option<Piece>,
}

/// Applies moves to a [`GameState`].
#[derive(Debug, Clone, Default)]
pub struct RuleEngine<P = Permissive> {
    policy: P,
}

impl<P: LegalityPolicy> RuleEngine<P> {
    /// Creates an engine that screens moves with `policy`.
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    /// The policy in use.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Applies `mv` on behalf of `acting`.
    ///
    /// The piece on `mv.from()` is moved to `mv.to()`. When the move spans
    /// exactly two rows and two columns, the opposing piece on the midpoint
    /// is captured. Every other displacement is a plain relocation.
    ///
    /// Turn order and winner detection are left to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::NoPieceAt`] if `acting` has no piece on the
    /// origin, or whatever the policy rejects with. The state is unchanged
    /// in both cases.
    ///
    /// # Panics
    ///
    /// Panics if a jump's midpoint holds no opposing piece. Such a move was
    /// produced without any validation and would corrupt the piece counts
    /// that decide the game.
    #[instrument(skip_all, fields(mv = %mv, acting = %acting))]
    pub fn apply(
        &self,
        state: &mut GameState,
        mv: PlayerMove,
        acting: Color,
    ) -> Result<MoveOutcome, MoveError> {
        let Some(moved) = state.player(acting).piece_at(mv.from()).map(Piece::id) else {
            warn!("Improper move: no piece of the acting color at origin");
            return Err(MoveError::NoPieceAt {
                color: acting,
                position: mv.from(),
            });
        };

        if let Err(e) = self.policy.check(state, mv, acting) {
            warn!(error = %e, "Move rejected by legality policy");
            return Err(e);
        }

        state.player_mut(acting).relocate(mv.from(), mv.to());
        debug!(piece = %moved, "Relocated piece");

        let captured = match mv.midpoint() {
            Some(mid) => match state.player_mut(acting.opponent()).remove_at(mid) {
                Some(piece) => {
                    info!(captured = %piece.id(), at = %mid, "Captured piece");
                    Some(piece)
                }
                None => panic!(
                    "jumped a nonexistent piece: {mv} by {acting} has no {} piece at {mid}",
                    acting.opponent()
                ),
            },
            None => None,
        };

        Ok(MoveOutcome { moved, captured })
    }
}

// ─────────────────────────────────────────────────────────────
//  Move generation
// ─────────────────────────────────────────────────────────────

/// Every move [`Diagonal`] would accept for `color`, jumps first.
#[instrument(skip(state))]
pub fn candidate_moves(state: &GameState, color: Color) -> Vec<PlayerMove> {
    let forward = color.forward();
    let opponent = state.player(color.opponent());
    let free = |cell: &Position| !state.is_occupied(*cell);

    let mut jumps = Vec::new();
    let mut steps = Vec::new();
    for from in state.player(color).positions() {
        for side in [-1, 1] {
            if let Some(to) = from.offset(forward, side).filter(free) {
                steps.push(PlayerMove::new(from, to));
            }
            let over = from.offset(forward, side);
            let landing = from.offset(2 * forward, 2 * side).filter(free);
            if let (Some(over), Some(to)) = (over, landing)
                && opponent.piece_at(over).is_some()
            {
                jumps.push(PlayerMove::new(from, to));
            }
        }
    }

    jumps.extend(steps);
    debug!(count = jumps.len(), "Generated candidate moves");
    jumps
}
