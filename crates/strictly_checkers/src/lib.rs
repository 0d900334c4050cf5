//! Pure checkers game logic.
//!
//! - **Types**: board cells, pieces, per-color piece lists and the
//!   authoritative [`GameState`]
//! - **Rules**: the [`RuleEngine`] that relocates pieces and resolves jump
//!   captures, screened by a pluggable [`LegalityPolicy`]
//! - **View**: a read-only [`GameViewState`] projection for presentation
//!
//! Nothing here is async; turn order and move acquisition live in the
//! `strictly_arena` crate.
//!
//! # Example
//!
//! ```
//! use strictly_checkers::{Color, GameState, Permissive, PlayerMove, Position, RuleEngine};
//!
//! let mut state = GameState::new();
//! let engine = RuleEngine::new(Permissive);
//! let from = Position::new(6, 0).unwrap();
//! let to = Position::new(5, 1).unwrap();
//!
//! let outcome = engine.apply(&mut state, PlayerMove::new(from, to), Color::Black).unwrap();
//! assert!(outcome.captured.is_none());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod rules;
mod types;
mod view;

pub use error::{MoveError, SetupError};
pub use rules::{Diagonal, LegalityPolicy, MoveOutcome, Permissive, RuleEngine, candidate_moves};
pub use types::{
    BOARD_SIZE, Color, GameState, PIECES_PER_SIDE, Piece, PieceId, Player, PlayerMove, Position,
};
pub use view::{CellView, GameViewState, project};
