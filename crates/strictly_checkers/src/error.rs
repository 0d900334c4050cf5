//! Error types for move application and board setup.

use crate::types::{Color, PlayerMove, Position};
use derive_more::{Display, Error};

/// A move the engine refused to apply.
///
/// Both variants are recoverable: the board is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// The acting color has no piece on the origin cell.
    #[display("No {color} piece at {position}")]
    NoPieceAt {
        /// Color that tried to move.
        color: Color,
        /// The empty (or foreign) origin cell.
        position: Position,
    },

    /// The legality policy rejected the move.
    #[display("Illegal move {mv}: {reason}")]
    Illegal {
        /// The rejected move.
        mv: PlayerMove,
        /// Why the policy refused it.
        reason: &'static str,
    },
}

/// An invalid custom starting layout.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum SetupError {
    /// Two pieces were placed on the same cell.
    #[display("Two pieces placed on {_0}")]
    Overlap(#[error(not(source))] Position),

    /// A color was given more pieces than a side may field.
    #[display("{color} has {count} pieces, more than a side may field")]
    TooManyPieces {
        /// Offending color.
        color: Color,
        /// Number of pieces supplied.
        count: usize,
    },
}
