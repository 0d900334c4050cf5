//! Read-only board projection for presentation layers.

use crate::types::{BOARD_SIZE, Color, GameState, PieceId, Position};
use serde::Serialize;
use std::fmt;

const SIZE: usize = BOARD_SIZE as usize;

/// What a presentation layer needs to draw one occupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellView {
    /// Stable token for animating the piece across moves.
    pub id: PieceId,
    /// Piece color.
    pub color: Color,
}

/// An 8x8 grid snapshot plus game status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameViewState {
    cells: [[Option<CellView>; SIZE]; SIZE],
    current_player: Color,
    winner: Option<Color>,
}

impl GameViewState {
    /// The cell at `position`.
    pub fn cell(&self, position: Position) -> Option<CellView> {
        self.cells[usize::from(position.row())][usize::from(position.col())]
    }

    /// All rows, top to bottom.
    pub fn rows(&self) -> &[[Option<CellView>; SIZE]; SIZE] {
        &self.cells
    }

    /// Whose turn it was when the snapshot was taken.
    pub fn current_player(&self) -> Color {
        self.current_player
    }

    /// The decided winner, if any.
    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.cells.iter().flatten().flatten().count()
    }
}

/// Projects `state` onto a grid.
///
/// Red is drawn first and Black second, so a cell holding pieces of both
/// colors shows the Black one.
pub fn project(state: &GameState) -> GameViewState {
    let mut cells = [[None; SIZE]; SIZE];
    for color in [Color::Red, Color::Black] {
        for piece in state.player(color).pieces() {
            let at = piece.position();
            cells[usize::from(at.row())][usize::from(at.col())] = Some(CellView {
                id: piece.id(),
                color,
            });
        }
    }

    GameViewState {
        cells,
        current_player: state.current_player(),
        winner: state.winner(),
    }
}

impl fmt::Display for GameViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " ")?;
        for col in 0..SIZE {
            write!(f, " {col}")?;
        }
        writeln!(f)?;

        for (row, cells) in self.cells.iter().enumerate() {
            write!(f, "{row}")?;
            for cell in cells {
                let symbol = match cell.map(|c| c.color) {
                    Some(Color::Red) => 'r',
                    Some(Color::Black) => 'b',
                    None => '.',
                };
                write!(f, " {symbol}")?;
            }
            writeln!(f)?;
        }

        match self.winner {
            Some(winner) => write!(f, "{winner} wins"),
            None => write!(f, "{} to move", self.current_player),
        }
    }
}
