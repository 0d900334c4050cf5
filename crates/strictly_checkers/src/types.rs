//! Core domain types for checkers.

use crate::error::SetupError;
use serde::Serialize;
use strum::{Display, EnumIter};
use tracing::{debug, instrument};

/// Width and height of the board.
pub const BOARD_SIZE: u8 = 8;

/// Most pieces a single color may field.
pub const PIECES_PER_SIDE: usize = 8;

/// Side in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
pub enum Color {
    /// Red starts on rows 0 and 1.
    Red,
    /// Black starts on rows 6 and 7 and moves first.
    Black,
}

impl Color {
    /// Returns the opposing color.
    pub fn opponent(self) -> Self {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }

    /// Row direction this color advances in.
    pub fn forward(self) -> i8 {
        match self {
            Color::Red => 1,
            Color::Black => -1,
        }
    }
}

/// A cell on the 8x8 board.
///
/// Both coordinates are always below [`BOARD_SIZE`]. Checkerboard parity is
/// not enforced; any of the 64 cells can be addressed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, derive_more::Display,
)]
#[display("({row},{col})")]
pub struct Position {
    row: u8,
    col: u8,
}

impl Position {
    /// The top-left cell.
    pub const ORIGIN: Position = Position { row: 0, col: 0 };

    /// Creates a position, or `None` if either coordinate is off the board.
    pub const fn new(row: u8, col: u8) -> Option<Self> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// Row index, 0 at the top.
    pub fn row(self) -> u8 {
        self.row
    }

    /// Column index, 0 at the left.
    pub fn col(self) -> u8 {
        self.col
    }

    /// Returns the cell `drow` rows and `dcol` columns away, if it is on the board.
    pub fn offset(self, drow: i8, dcol: i8) -> Option<Self> {
        let row = i16::from(self.row) + i16::from(drow);
        let col = i16::from(self.col) + i16::from(dcol);
        let row = u8::try_from(row).ok()?;
        let col = u8::try_from(col).ok()?;
        Self::new(row, col)
    }

    /// Signed `(row, col)` distance from `self` to `other`.
    pub fn delta_to(self, other: Position) -> (i8, i8) {
        // Coordinates are < 8 so the casts cannot wrap.
        (
            other.row as i8 - self.row as i8,
            other.col as i8 - self.col as i8,
        )
    }

    /// True for the cells pieces start on.
    pub fn is_dark(self) -> bool {
        (self.row + self.col) % 2 == 0
    }

    /// Iterates all 64 cells in row-major order.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Position { row, col }))
    }
}

/// Stable identity of a piece, for presentation layers that animate pieces.
///
/// The engine never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, derive_more::Display)]
#[display("#{_0}")]
pub struct PieceId(u8);

impl PieceId {
    /// Raw token value.
    pub fn get(self) -> u8 {
        self.0
    }
}

/// A live piece on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Piece {
    id: PieceId,
    color: Color,
    position: Position,
}

impl Piece {
    /// Identity token.
    pub fn id(&self) -> PieceId {
        self.id
    }

    /// Owning color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Current cell.
    pub fn position(&self) -> Position {
        self.position
    }
}

/// The live pieces of one color.
///
/// Removing a piece from this list is the only representation of a capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    color: Color,
    pieces: Vec<Piece>,
}

impl Player {
    fn new(color: Color) -> Self {
        Self {
            color,
            pieces: Vec::with_capacity(PIECES_PER_SIDE),
        }
    }

    /// Color of every piece in this list.
    pub fn color(&self) -> Color {
        self.color
    }

    /// All live pieces.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Number of live pieces.
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// True once every piece has been captured.
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// The piece standing on `position`, if any.
    pub fn piece_at(&self, position: Position) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.position == position)
    }

    /// Cells occupied by this color.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.pieces.iter().map(|p| p.position)
    }

    /// Moves the piece on `from` to `to`.
    pub(crate) fn relocate(&mut self, from: Position, to: Position) {
        if let Some(piece) = self.pieces.iter_mut().find(|p| p.position == from) {
            piece.position = to;
        }
    }

    /// Removes and returns the piece on `position`.
    pub(crate) fn remove_at(&mut self, position: Position) -> Option<Piece> {
        let index = self.pieces.iter().position(|p| p.position == position)?;
        Some(self.pieces.remove(index))
    }

    fn push(&mut self, id: PieceId, position: Position) {
        self.pieces.push(Piece {
            id,
            color: self.color,
            position,
        });
    }
}

/// A proposed relocation, not yet validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[display("{from}->{to}")]
pub struct PlayerMove {
    from: Position,
    to: Position,
}

impl PlayerMove {
    /// Creates a move from `from` to `to`.
    pub fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }

    /// Origin cell.
    pub fn from(&self) -> Position {
        self.from
    }

    /// Destination cell.
    pub fn to(&self) -> Position {
        self.to
    }

    /// Signed `(row, col)` displacement.
    pub fn delta(&self) -> (i8, i8) {
        self.from.delta_to(self.to)
    }

    /// True when the move spans exactly two rows and two columns.
    pub fn is_jump(&self) -> bool {
        let (drow, dcol) = self.delta();
        drow.abs() == 2 && dcol.abs() == 2
    }

    /// The jumped-over cell of a jump.
    pub fn midpoint(&self) -> Option<Position> {
        if !self.is_jump() {
            return None;
        }
        let (drow, dcol) = self.delta();
        self.from.offset(drow / 2, dcol / 2)
    }
}

/// Authoritative record of a game in progress.
///
/// Both colors always have a [`Player`]. Once a winner is recorded it is
/// never cleared or replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    red: Player,
    black: Player,
    current_player: Color,
    winner: Option<Color>,
}

impl GameState {
    /// Creates the standard starting layout.
    ///
    /// Red fills the dark cells of rows 0 and 1, Black those of rows 6 and 7,
    /// and Black moves first.
    #[instrument]
    pub fn new() -> Self {
        let red_rows = [0, 1];
        let black_rows = [BOARD_SIZE - 2, BOARD_SIZE - 1];
        let cells = |rows: [u8; 2]| {
            Position::all()
                .filter(move |p| rows.contains(&p.row) && p.is_dark())
                .collect::<Vec<_>>()
        };

        let mut state = Self::empty(Color::Black);
        state.place(&cells(red_rows), &cells(black_rows));
        debug!(pieces = state.piece_count(), "Created standard layout");
        state
    }

    /// Creates a custom layout.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] if a color fields more than
    /// [`PIECES_PER_SIDE`] pieces or two pieces share a cell.
    #[instrument(skip_all, fields(red_count = red.len(), black_count = black.len(), to_move = %to_move))]
    pub fn from_positions(
        red: &[Position],
        black: &[Position],
        to_move: Color,
    ) -> Result<Self, SetupError> {
        for (color, cells) in [(Color::Red, red), (Color::Black, black)] {
            if cells.len() > PIECES_PER_SIDE {
                return Err(SetupError::TooManyPieces {
                    color,
                    count: cells.len(),
                });
            }
        }

        let mut seen = Vec::with_capacity(red.len() + black.len());
        for &cell in red.iter().chain(black) {
            if seen.contains(&cell) {
                return Err(SetupError::Overlap(cell));
            }
            seen.push(cell);
        }

        let mut state = Self::empty(to_move);
        state.place(red, black);
        Ok(state)
    }

    fn empty(to_move: Color) -> Self {
        Self {
            red: Player::new(Color::Red),
            black: Player::new(Color::Black),
            current_player: to_move,
            winner: None,
        }
    }

    fn place(&mut self, red: &[Position], black: &[Position]) {
        let mut next_id = 0u8;
        for (player, cells) in [(&mut self.red, red), (&mut self.black, black)] {
            for &cell in cells {
                player.push(PieceId(next_id), cell);
                next_id += 1;
            }
        }
    }

    /// The piece list of `color`.
    pub fn player(&self, color: Color) -> &Player {
        match color {
            Color::Red => &self.red,
            Color::Black => &self.black,
        }
    }

    pub(crate) fn player_mut(&mut self, color: Color) -> &mut Player {
        match color {
            Color::Red => &mut self.red,
            Color::Black => &mut self.black,
        }
    }

    /// Whose turn it is.
    pub fn current_player(&self) -> Color {
        self.current_player
    }

    /// The decided winner, if any.
    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    /// True once a winner has been recorded.
    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// The piece of either color standing on `position`.
    pub fn piece_at(&self, position: Position) -> Option<&Piece> {
        self.red
            .piece_at(position)
            .or_else(|| self.black.piece_at(position))
    }

    /// True if any piece stands on `position`.
    pub fn is_occupied(&self, position: Position) -> bool {
        self.piece_at(position).is_some()
    }

    /// Total live pieces across both colors.
    pub fn piece_count(&self) -> usize {
        self.red.len() + self.black.len()
    }

    /// Hands the turn to the other color.
    pub fn toggle_turn(&mut self) {
        self.current_player = self.current_player.opponent();
    }

    /// Which color has won on the current board, without recording it.
    ///
    /// Black is checked first, so if both lists were empty Red would win.
    pub fn detect_winner(&self) -> Option<Color> {
        if self.black.is_empty() {
            Some(Color::Red)
        } else if self.red.is_empty() {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// Records the winner if one has emerged, and returns the recorded winner.
    ///
    /// An already recorded winner is kept as-is.
    pub fn settle_winner(&mut self) -> Option<Color> {
        if self.winner.is_none() {
            self.winner = self.detect_winner();
        }
        self.winner
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
