//! Board cells, addressed row-major from the top-left.

use super::types::Board;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One of the nine cells. Displays as its 1-based number, the way players
/// type it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter,
)]
pub enum Position {
    /// Cell 0
    TopLeft,
    /// Cell 1
    TopCenter,
    /// Cell 2
    TopRight,
    /// Cell 3
    MiddleLeft,
    /// Cell 4
    Center,
    /// Cell 5
    MiddleRight,
    /// Cell 6
    BottomLeft,
    /// Cell 7
    BottomCenter,
    /// Cell 8
    BottomRight,
}

use Position::*;

impl Position {
    /// Every cell in index order.
    pub const ALL: [Position; 9] = [
        TopLeft,
        TopCenter,
        TopRight,
        MiddleLeft,
        Center,
        MiddleRight,
        BottomLeft,
        BottomCenter,
        BottomRight,
    ];

    /// Corners, preferred by the computer after the centre.
    pub const CORNERS: [Position; 4] = [TopLeft, TopRight, BottomLeft, BottomRight];

    /// Row-major index, 0-8.
    pub fn to_index(self) -> usize {
        self as usize
    }

    /// The cell at `index`, if on the board.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Row, 0 at the top.
    pub fn row(self) -> usize {
        self.to_index() / 3
    }

    /// Column, 0 at the left.
    pub fn column(self) -> usize {
        self.to_index() % 3
    }

    /// Empty cells of `board`, in index order.
    #[instrument(skip(board))]
    pub fn valid_moves(board: &Board) -> Vec<Position> {
        Self::ALL
            .into_iter()
            .filter(|pos| board.is_empty(*pos))
            .collect()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_index() + 1)
    }
}
