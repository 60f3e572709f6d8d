//! Draw detection for TwistTacToe.
//!
//! A game is drawn when nobody has a line and either the board is full or
//! the hidden sequence has no blocks left to reveal.

use super::super::{Board, Square};
use super::win::check_winner;
use tracing::instrument;

/// Checks if the board is full (all squares occupied).
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.squares().iter().all(|s| *s != Square::Empty)
}

/// Checks the draw condition given the number of unrevealed blocks.
#[instrument(skip(board))]
pub fn is_draw(board: &Board, blocks_remaining: usize) -> bool {
    check_winner(board).is_none() && (is_full(board) || blocks_remaining == 0)
}
