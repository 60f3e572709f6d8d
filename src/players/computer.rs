//! Heuristic computer opponent.

use crate::games::twist::rules::LINES;
use crate::games::twist::{Board, End, Position, Seat, Square, Symbol};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};

/// The computer player: always second, always revealing from the back.
#[derive(Debug, Clone)]
pub struct ComputerOpponent {
    name: String,
}

impl ComputerOpponent {
    /// Creates a computer opponent with a display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Seat the computer occupies.
    pub fn seat(&self) -> Seat {
        Seat::Two
    }

    /// End the computer reveals from.
    pub fn reveal_end(&self) -> End {
        End::Back
    }

    /// Picks a cell for `symbol`.
    ///
    /// Priority, first match wins: complete a line of `symbol`, block a line
    /// of the complement, take the centre, take a random empty corner, take
    /// a random empty cell. Returns `None` only on a full board.
    #[instrument(skip(self, board, rng), fields(computer = %self.name))]
    pub fn choose_move<R: Rng + ?Sized>(
        &self,
        board: &Board,
        symbol: Symbol,
        rng: &mut R,
    ) -> Option<Position> {
        let choice = completing_cell(board, symbol)
            .or_else(|| completing_cell(board, symbol.complement()))
            .or_else(|| board.is_empty(Position::Center).then_some(Position::Center))
            .or_else(|| {
                let corners: Vec<_> = Position::CORNERS
                    .into_iter()
                    .filter(|pos| board.is_empty(*pos))
                    .collect();
                corners.choose(rng).copied()
            })
            .or_else(|| Position::valid_moves(board).choose(rng).copied());
        debug!(?choice, %symbol, "Computer chose a cell");
        choice
    }
}

impl Default for ComputerOpponent {
    fn default() -> Self {
        Self::new("Computer")
    }
}

/// First empty cell (in index order of the lines) that would complete a
/// line of `symbol`.
fn completing_cell(board: &Board, symbol: Symbol) -> Option<Position> {
    LINES.iter().find_map(|line| {
        let mine = line
            .iter()
            .filter(|pos| board.get(**pos) == Square::Occupied(symbol))
            .count();
        let empty: Vec<_> = line.iter().filter(|pos| board.is_empty(**pos)).collect();
        match (mine, empty.as_slice()) {
            (2, [pos]) => Some(**pos),
            _ => None,
        }
    })
}
