//! Win detection for TwistTacToe.

use super::super::{Board, Position, Square, Symbol};
use tracing::instrument;

/// The eight lines of the board: rows, columns, diagonals.
pub const LINES: [[Position; 3]; 8] = {
    use Position::*;
    [
        [TopLeft, TopCenter, TopRight],
        [MiddleLeft, Center, MiddleRight],
        [BottomLeft, BottomCenter, BottomRight],
        [TopLeft, MiddleLeft, BottomLeft],
        [TopCenter, Center, BottomCenter],
        [TopRight, MiddleRight, BottomRight],
        [TopLeft, Center, BottomRight],
        [TopRight, Center, BottomLeft],
    ]
};

/// Checks whether any line holds three equal symbols.
///
/// Returns the symbol of the first complete line, `None` otherwise.
#[instrument(skip(board))]
pub fn check_winner(board: &Board) -> Option<Symbol> {
    LINES.iter().find_map(|[a, b, c]| match board.get(*a) {
        Square::Occupied(symbol)
            if board.get(*b) == Square::Occupied(symbol)
                && board.get(*c) == Square::Occupied(symbol) =>
        {
            Some(symbol)
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(cells: &[(Position, Symbol)]) -> Board {
        let mut board = Board::new();
        for (pos, symbol) in cells {
            board.set(*pos, Square::Occupied(*symbol));
        }
        board
    }

    #[test]
    fn test_no_winner_empty_board() {
        assert_eq!(check_winner(&Board::new()), None);
    }

    #[test]
    fn test_winner_top_row() {
        let board = board_with(&[
            (Position::TopLeft, Symbol::X),
            (Position::TopCenter, Symbol::X),
            (Position::TopRight, Symbol::X),
        ]);
        assert_eq!(check_winner(&board), Some(Symbol::X));
    }

    #[test]
    fn test_winner_column() {
        let board = board_with(&[
            (Position::TopRight, Symbol::O),
            (Position::MiddleRight, Symbol::O),
            (Position::BottomRight, Symbol::O),
        ]);
        assert_eq!(check_winner(&board), Some(Symbol::O));
    }

    #[test]
    fn test_winner_anti_diagonal() {
        let board = board_with(&[
            (Position::TopRight, Symbol::O),
            (Position::Center, Symbol::O),
            (Position::BottomLeft, Symbol::O),
        ]);
        assert_eq!(check_winner(&board), Some(Symbol::O));
    }

    #[test]
    fn test_mixed_line_is_not_a_win() {
        let board = board_with(&[
            (Position::TopLeft, Symbol::X),
            (Position::TopCenter, Symbol::O),
            (Position::TopRight, Symbol::X),
        ]);
        assert_eq!(check_winner(&board), None);
    }
}
