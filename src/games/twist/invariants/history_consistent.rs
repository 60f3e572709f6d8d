//! History consistency invariant: every turn record adds one symbol to the
//! previous one.

use super::super::{Square, TwistGame};
use super::Invariant;

/// Invariant: history starts from the empty board, each record fills
/// exactly one more square than its predecessor, the viewed step exists,
/// and no more placements were recorded than blocks revealed.
pub struct HistoryConsistentInvariant;

impl Invariant<TwistGame> for HistoryConsistentInvariant {
    fn holds(game: &TwistGame) -> bool {
        let history = game.history();
        let Some(first) = history.first() else {
            return false;
        };
        if first.filled() != 0 || game.step() >= history.len() {
            return false;
        }
        if history.len() - 1 > game.deque().revealed().len() {
            return false;
        }
        history.windows(2).all(|pair| {
            let changed: Vec<_> = pair[0]
                .squares()
                .iter()
                .zip(pair[1].squares())
                .filter(|(before, after)| before != after)
                .collect();
            matches!(changed.as_slice(), [(Square::Empty, Square::Occupied(_))])
        })
    }

    fn description() -> &'static str {
        "History grows one placement per record"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::twist::{Board, BlockSequence, End, Position, Symbol};

    fn game() -> TwistGame {
        use Symbol::{O, X};
        TwistGame::with_sequence(
            BlockSequence::from_symbols([X, X, O, O, X, O, X, O, X, O]).expect("balanced"),
        )
    }

    #[test]
    fn test_holds_after_rewind_and_replay() {
        let mut game = game();
        game.reveal(End::Front).expect("reveal");
        game.place(0).expect("place");
        game.reveal(End::Back).expect("reveal");
        game.place(1).expect("place");
        game.jump_to(1).expect("jump");
        game.reveal(End::Front).expect("reveal");
        game.place(8).expect("place");
        assert_eq!(game.history().len(), 3);
        assert!(HistoryConsistentInvariant::holds(&game));
    }

    #[test]
    fn test_skipped_record_violates() {
        let mut game = game();
        game.reveal(End::Front).expect("reveal");
        game.place(0).expect("place");
        let mut jumped = Board::new();
        jumped.set(Position::Center, Square::Occupied(Symbol::O));
        jumped.set(Position::TopRight, Square::Occupied(Symbol::O));
        game.history.push(jumped);
        assert!(!HistoryConsistentInvariant::holds(&game));
    }

    #[test]
    fn test_step_past_history_violates() {
        let mut game = game();
        game.step = 3;
        assert!(!HistoryConsistentInvariant::holds(&game));
    }
}
