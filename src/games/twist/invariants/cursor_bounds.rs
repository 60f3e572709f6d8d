//! Cursor bounds invariant: the revealed set is exactly what lies outside
//! the cursors.

use super::super::blocks::BLOCK_COUNT;
use super::super::TwistGame;
use super::Invariant;

/// Invariant: `front <= back_end <= 10`, and the revealed indices are the
/// slots before `front` and from `back_end` on, each exactly once.
pub struct CursorBoundsInvariant;

impl Invariant<TwistGame> for CursorBoundsInvariant {
    fn holds(game: &TwistGame) -> bool {
        let deque = game.deque();
        let (front, back_end) = (deque.front_index(), deque.back_end());
        if front > back_end || back_end > BLOCK_COUNT {
            return false;
        }
        let revealed = deque.revealed();
        if revealed.len() != BLOCK_COUNT - deque.remaining() {
            return false;
        }
        let mut seen = [false; BLOCK_COUNT];
        for &index in revealed {
            let outside = index < front || (back_end..BLOCK_COUNT).contains(&index);
            if !outside || seen[index] {
                return false;
            }
            seen[index] = true;
        }
        true
    }

    fn description() -> &'static str {
        "Revealed blocks match the deque cursors"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::twist::{BlockSequence, End, Symbol};

    fn game() -> TwistGame {
        use Symbol::{O, X};
        TwistGame::with_sequence(
            BlockSequence::from_symbols([O, X, O, X, O, X, O, X, O, X]).expect("balanced"),
        )
    }

    #[test]
    fn test_holds_through_reveals() {
        let mut game = game();
        assert!(CursorBoundsInvariant::holds(&game));
        game.reveal(End::Front).expect("reveal");
        assert!(CursorBoundsInvariant::holds(&game));
        game.place(0).expect("place");
        game.reveal(End::Back).expect("reveal");
        assert!(CursorBoundsInvariant::holds(&game));
    }

    #[test]
    fn test_crossed_cursors_violate() {
        let mut game = game();
        game.deque.front = 6;
        game.deque.back_end = 5;
        assert!(!CursorBoundsInvariant::holds(&game));
    }

    #[test]
    fn test_revealed_inside_region_violates() {
        let mut game = game();
        game.deque.front = 1;
        game.deque.revealed = vec![4];
        assert!(!CursorBoundsInvariant::holds(&game));
    }
}
