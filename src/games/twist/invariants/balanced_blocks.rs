//! Balanced blocks invariant: the hidden multiset is always five X, five O.

use super::super::arrangement::{Arrangement, POOL_SIZE};
use super::super::blocks::PER_SYMBOL;
use super::super::{End, Phase, Symbol, TwistGame, Variant};
use super::Invariant;

/// Invariant: the hidden sequence never skews toward a symbol.
///
/// Outside the arrangement phase the sequence is complete with five of each
/// symbol. While arranging, every half's placed symbols plus the arranging
/// player's leftover pool still add up to two X and two O. Arranged games
/// keep differing anchors.
pub struct BalancedBlocksInvariant;

impl BalancedBlocksInvariant {
    fn half_is_balanced(game: &TwistGame, arrangement: &Arrangement, end: End) -> bool {
        let sequence = game.deque().sequence();
        let slots = Arrangement::target_slots(end);
        let pool = arrangement.pool(end);
        [Symbol::X, Symbol::O].into_iter().all(|symbol| {
            let placed = slots
                .iter()
                .filter(|i| sequence.get(**i) == Some(symbol))
                .count();
            let left = pool.iter().filter(|s| **s == Some(symbol)).count();
            placed + left == POOL_SIZE / 2
        })
    }
}

impl Invariant<TwistGame> for BalancedBlocksInvariant {
    fn holds(game: &TwistGame) -> bool {
        let sequence = game.deque().sequence();
        if sequence.count(Symbol::X) > PER_SYMBOL || sequence.count(Symbol::O) > PER_SYMBOL {
            return false;
        }
        if game.variant() == Variant::Arranged && !sequence.anchors_differ() {
            return false;
        }
        match game.phase() {
            Phase::Arranging(arrangement) => {
                game.variant() == Variant::Arranged
                    && Self::half_is_balanced(game, arrangement, End::Front)
                    && Self::half_is_balanced(game, arrangement, End::Back)
            }
            _ => sequence.is_balanced(),
        }
    }

    fn description() -> &'static str {
        "Hidden blocks hold five X and five O"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::twist::BlockSequence;

    #[test]
    fn test_fresh_arrangement_holds() {
        let game = TwistGame::arranged_with_anchor(Symbol::O);
        assert!(BalancedBlocksInvariant::holds(&game));
    }

    #[test]
    fn test_arrangement_progress_holds() {
        let mut game = TwistGame::arranged_with_anchor(Symbol::X);
        game.select(2).expect("select");
        game.commit(8).expect("commit");
        assert!(BalancedBlocksInvariant::holds(&game));
    }

    #[test]
    fn test_extra_symbol_violates() {
        let mut game = TwistGame::arranged_with_anchor(Symbol::X);
        // Slip an extra O in without consuming a pool entry.
        game.deque.sequence.fill(7, Symbol::O);
        assert!(!BalancedBlocksInvariant::holds(&game));
    }

    #[test]
    fn test_equal_anchors_violate() {
        let mut game = TwistGame::arranged_with_anchor(Symbol::X);
        game.deque.sequence = BlockSequence::anchored(Symbol::X);
        game.deque.sequence.fill(5, Symbol::X);
        assert!(!BalancedBlocksInvariant::holds(&game));
    }
}
