//! First-class invariants for TwistTacToe.
//!
//! Invariants are logical properties that must hold for every reachable
//! game. They are asserted after placements in debug builds and checked in
//! all builds before a snapshot from the peer is adopted.

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implemented for tuples of invariants.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

fn collect(failures: &[(bool, &'static str)]) -> Result<(), Vec<InvariantViolation>> {
    let violations: Vec<_> = failures
        .iter()
        .filter(|(holds, _)| !holds)
        .map(|(_, description)| InvariantViolation::new(*description))
        .collect();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

impl<S, I1, I2, I3, I4> InvariantSet<S> for (I1, I2, I3, I4)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
    I4: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        collect(&[
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
            (I3::holds(state), I3::description()),
            (I4::holds(state), I4::description()),
        ])
    }
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        collect(&[
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
            (I3::holds(state), I3::description()),
        ])
    }
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        collect(&[
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
        ])
    }
}

pub mod balanced_blocks;
pub mod cursor_bounds;
pub mod history_consistent;
pub mod staged_entry;

pub use balanced_blocks::BalancedBlocksInvariant;
pub use cursor_bounds::CursorBoundsInvariant;
pub use history_consistent::HistoryConsistentInvariant;
pub use staged_entry::StagedEntryInvariant;

/// All TwistTacToe invariants as a composable set.
pub type TwistInvariants = (
    BalancedBlocksInvariant,
    CursorBoundsInvariant,
    HistoryConsistentInvariant,
    StagedEntryInvariant,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::twist::{BlockSequence, End, Symbol, TwistGame};

    fn game() -> TwistGame {
        use Symbol::{O, X};
        TwistGame::with_sequence(
            BlockSequence::from_symbols([X, O, O, X, X, O, X, O, X, O]).expect("balanced"),
        )
    }

    #[test]
    fn test_invariant_set_holds_for_new_game() {
        assert!(TwistInvariants::check_all(&game()).is_ok());
    }

    #[test]
    fn test_invariant_set_holds_after_moves() {
        let mut game = game();
        game.reveal(End::Front).expect("reveal");
        game.place(4).expect("place");
        game.reveal(End::Back).expect("reveal");
        game.place(0).expect("place");
        assert!(TwistInvariants::check_all(&game).is_ok());
    }

    #[test]
    fn test_invariant_set_reports_every_violation() {
        let mut game = game();
        game.reveal(End::Front).expect("reveal");
        game.place(4).expect("place");
        // Forget the reveal and the record behind it.
        game.deque.revealed.clear();
        game.step = 5;

        let violations = TwistInvariants::check_all(&game).expect_err("corrupted");
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_two_invariants_as_set() {
        type TwoInvariants = (BalancedBlocksInvariant, CursorBoundsInvariant);
        assert!(TwoInvariants::check_all(&game()).is_ok());
    }
}
