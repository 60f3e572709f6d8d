//! Staged entry invariant: a staged pool index names a live pool entry.

use super::super::{Phase, TwistGame};
use super::Invariant;

/// Invariant: while arranging, the staged index (if any) lies inside the
/// arranging player's pool and points at an entry not yet consumed.
pub struct StagedEntryInvariant;

impl Invariant<TwistGame> for StagedEntryInvariant {
    fn holds(game: &TwistGame) -> bool {
        let Phase::Arranging(arrangement) = game.phase() else {
            return true;
        };
        match arrangement.staged() {
            None => true,
            Some(index) => matches!(
                arrangement.pool(arrangement.turn()).get(index),
                Some(Some(_))
            ),
        }
    }

    fn description() -> &'static str {
        "Staged pool entry is available"
    }
}
