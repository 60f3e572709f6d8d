//! The explicit game phase.
//!
//! One tagged union replaces the loose flags (pending symbol, arrangement
//! phase, winner) so contradictory combinations cannot be represented.

use super::arrangement::Arrangement;
use super::Symbol;
use serde::{Deserialize, Serialize};

/// Outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A line of this symbol was completed.
    Winner(Symbol),
    /// Nobody can complete a line any more.
    Draw,
}

impl Outcome {
    /// Returns the winning symbol if there is one.
    pub fn winner(&self) -> Option<Symbol> {
        match self {
            Outcome::Winner(symbol) => Some(*symbol),
            Outcome::Draw => None,
        }
    }

    /// Returns true if the game was a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Winner(symbol) => write!(f, "Winner: {}", symbol),
            Outcome::Draw => write!(f, "Draw!"),
        }
    }
}

/// Result of a successful placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The game goes on.
    Continue,
    /// The placement ended the game.
    Finished(Outcome),
}

/// Where the game currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// Players are filling each other's hidden blocks.
    Arranging(Arrangement),
    /// The end in turn must reveal a block.
    AwaitingReveal,
    /// A revealed symbol waits to be placed.
    AwaitingPlacement {
        /// The revealed symbol.
        symbol: Symbol,
    },
    /// The viewed record is terminal.
    Finished {
        /// How it ended.
        outcome: Outcome,
        /// A symbol revealed on an earlier record, restored on jumping back.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        held: Option<Symbol>,
    },
}

impl Phase {
    /// Short name used in logs and views.
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Arranging(_) => "arranging",
            Phase::AwaitingReveal => "awaiting_reveal",
            Phase::AwaitingPlacement { .. } => "awaiting_placement",
            Phase::Finished { .. } => "finished",
        }
    }

    /// The revealed symbol waiting to be placed, if any.
    pub fn pending(&self) -> Option<Symbol> {
        match self {
            Phase::AwaitingPlacement { symbol } => Some(*symbol),
            _ => None,
        }
    }

    /// The revealed symbol, including one held while a terminal record is
    /// viewed.
    pub fn held(&self) -> Option<Symbol> {
        match self {
            Phase::AwaitingPlacement { symbol } => Some(*symbol),
            Phase::Finished { held, .. } => *held,
            _ => None,
        }
    }

    /// The outcome if the game is finished.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Phase::Finished { outcome, .. } => Some(*outcome),
            _ => None,
        }
    }
}
