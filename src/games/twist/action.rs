//! Intents and their rejections.
//!
//! Every illegal reveal, placement or arrangement step is expressed as a
//! `Rejection`. Callers treat it as a no-op: the state is never touched
//! when one is returned.

use super::{End, Position};

/// Reason an intent was refused.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum Rejection {
    /// A symbol is already waiting to be placed.
    #[display("A block has already been revealed this turn")]
    AlreadyRevealed,

    /// Every block has been revealed.
    #[display("No hidden blocks remain")]
    Exhausted,

    /// The reveal came from the wrong end; carries the end in turn.
    #[display("Reveal from the {} block instead", _0)]
    WrongSide(End),

    /// The local seat does not own the current turn.
    #[display("It's not your turn")]
    NotYourTurn,

    /// The opponent has not joined, or has dropped.
    #[display("Waiting for the opponent")]
    AwaitingOpponent,

    /// No symbol has been revealed for this turn.
    #[display("Reveal a block before placing")]
    NothingRevealed,

    /// The square at the position is already occupied.
    #[display("Square {} is already occupied", _0)]
    SquareOccupied(Position),

    /// The cell index is not on the board.
    #[display("Cell {} is not on the board", _0)]
    OutOfBounds(usize),

    /// The viewed record already has a result.
    #[display("Game is already over")]
    GameOver,

    /// Reveals and placements wait for the arrangement to finish.
    #[display("Blocks are still being arranged")]
    StillArranging,

    /// Arrangement intents arrived after the arrangement finished.
    #[display("The arrangement phase is over")]
    NotArranging,

    /// The pool entry does not exist or was already used.
    #[display("Pool entry {} is not available", _0)]
    PoolEntryUnavailable(usize),

    /// A commit was attempted with nothing staged.
    #[display("Select a symbol from your pool first")]
    NothingStaged,

    /// The block index is not one of the arranging player's target slots.
    #[display("Block {} cannot be arranged now", _0)]
    InvalidSlot(usize),

    /// The target block already holds a symbol.
    #[display("Block {} is already filled", _0)]
    SlotFilled(usize),

    /// The requested history step does not exist.
    #[display("Step {} is not in the history", _0)]
    StepOutOfRange(usize),

    /// Time travel is only offered in local play.
    #[display("History jumps are not available in this mode")]
    JumpUnavailable,

    /// Only the host may restart an online game.
    #[display("Only the host can restart the game")]
    NotHost,

    /// The intent belongs to the computer.
    #[display("The computer is playing this turn")]
    ComputerTurn,

    /// Peer messages only apply to online sessions.
    #[display("Not in an online game")]
    NotOnline,

    /// An inbound snapshot failed validation.
    #[display("Rejected snapshot: {}", _0)]
    InvalidSnapshot(String),
}

impl std::error::Error for Rejection {}
