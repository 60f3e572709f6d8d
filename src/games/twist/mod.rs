//! TwistTacToe: tic-tac-toe where the symbol you place is revealed from a
//! hidden, double-ended sequence of ten blocks.

mod action;
mod arrangement;
mod blocks;
mod deque;
mod game;
pub mod invariants;
mod phases;
mod position;
pub mod rules;
mod types;

pub use action::Rejection;
pub use arrangement::{Arrangement, ArrangementStep, POOL_SIZE, Pool};
pub use blocks::{BACK_ANCHOR, BLOCK_COUNT, BlockSequence, FRONT_ANCHOR, PER_SYMBOL};
pub use deque::BlockDeque;
pub use game::{TwistGame, Variant};
pub use phases::{Outcome, Phase, Transition};
pub use position::Position;
pub use types::{Board, End, Seat, Square, Symbol};
