//! Game rules for TwistTacToe.
//!
//! Pure functions over boards, kept apart from board storage so the move
//! engine and the computer strategy share one definition of a line.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{LINES, check_winner};
